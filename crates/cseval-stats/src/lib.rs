//! Statistical reduction of per-run seeker artifacts: series alignment and
//! per-configuration summary aggregation.

mod series;
mod summary;

pub use series::{
    align, collect_series, load_series, AlignedSeriesSet, ReducedSeries, SeriesPoint, TimeSeries,
};
pub use summary::{aggregate, collect_summary_files, Cell, SummaryTable, TimeUnit};
