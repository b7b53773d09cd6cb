use cseval_stats::{align, SeriesPoint, TimeSeries};

fn series(values: &[f64]) -> TimeSeries {
    TimeSeries {
        points: values
            .iter()
            .enumerate()
            .map(|(idx, value)| SeriesPoint {
                generation: idx as u32,
                total_cs: *value,
            })
            .collect(),
    }
}

#[test]
fn complete_series_are_never_truncated() {
    // Final generation index 9 reaches the expected length of 9.
    let full = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    let short = series(&[1.0, 2.0, 3.0, 4.0]);
    let aligned = align(vec![full.clone(), short], 9);

    assert_eq!(aligned.series()[0], full);
}

#[test]
fn short_series_hold_their_last_value() {
    let full = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    let short = series(&[1.0, 2.0, 3.0, 4.0]);
    // Working length is the mean length rounded down: (10 + 4) / 2 = 7.
    let aligned = align(vec![full, short], 9);

    let extended = &aligned.series()[1];
    assert_eq!(extended.points.len(), 7);
    for (idx, point) in extended.points.iter().enumerate() {
        assert_eq!(point.generation, idx as u32, "generations must be contiguous");
    }
    assert_eq!(extended.points[3].total_cs, 4.0);
    for point in &extended.points[4..] {
        assert_eq!(point.total_cs, 4.0, "missing generations repeat the last value");
    }
}

#[test]
fn reduction_pads_with_missing_rows() {
    let a = series(&[1.0, 2.0, 3.0, 4.0]);
    let b = series(&[5.0, 6.0]);
    // Working length (4 + 2) / 2 = 3; both series terminated early.
    let aligned = align(vec![a, b], 10);
    let mean = aligned.mean(10);

    assert_eq!(mean.rows.len(), 10);
    let observed = mean.rows.iter().filter(|row| row.is_some()).count();
    assert_eq!(observed, 3);
    for row in &mean.rows[3..] {
        assert!(row.is_none(), "padding must stay missing, not zero");
    }
}

#[test]
fn mean_and_std_reduce_per_generation() {
    let a = series(&[1.0, 1.0]);
    let b = series(&[3.0, 5.0]);
    let aligned = align(vec![a, b], 1);

    let mean = aligned.mean(1);
    let first = mean.rows[0].expect("generation 0");
    assert_eq!(first.generation, 0);
    assert!((first.total_cs - 2.0).abs() < 1e-12);
    let second = mean.rows[1].expect("generation 1");
    assert!((second.total_cs - 3.0).abs() < 1e-12);

    // Population semantics: std of [1, 3] is 1, of [1, 5] is 2.
    let std = aligned.std_dev(1);
    assert!((std.rows[0].expect("generation 0").total_cs - 1.0).abs() < 1e-12);
    assert!((std.rows[1].expect("generation 1").total_cs - 2.0).abs() < 1e-12);
}

#[test]
fn partial_groups_use_present_values_only() {
    let full = series(&[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    let short = series(&[2.0, 3.0]);
    // Working length (6 + 2) / 2 = 4; the full series reaches generation 5.
    let aligned = align(vec![full, short], 5);
    let mean = aligned.mean(5);

    assert_eq!(mean.rows.len(), 6);
    // Generations 4 and 5 are only covered by the longer series.
    let tail = mean.rows[5].expect("generation 5");
    assert!((tail.total_cs - 12.0).abs() < 1e-12);
    // Generation 3 mixes the observed value with the held-constant 3.0.
    let mixed = mean.rows[3].expect("generation 3");
    assert!((mixed.total_cs - (8.0 + 3.0) / 2.0).abs() < 1e-12);
}
