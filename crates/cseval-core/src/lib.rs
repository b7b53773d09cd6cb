#![deny(missing_docs)]
#![doc = "Core error and hashing types shared across the cseval crates."]

pub mod errors;
pub mod hash;

pub use errors::{EvalError, ErrorInfo};
pub use hash::stable_hash_string;
