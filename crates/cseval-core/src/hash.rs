//! Stable content hashing used to stamp resolved configurations in reports.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, EvalError};

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, EvalError> {
    let bytes = serde_json::to_vec(value).map_err(|err| {
        EvalError::Serde(
            ErrorInfo::new("hash-encode", "failed to encode hash payload")
                .with_hint(err.to_string()),
        )
    })?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
