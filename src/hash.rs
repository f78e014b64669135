//! Content hashing for stable statement and hierarchy ids.

use sha2::{Digest, Sha256};

/// Build a short stable identifier from a text payload.
///
/// Returns `{prefix}_{first 16 hex chars of SHA256}`. The same text always
/// produces the same id, which is what lets reruns of the pipeline line up
/// with previously persisted statements and hierarchies.
pub fn stable_id(prefix: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}_{}", prefix, &digest[..16])
}
