//! Checksum validation for migrations
//!
//! A recorded checksum that no longer matches the embedded SQL means the
//! migration was edited after it shipped.

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
