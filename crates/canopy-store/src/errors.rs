//! Error handling for canopy-store
//!
//! Wraps canopy-core ExError with store-specific helpers

use canopy_core::errors::{ExError, ExErrorKind};
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::InconsistentState)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a stored-content digest mismatch error
pub fn digest_mismatch(version_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::InconsistentState)
        .with_op("load_version")
        .with_version_id(version_id)
        .with_message(format!(
            "Stored content digest {} does not match computed {}",
            expected, actual
        ))
}

/// Create an error for a column value the schema should have prevented
pub fn corrupt_row(table: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InconsistentState)
        .with_op("sqlite_decode")
        .with_message(format!("Corrupt {} row: {}", table, reason.into()))
}

/// Create a database error from rusqlite::Error
///
/// Lock contention maps to `Concurrency`, everything else to `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            ExErrorKind::Concurrency
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a serialization error from serde_json::Error
pub fn from_serde_json(err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("slots_json")
        .with_message(err.to_string())
}
