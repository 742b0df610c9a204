//! Repository layer mapping the core models onto SQLite rows

mod rows;
mod sqlite_store;

pub use sqlite_store::SqliteStore;
