//! SQLite backend for the tripcard travel-planning store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Integrity rules (uniqueness,
//! foreign keys, cascades) are declared in the schema and enforced by the
//! engine inside each writing transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
