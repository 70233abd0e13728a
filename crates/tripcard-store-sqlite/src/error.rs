//! Error type for `tripcard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Contract error surfaced to collaborators: validation, duplicate key,
  /// foreign key violation, not found.
  #[error(transparent)]
  Store(#[from] tripcard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Constraint classification ───────────────────────────────────────────────

/// True when `err` is an engine-reported UNIQUE violation on `column` — a
/// `"table.column"` name as SQLite spells it in the failure message.
pub(crate) fn is_unique_violation(
  err: &tokio_rusqlite::Error,
  column: &str,
) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, Some(msg)))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        && msg.contains(column)
  )
}

/// True when `err` is an engine-reported foreign key violation. SQLite does
/// not name the failing reference, so call sites supply the entity.
pub(crate) fn is_fk_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  )
}
