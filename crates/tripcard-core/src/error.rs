//! Error types for `tripcard-core`.
//!
//! Every store operation reports failure through one of four kinds, with
//! the offending entity and field carried as structured payload rather than
//! baked into a message string.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::MAX_TEXT_LEN;

/// Why a text field failed its write-time bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
  /// The field exceeded [`MAX_TEXT_LEN`] characters.
  TooLong { len: usize },
  /// A required field was empty.
  Empty,
}

impl std::fmt::Display for ValidationReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::TooLong { len } => {
        write!(f, "is {len} characters (limit {MAX_TEXT_LEN})")
      }
      Self::Empty => write!(f, "must not be empty"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A text field failed its write-time bounds check. Over-long values are
  /// rejected, never truncated.
  #[error("{entity}.{field} {reason}")]
  Validation {
    entity: &'static str,
    field:  &'static str,
    reason: ValidationReason,
  },

  /// A unique constraint was violated.
  #[error("{entity} with {field} {value:?} already exists")]
  DuplicateKey {
    entity: &'static str,
    field:  &'static str,
    value:  String,
  },

  /// A write referenced a parent row that does not exist.
  #[error("{entity} {id} does not exist")]
  ForeignKeyViolation { entity: &'static str, id: Uuid },

  /// The target of a delete or update is absent.
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
