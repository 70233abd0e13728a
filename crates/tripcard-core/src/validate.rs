//! Write-time bounds for text fields.
//!
//! SQLite does not enforce declared column lengths, so these checks are the
//! only enforcement point. Lengths are counted in Unicode scalar values.

use crate::error::{Error, Result, ValidationReason};

/// Maximum length of every text field in the schema.
pub const MAX_TEXT_LEN: usize = 100;

/// A required text field: non-empty and within [`MAX_TEXT_LEN`].
pub fn required(
  entity: &'static str,
  field: &'static str,
  value: &str,
) -> Result<()> {
  if value.is_empty() {
    return Err(Error::Validation {
      entity,
      field,
      reason: ValidationReason::Empty,
    });
  }
  bounded(entity, field, value)
}

/// A free-text or optional field: only the length bound applies.
pub fn bounded(
  entity: &'static str,
  field: &'static str,
  value: &str,
) -> Result<()> {
  let len = value.chars().count();
  if len > MAX_TEXT_LEN {
    return Err(Error::Validation {
      entity,
      field,
      reason: ValidationReason::TooLong { len },
    });
  }
  Ok(())
}
