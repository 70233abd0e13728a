//! Journey — one dated leg of a travel card.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, validate};

/// A single leg: one calendar date, optional start and end times, a
/// location, and a note. A journey belongs to exactly one travel card and
/// is deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
  pub display_id: Uuid,
  /// Owning travel card, referenced by display id.
  pub card_id:    Uuid,
  pub title:      String,
  pub note:       String,
  pub location:   String,
  /// Calendar date of the leg; no time component.
  pub date:       NaiveDate,
  pub start_time: Option<NaiveTime>,
  /// Independently optional. May be earlier than `start_time` — an
  /// overnight leg is a legitimate out-of-order pair.
  pub end_time:   Option<NaiveTime>,
}

/// Input to [`crate::store::CardStore::create_journey`].
#[derive(Debug, Clone)]
pub struct NewJourney {
  pub card_id:    Uuid,
  pub title:      String,
  pub note:       String,
  pub location:   String,
  pub date:       NaiveDate,
  pub start_time: Option<NaiveTime>,
  pub end_time:   Option<NaiveTime>,
}

impl NewJourney {
  /// Convenience constructor with empty note/location and no times.
  pub fn new(card_id: Uuid, title: impl Into<String>, date: NaiveDate) -> Self {
    Self {
      card_id,
      title: title.into(),
      note: String::new(),
      location: String::new(),
      date,
      start_time: None,
      end_time: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate::required("journey", "title", &self.title)?;
    validate::bounded("journey", "note", &self.note)?;
    validate::bounded("journey", "location", &self.location)
  }
}

/// Content edit for an existing journey. The owning card reference is not
/// editable; a journey moves between cards by delete + create.
#[derive(Debug, Clone)]
pub struct JourneyEdit {
  pub title:      String,
  pub note:       String,
  pub location:   String,
  pub date:       NaiveDate,
  pub start_time: Option<NaiveTime>,
  pub end_time:   Option<NaiveTime>,
}

impl JourneyEdit {
  pub fn validate(&self) -> Result<()> {
    validate::required("journey", "title", &self.title)?;
    validate::bounded("journey", "note", &self.note)?;
    validate::bounded("journey", "location", &self.location)
  }
}
