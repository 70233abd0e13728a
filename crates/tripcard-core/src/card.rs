//! TravelCard — a shared trip plan.
//!
//! A card owns an ordered list of journeys and is held collectively by its
//! member users. Both relations hang off the card's display id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, validate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelCard {
  pub display_id:  Uuid,
  pub title:       String,
  pub description: String,
}

/// Input to [`crate::store::CardStore::create_card`] and
/// [`crate::store::CardStore::update_card`].
#[derive(Debug, Clone)]
pub struct NewTravelCard {
  pub title:       String,
  pub description: String,
}

impl NewTravelCard {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      title:       title.into(),
      description: description.into(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate::required("travel_card", "title", &self.title)?;
    validate::bounded("travel_card", "description", &self.description)
  }
}
