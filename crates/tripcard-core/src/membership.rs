//! Membership — the User↔TravelCard junction.
//!
//! Modelled as an explicit relation rather than a collection on either
//! side, so it stays independently queryable and constrainable. The
//! (card, user) pair is unique: a user belongs to a given card at most
//! once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One junction row: `user_id` belongs to `card_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
  pub card_id: Uuid,
  pub user_id: Uuid,
}
