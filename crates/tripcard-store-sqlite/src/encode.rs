//! Encoding and decoding helpers between Rust domain types and the plain
//! text stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings, dates as `YYYY-MM-DD`,
//! times of day as `HH:MM:SS`. All three sort lexicographically in column
//! order, which the ordered journey query relies on.

use chrono::{NaiveDate, NaiveTime};
use tripcard_core::{
  card::TravelCard,
  journey::Journey,
  user::{Provider, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Date / time ─────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Provider ────────────────────────────────────────────────────────────────

pub fn encode_provider(p: Provider) -> &'static str {
  match p {
    Provider::ExternalOauth => "external-oauth",
    Provider::LocalCredentials => "local-credentials",
  }
}

pub fn decode_provider(s: &str) -> Result<Provider> {
  match s {
    "external-oauth" => Ok(Provider::ExternalOauth),
    "local-credentials" => Ok(Provider::LocalCredentials),
    other => Err(Error::Decode(format!("unknown provider: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub display_id:  String,
  pub username:    String,
  pub secret_hash: Option<String>,
  pub provider:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      display_id:  decode_uuid(&self.display_id)?,
      username:    self.username,
      secret_hash: self.secret_hash,
      provider:    decode_provider(&self.provider)?,
    })
  }
}

/// Raw strings read directly from a `travel_cards` row.
pub struct RawCard {
  pub display_id:  String,
  pub title:       String,
  pub description: String,
}

impl RawCard {
  pub fn into_card(self) -> Result<TravelCard> {
    Ok(TravelCard {
      display_id:  decode_uuid(&self.display_id)?,
      title:       self.title,
      description: self.description,
    })
  }
}

/// Raw strings read directly from a `journeys` row.
pub struct RawJourney {
  pub display_id: String,
  pub card_id:    String,
  pub title:      String,
  pub note:       String,
  pub location:   String,
  pub date:       String,
  pub start_time: Option<String>,
  pub end_time:   Option<String>,
}

impl RawJourney {
  pub fn into_journey(self) -> Result<Journey> {
    Ok(Journey {
      display_id: decode_uuid(&self.display_id)?,
      card_id:    decode_uuid(&self.card_id)?,
      title:      self.title,
      note:       self.note,
      location:   self.location,
      date:       decode_date(&self.date)?,
      start_time: self.start_time.as_deref().map(decode_time).transpose()?,
      end_time:   self.end_time.as_deref().map(decode_time).transpose()?,
    })
  }
}
