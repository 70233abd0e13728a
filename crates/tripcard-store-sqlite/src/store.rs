//! [`SqliteStore`] — the SQLite implementation of [`CardStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tripcard_core::{
  Error as CoreError,
  card::{NewTravelCard, TravelCard},
  journey::{Journey, JourneyEdit, NewJourney},
  membership::Membership,
  store::CardStore,
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawCard, RawJourney, RawUser, encode_date, encode_provider, encode_time,
    encode_uuid,
  },
  error::{is_fk_violation, is_unique_violation},
  schema::SCHEMA,
};

// ─── Row readers ─────────────────────────────────────────────────────────────

const USER_COLUMNS: &str = "display_id, username, secret_hash, provider";
const CARD_COLUMNS: &str = "display_id, title, description";
const JOURNEY_COLUMNS: &str =
  "display_id, card_id, title, note, location, date, start_time, end_time";

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    display_id:  row.get(0)?,
    username:    row.get(1)?,
    secret_hash: row.get(2)?,
    provider:    row.get(3)?,
  })
}

fn read_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCard> {
  Ok(RawCard {
    display_id:  row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
  })
}

fn read_journey(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJourney> {
  Ok(RawJourney {
    display_id: row.get(0)?,
    card_id:    row.get(1)?,
    title:      row.get(2)?,
    note:       row.get(3)?,
    location:   row.get(4)?,
    date:       row.get(5)?,
    start_time: row.get(6)?,
    end_time:   row.get(7)?,
  })
}

/// Existence probe against a display id column, inside a transaction.
fn row_exists(
  tx: &rusqlite::Transaction<'_>,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    tx.query_row(sql, rusqlite::params![id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A travel-card store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// database access runs on the connection's dedicated thread, one closure
/// at a time, so every operation (including its integrity checks) is atomic
/// relative to every other.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;

    let user = User {
      display_id:  Uuid::new_v4(),
      username:    input.username,
      secret_hash: input.secret_hash,
      provider:    input.provider,
    };

    let id_str       = encode_uuid(user.display_id);
    let username     = user.username.clone();
    let secret_hash  = user.secret_hash.clone();
    let provider_str = encode_provider(user.provider).to_owned();

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (display_id, username, secret_hash, provider)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, username, secret_hash, provider_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(user),
      Err(e) if is_unique_violation(&e, "users.username") => {
        Err(
          CoreError::DuplicateKey {
            entity: "user",
            field:  "username",
            value:  user.username,
          }
          .into(),
        )
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE display_id = ?1"),
              rusqlite::params![id_str],
              read_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
              rusqlite::params![username],
              read_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let memberships = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let memberships: i64 = tx.query_row(
          "SELECT COUNT(*) FROM memberships WHERE user_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;

        let deleted = tx.execute(
          "DELETE FROM users WHERE display_id = ?1",
          rusqlite::params![id_str],
        )?;
        if deleted == 0 {
          return Ok(Err(CoreError::NotFound { entity: "user", id }));
        }

        tx.commit()?;
        Ok(Ok(memberships))
      })
      .await??;

    tracing::debug!(user = %id, memberships, "deleted user");
    Ok(())
  }

  // ── Travel cards ──────────────────────────────────────────────────────────

  async fn create_card(&self, input: NewTravelCard) -> Result<TravelCard> {
    input.validate()?;

    let card = TravelCard {
      display_id:  Uuid::new_v4(),
      title:       input.title,
      description: input.description,
    };

    let id_str      = encode_uuid(card.display_id);
    let title       = card.title.clone();
    let description = card.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO travel_cards (display_id, title, description)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, title, description],
        )?;
        Ok(())
      })
      .await?;

    Ok(card)
  }

  async fn get_card(&self, id: Uuid) -> Result<Option<TravelCard>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CARD_COLUMNS} FROM travel_cards WHERE display_id = ?1"
              ),
              rusqlite::params![id_str],
              read_card,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn update_card(
    &self,
    id: Uuid,
    input: NewTravelCard,
  ) -> Result<TravelCard> {
    input.validate()?;

    let card = TravelCard {
      display_id:  id,
      title:       input.title,
      description: input.description,
    };

    let id_str      = encode_uuid(id);
    let title       = card.title.clone();
    let description = card.description.clone();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE travel_cards SET title = ?2, description = ?3
           WHERE display_id = ?1",
          rusqlite::params![id_str, title, description],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::NotFound { entity: "travel_card", id }.into());
    }
    Ok(card)
  }

  async fn update_card_display_id(&self, id: Uuid, new_id: Uuid) -> Result<()> {
    let old_str = encode_uuid(id);
    let new_str = encode_uuid(new_id);

    // ON UPDATE CASCADE rewrites every referencing journey and membership
    // row within the same statement.
    let res = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE travel_cards SET display_id = ?2 WHERE display_id = ?1",
          rusqlite::params![old_str, new_str],
        )?)
      })
      .await;

    match res {
      Ok(0) => Err(CoreError::NotFound { entity: "travel_card", id }.into()),
      Ok(_) => {
        tracing::debug!(card = %id, new = %new_id, "reassigned card display id");
        Ok(())
      }
      Err(e) if is_unique_violation(&e, "travel_cards.display_id") => {
        Err(
          CoreError::DuplicateKey {
            entity: "travel_card",
            field:  "display_id",
            value:  new_id.to_string(),
          }
          .into(),
        )
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn delete_card(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let (journeys, memberships) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let journeys: i64 = tx.query_row(
          "SELECT COUNT(*) FROM journeys WHERE card_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;
        let memberships: i64 = tx.query_row(
          "SELECT COUNT(*) FROM memberships WHERE card_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;

        let deleted = tx.execute(
          "DELETE FROM travel_cards WHERE display_id = ?1",
          rusqlite::params![id_str],
        )?;
        if deleted == 0 {
          return Ok(Err(CoreError::NotFound { entity: "travel_card", id }));
        }

        tx.commit()?;
        Ok(Ok((journeys, memberships)))
      })
      .await??;

    tracing::debug!(card = %id, journeys, memberships, "deleted travel card");
    Ok(())
  }

  // ── Journeys ──────────────────────────────────────────────────────────────

  async fn create_journey(&self, input: NewJourney) -> Result<Journey> {
    input.validate()?;

    let journey = Journey {
      display_id: Uuid::new_v4(),
      card_id:    input.card_id,
      title:      input.title,
      note:       input.note,
      location:   input.location,
      date:       input.date,
      start_time: input.start_time,
      end_time:   input.end_time,
    };

    let id_str    = encode_uuid(journey.display_id);
    let card_str  = encode_uuid(journey.card_id);
    let title     = journey.title.clone();
    let note      = journey.note.clone();
    let location  = journey.location.clone();
    let date_str  = encode_date(journey.date);
    let start_str = journey.start_time.map(encode_time);
    let end_str   = journey.end_time.map(encode_time);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO journeys
             (display_id, card_id, title, note, location, date, start_time, end_time)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, card_str, title, note, location, date_str, start_str,
            end_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(journey),
      Err(e) if is_fk_violation(&e) => {
        Err(
          CoreError::ForeignKeyViolation {
            entity: "travel_card",
            id:     journey.card_id,
          }
          .into(),
        )
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_journey(&self, id: Uuid) -> Result<Option<Journey>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawJourney> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {JOURNEY_COLUMNS} FROM journeys WHERE display_id = ?1"
              ),
              rusqlite::params![id_str],
              read_journey,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawJourney::into_journey).transpose()
  }

  async fn update_journey(&self, id: Uuid, edit: JourneyEdit) -> Result<Journey> {
    edit.validate()?;

    let id_str    = encode_uuid(id);
    let title     = edit.title;
    let note      = edit.note;
    let location  = edit.location;
    let date_str  = encode_date(edit.date);
    let start_str = edit.start_time.map(encode_time);
    let end_str   = edit.end_time.map(encode_time);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let updated = tx.execute(
          "UPDATE journeys
           SET title = ?2, note = ?3, location = ?4, date = ?5,
               start_time = ?6, end_time = ?7
           WHERE display_id = ?1",
          rusqlite::params![
            id_str, title, note, location, date_str, start_str, end_str,
          ],
        )?;
        if updated == 0 {
          return Ok(Err(CoreError::NotFound { entity: "journey", id }));
        }

        let raw = tx.query_row(
          &format!("SELECT {JOURNEY_COLUMNS} FROM journeys WHERE display_id = ?1"),
          rusqlite::params![id_str],
          read_journey,
        )?;

        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_journey()
  }

  async fn delete_journey(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM journeys WHERE display_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::NotFound { entity: "journey", id }.into());
    }
    Ok(())
  }

  async fn list_journeys(&self, card_id: Uuid) -> Result<Vec<Journey>> {
    let card_str = encode_uuid(card_id);

    let raws: Vec<RawJourney> = self
      .conn
      .call(move |conn| {
        // SQLite sorts NULLs first; the IS NULL key places untimed journeys
        // after timed ones on the same date. The trailing sequence id keeps
        // equal-key rows in insertion order.
        let mut stmt = conn.prepare(&format!(
          "SELECT {JOURNEY_COLUMNS} FROM journeys
           WHERE card_id = ?1
           ORDER BY date ASC, (start_time IS NULL) ASC, start_time ASC, id ASC"
        ))?;

        let rows = stmt
          .query_map(rusqlite::params![card_str], read_journey)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJourney::into_journey).collect()
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn add_member(&self, card_id: Uuid, user_id: Uuid) -> Result<Membership> {
    let card_str = encode_uuid(card_id);
    let user_str = encode_uuid(user_id);

    let membership = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // SQLite reports foreign key failures without naming the reference,
        // so probe both sides here. The declared FK constraints and
        // UNIQUE (card_id, user_id) remain the engine-level backstop for
        // the insert below.
        if !row_exists(
          &tx,
          "SELECT 1 FROM travel_cards WHERE display_id = ?1",
          &card_str,
        )? {
          return Ok(Err(CoreError::ForeignKeyViolation {
            entity: "travel_card",
            id:     card_id,
          }));
        }
        if !row_exists(&tx, "SELECT 1 FROM users WHERE display_id = ?1", &user_str)?
        {
          return Ok(Err(CoreError::ForeignKeyViolation {
            entity: "user",
            id:     user_id,
          }));
        }

        let pair_exists: bool = tx
          .query_row(
            "SELECT 1 FROM memberships WHERE card_id = ?1 AND user_id = ?2",
            rusqlite::params![card_str, user_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if pair_exists {
          return Ok(Err(CoreError::DuplicateKey {
            entity: "membership",
            field:  "(card_id, user_id)",
            value:  format!("({card_str}, {user_str})"),
          }));
        }

        tx.execute(
          "INSERT INTO memberships (card_id, user_id) VALUES (?1, ?2)",
          rusqlite::params![card_str, user_str],
        )?;

        tx.commit()?;
        Ok(Ok(Membership { card_id, user_id }))
      })
      .await??;

    Ok(membership)
  }

  async fn remove_member(&self, card_id: Uuid, user_id: Uuid) -> Result<()> {
    let card_str = encode_uuid(card_id);
    let user_str = encode_uuid(user_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM memberships WHERE card_id = ?1 AND user_id = ?2",
          rusqlite::params![card_str, user_str],
        )?)
      })
      .await?;

    // An absent pair is a successful no-op so collaborators can retry.
    if removed > 0 {
      tracing::debug!(card = %card_id, user = %user_id, "removed member");
    }
    Ok(())
  }

  async fn list_members(&self, card_id: Uuid) -> Result<Vec<User>> {
    let card_str = encode_uuid(card_id);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.display_id, u.username, u.secret_hash, u.provider
           FROM users u
           JOIN memberships m ON m.user_id = u.display_id
           WHERE m.card_id = ?1
           ORDER BY m.id ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![card_str], read_user)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn list_cards(&self, user_id: Uuid) -> Result<Vec<TravelCard>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.display_id, c.title, c.description
           FROM travel_cards c
           JOIN memberships m ON m.card_id = c.display_id
           WHERE m.user_id = ?1
           ORDER BY m.id ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![user_str], read_card)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }
}
