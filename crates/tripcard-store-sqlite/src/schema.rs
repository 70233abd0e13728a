//! SQL schema for the tripcard SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Every table pairs an internal sequence id (`AUTOINCREMENT`, so values
/// are monotonic and never reused) with the externally visible
/// `display_id`. All foreign keys point at `display_id` columns, never at
/// the internal key, so internal renumbering can never invalidate an
/// external reference.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    display_id  TEXT NOT NULL UNIQUE,
    username    TEXT NOT NULL UNIQUE,
    secret_hash TEXT,
    provider    TEXT NOT NULL DEFAULT 'local-credentials'
                -- 'external-oauth' | 'local-credentials'
);

CREATE TABLE IF NOT EXISTS travel_cards (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    display_id  TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL
);

-- Journeys live and die with their owning card.
CREATE TABLE IF NOT EXISTS journeys (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    display_id  TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    note        TEXT NOT NULL,
    location    TEXT NOT NULL,
    date        TEXT NOT NULL,   -- ISO 8601 calendar date
    start_time  TEXT,            -- ISO 8601 time of day
    end_time    TEXT,
    card_id     TEXT NOT NULL REFERENCES travel_cards(display_id)
                    ON DELETE CASCADE ON UPDATE CASCADE
);

-- Junction relation; a user belongs to a given card at most once.
CREATE TABLE IF NOT EXISTS memberships (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id  TEXT NOT NULL REFERENCES travel_cards(display_id)
                 ON DELETE CASCADE ON UPDATE CASCADE,
    user_id  TEXT NOT NULL REFERENCES users(display_id)
                 ON DELETE CASCADE ON UPDATE CASCADE,
    UNIQUE (card_id, user_id)
);

CREATE INDEX IF NOT EXISTS journeys_card_date_idx ON journeys(card_id, date, start_time);
CREATE INDEX IF NOT EXISTS memberships_user_idx   ON memberships(user_id);

PRAGMA user_version = 1;
";
