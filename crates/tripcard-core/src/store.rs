//! The `CardStore` trait — the contract collaborators program against.
//!
//! The trait is implemented by storage backends (e.g.
//! `tripcard-store-sqlite`). API layers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  card::{NewTravelCard, TravelCard},
  journey::{Journey, JourneyEdit, NewJourney},
  membership::Membership,
  user::{NewUser, User},
};

/// Abstraction over a travel-card store backend.
///
/// Every mutation is atomic: either the entity and all rows cascaded from
/// it change together, or nothing does. Concurrent callers observe either
/// the full pre-state or full post-state of an entity graph, never an
/// intermediate one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user with a freshly generated display id.
  ///
  /// Fails with `DuplicateKey` if the username is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by display id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by username — the login lookup.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Delete a user and, in the same transaction, every membership row that
  /// references them. Fails with `NotFound` if the id does not exist.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Travel cards ──────────────────────────────────────────────────────

  /// Create and persist a new travel card with a freshly generated display
  /// id.
  fn create_card(
    &self,
    input: NewTravelCard,
  ) -> impl Future<Output = Result<TravelCard, Self::Error>> + Send + '_;

  /// Retrieve a travel card by display id. Returns `None` if not found.
  fn get_card(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<TravelCard>, Self::Error>> + Send + '_;

  /// Replace a card's title and description.
  /// Fails with `NotFound` if the id does not exist.
  fn update_card(
    &self,
    id: Uuid,
    input: NewTravelCard,
  ) -> impl Future<Output = Result<TravelCard, Self::Error>> + Send + '_;

  /// Reassign a card's display id, cascading to every journey and
  /// membership row that references it.
  ///
  /// Display ids are treated as stable identity in practice; this exists so
  /// the schema does not break when it happens. Fails with `NotFound` if
  /// the card is absent and `DuplicateKey` if the new id is taken.
  fn update_card_display_id(
    &self,
    id: Uuid,
    new_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a travel card and, in the same transaction, all of its
  /// journeys and membership rows. Fails with `NotFound` if the id does
  /// not exist.
  fn delete_card(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Journeys ──────────────────────────────────────────────────────────

  /// Create and persist a new journey under an existing travel card.
  ///
  /// Fails with `ForeignKeyViolation` if the referenced card does not
  /// exist; no row is created in that case.
  fn create_journey(
    &self,
    input: NewJourney,
  ) -> impl Future<Output = Result<Journey, Self::Error>> + Send + '_;

  /// Retrieve a journey by display id. Returns `None` if not found.
  fn get_journey(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Journey>, Self::Error>> + Send + '_;

  /// Replace a journey's content fields (title, note, location, date,
  /// times). Fails with `NotFound` if the id does not exist.
  fn update_journey(
    &self,
    id: Uuid,
    edit: JourneyEdit,
  ) -> impl Future<Output = Result<Journey, Self::Error>> + Send + '_;

  /// Delete a single journey. Fails with `NotFound` if the id does not
  /// exist.
  fn delete_journey(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List a card's journeys ordered by date ascending, then start time
  /// ascending. Journeys with no start time sort after timed ones on the
  /// same date; remaining ties keep insertion order, so the sort is stable
  /// and deterministic.
  ///
  /// Returns an empty vec (not an error) if the card has no journeys or
  /// does not exist.
  fn list_journeys(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Journey>, Self::Error>> + Send + '_;

  // ── Membership ────────────────────────────────────────────────────────

  /// Record that a user belongs to a travel card.
  ///
  /// Fails with `DuplicateKey` if the pair already exists and
  /// `ForeignKeyViolation` naming the missing side if either referenced id
  /// is absent. Under concurrent calls for the same pair, exactly one
  /// caller succeeds.
  fn add_member(
    &self,
    card_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Membership, Self::Error>> + Send + '_;

  /// Remove a user from a travel card. Removing an absent pair is a no-op,
  /// not an error, so collaborators can retry freely.
  fn remove_member(
    &self,
    card_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The users associated with a travel card. Order is not significant.
  /// Returns an empty vec if the card is unknown or has no members.
  fn list_members(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// The travel cards a user belongs to. Returns an empty vec if the user
  /// is unknown or belongs to none.
  fn list_cards(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TravelCard>, Self::Error>> + Send + '_;
}
