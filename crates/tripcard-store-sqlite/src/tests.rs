//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveTime};
use tripcard_core::{
  Error as CoreError,
  card::{NewTravelCard, TravelCard},
  journey::{JourneyEdit, NewJourney},
  store::CardStore,
  user::{NewUser, Provider, User},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(s: &str) -> NaiveDate { s.parse().expect("date literal") }

fn time(s: &str) -> NaiveTime {
  NaiveTime::parse_from_str(s, "%H:%M").expect("time literal")
}

async fn card(s: &SqliteStore) -> TravelCard {
  s.create_card(NewTravelCard::new("Summer trip", "two weeks around Kyushu"))
    .await
    .unwrap()
}

async fn user(s: &SqliteStore, username: &str) -> User {
  s.create_user(NewUser::new(username)).await.unwrap()
}

fn journey_on(
  card_id: Uuid,
  title: &str,
  date_s: &str,
  start: Option<&str>,
) -> NewJourney {
  let mut input = NewJourney::new(card_id, title, date(date_s));
  input.start_time = start.map(time);
  input
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;

  let created = user(&s, "alice").await;
  assert_eq!(created.username, "alice");
  assert_eq!(created.provider, Provider::LocalCredentials);
  assert!(created.secret_hash.is_none());

  let fetched = s.get_user(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.display_id, created.display_id);
  assert_eq!(fetched.username, "alice");

  let by_name = s.get_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(by_name.display_id, created.display_id);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_rejected() {
  let s = store().await;
  user(&s, "alice").await;

  let err = s.create_user(NewUser::new("alice")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::DuplicateKey {
      entity: "user",
      field: "username",
      ..
    })
  ));
}

#[tokio::test]
async fn provider_and_secret_roundtrip() {
  let s = store().await;

  let mut input = NewUser::new("carol");
  input.provider = Provider::ExternalOauth;
  input.secret_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into());
  let created = s.create_user(input).await.unwrap();

  let fetched = s.get_user(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.provider, Provider::ExternalOauth);
  assert_eq!(
    fetched.secret_hash.as_deref(),
    Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def")
  );
}

#[tokio::test]
async fn overlong_username_rejected_without_row() {
  let s = store().await;
  let long = "x".repeat(101);

  let err = s.create_user(NewUser::new(long.clone())).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::Validation {
      field: "username",
      ..
    })
  ));
  assert!(s.get_user_by_username(&long).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_username_rejected() {
  let s = store().await;
  let err = s.create_user(NewUser::new("")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::Validation {
      field: "username",
      ..
    })
  ));
}

#[tokio::test]
async fn delete_user_missing_is_not_found() {
  let s = store().await;
  let err = s.delete_user(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound { entity: "user", .. })
  ));
}

#[tokio::test]
async fn delete_user_removes_row() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  s.delete_user(alice.display_id).await.unwrap();
  assert!(s.get_user(alice.display_id).await.unwrap().is_none());

  let err = s.delete_user(alice.display_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound { entity: "user", .. })
  ));
}

// ─── Travel cards ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_get_update_card() {
  let s = store().await;

  let created = card(&s).await;
  let fetched = s.get_card(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Summer trip");

  let updated = s
    .update_card(
      created.display_id,
      NewTravelCard::new("Autumn trip", "rescheduled"),
    )
    .await
    .unwrap();
  assert_eq!(updated.display_id, created.display_id);

  let fetched = s.get_card(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Autumn trip");
  assert_eq!(fetched.description, "rescheduled");
}

#[tokio::test]
async fn update_card_missing_is_not_found() {
  let s = store().await;
  let err = s
    .update_card(Uuid::new_v4(), NewTravelCard::new("Ghost", ""))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound {
      entity: "travel_card",
      ..
    })
  ));
}

#[tokio::test]
async fn card_title_bounds_enforced() {
  let s = store().await;

  let err = s
    .create_card(NewTravelCard::new("t".repeat(101), ""))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::Validation { field: "title", .. })
  ));

  let err = s.create_card(NewTravelCard::new("", "")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::Validation { field: "title", .. })
  ));

  // An empty description is fine; only the length bound applies to it.
  s.create_card(NewTravelCard::new("Weekend", "")).await.unwrap();
}

#[tokio::test]
async fn delete_card_missing_is_not_found() {
  let s = store().await;
  let err = s.delete_card(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound {
      entity: "travel_card",
      ..
    })
  ));
}

// ─── Journeys ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_journey_and_get() {
  let s = store().await;
  let c = card(&s).await;

  let mut input = journey_on(c.display_id, "Ferry to Beppu", "2024-05-01", Some("09:30"));
  input.location = "Osaka port".into();
  input.note = "tickets in shared folder".into();
  let created = s.create_journey(input).await.unwrap();

  let fetched = s.get_journey(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.card_id, c.display_id);
  assert_eq!(fetched.title, "Ferry to Beppu");
  assert_eq!(fetched.location, "Osaka port");
  assert_eq!(fetched.date, date("2024-05-01"));
  assert_eq!(fetched.start_time, Some(time("09:30")));
  assert_eq!(fetched.end_time, None);
}

#[tokio::test]
async fn journey_for_unknown_card_rejected() {
  let s = store().await;
  let ghost = Uuid::new_v4();

  let err = s
    .create_journey(NewJourney::new(ghost, "Ferry", date("2024-05-01")))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::ForeignKeyViolation {
      entity: "travel_card",
      ..
    })
  ));
  assert!(s.list_journeys(ghost).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_journeys_orders_by_date_then_time() {
  let s = store().await;
  let c = card(&s).await;

  let jan3 = s
    .create_journey(journey_on(c.display_id, "Museum", "2024-01-03", None))
    .await
    .unwrap();
  let nine = s
    .create_journey(journey_on(c.display_id, "Train", "2024-01-01", Some("09:00")))
    .await
    .unwrap();
  let eight = s
    .create_journey(journey_on(c.display_id, "Breakfast", "2024-01-01", Some("08:00")))
    .await
    .unwrap();

  let listed = s.list_journeys(c.display_id).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|j| j.display_id).collect();
  assert_eq!(ids, vec![eight.display_id, nine.display_id, jan3.display_id]);
}

#[tokio::test]
async fn untimed_journeys_sort_after_timed_on_same_date() {
  let s = store().await;
  let c = card(&s).await;

  // Inserted first, but with no start time it still lists last.
  let untimed = s
    .create_journey(journey_on(c.display_id, "Free day", "2024-01-01", None))
    .await
    .unwrap();
  let timed = s
    .create_journey(journey_on(c.display_id, "Hike", "2024-01-01", Some("07:00")))
    .await
    .unwrap();

  let listed = s.list_journeys(c.display_id).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|j| j.display_id).collect();
  assert_eq!(ids, vec![timed.display_id, untimed.display_id]);
}

#[tokio::test]
async fn equal_sort_keys_keep_insertion_order() {
  let s = store().await;
  let c = card(&s).await;

  let first = s
    .create_journey(journey_on(c.display_id, "Option A", "2024-01-01", None))
    .await
    .unwrap();
  let second = s
    .create_journey(journey_on(c.display_id, "Option B", "2024-01-01", None))
    .await
    .unwrap();

  let listed = s.list_journeys(c.display_id).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|j| j.display_id).collect();
  assert_eq!(ids, vec![first.display_id, second.display_id]);
}

#[tokio::test]
async fn list_journeys_unknown_or_empty_card_is_empty() {
  let s = store().await;
  assert!(s.list_journeys(Uuid::new_v4()).await.unwrap().is_empty());

  let c = card(&s).await;
  assert!(s.list_journeys(c.display_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_journey_replaces_content_fields() {
  let s = store().await;
  let c = card(&s).await;
  let created = s
    .create_journey(journey_on(c.display_id, "Train", "2024-01-01", Some("09:00")))
    .await
    .unwrap();

  let updated = s
    .update_journey(
      created.display_id,
      JourneyEdit {
        title:      "Express train".into(),
        note:       "seat reservations required".into(),
        location:   "Hakata".into(),
        date:       date("2024-01-02"),
        start_time: Some(time("10:15")),
        end_time:   Some(time("12:40")),
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.display_id, created.display_id);
  assert_eq!(updated.card_id, c.display_id);
  assert_eq!(updated.title, "Express train");
  assert_eq!(updated.date, date("2024-01-02"));
  assert_eq!(updated.end_time, Some(time("12:40")));
}

#[tokio::test]
async fn update_journey_missing_is_not_found() {
  let s = store().await;
  let err = s
    .update_journey(
      Uuid::new_v4(),
      JourneyEdit {
        title:      "Ghost".into(),
        note:       String::new(),
        location:   String::new(),
        date:       date("2024-01-01"),
        start_time: None,
        end_time:   None,
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound { entity: "journey", .. })
  ));
}

#[tokio::test]
async fn delete_journey_removes_single_leg() {
  let s = store().await;
  let c = card(&s).await;
  let keep = s
    .create_journey(journey_on(c.display_id, "Keep", "2024-01-01", None))
    .await
    .unwrap();
  let doomed = s
    .create_journey(journey_on(c.display_id, "Drop", "2024-01-02", None))
    .await
    .unwrap();

  s.delete_journey(doomed.display_id).await.unwrap();

  let listed = s.list_journeys(c.display_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].display_id, keep.display_id);

  let err = s.delete_journey(doomed.display_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound { entity: "journey", .. })
  ));
}

#[tokio::test]
async fn end_time_before_start_time_accepted() {
  let s = store().await;
  let c = card(&s).await;

  // Overnight leg: departs 22:00, arrives 06:00 the next morning.
  let mut input = journey_on(c.display_id, "Night bus", "2024-02-01", Some("22:00"));
  input.end_time = Some(time("06:00"));
  let created = s.create_journey(input).await.unwrap();

  let fetched = s.get_journey(created.display_id).await.unwrap().unwrap();
  assert_eq!(fetched.start_time, Some(time("22:00")));
  assert_eq!(fetched.end_time, Some(time("06:00")));
}

// ─── Membership ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_members() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;

  let membership = s.add_member(c.display_id, alice.display_id).await.unwrap();
  assert_eq!(membership.card_id, c.display_id);
  assert_eq!(membership.user_id, alice.display_id);

  let members = s.list_members(c.display_id).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].display_id, alice.display_id);

  let cards = s.list_cards(alice.display_id).await.unwrap();
  assert_eq!(cards.len(), 1);
  assert_eq!(cards[0].display_id, c.display_id);
}

#[tokio::test]
async fn duplicate_membership_rejected() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;

  s.add_member(c.display_id, alice.display_id).await.unwrap();
  let err = s
    .add_member(c.display_id, alice.display_id)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::DuplicateKey {
      entity: "membership",
      ..
    })
  ));

  // Exactly one stored row survives.
  assert_eq!(s.list_members(c.display_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_member_names_the_missing_side() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;

  let err = s
    .add_member(Uuid::new_v4(), alice.display_id)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::ForeignKeyViolation {
      entity: "travel_card",
      ..
    })
  ));

  let err = s.add_member(c.display_id, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::ForeignKeyViolation { entity: "user", .. })
  ));
}

#[tokio::test]
async fn remove_member_is_idempotent() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;

  s.add_member(c.display_id, alice.display_id).await.unwrap();
  s.remove_member(c.display_id, alice.display_id).await.unwrap();
  assert!(s.list_members(c.display_id).await.unwrap().is_empty());

  // Removing an absent pair succeeds.
  s.remove_member(c.display_id, alice.display_id).await.unwrap();
  s.remove_member(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn concurrent_add_member_single_winner() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;

  let (card_id, user_id) = (c.display_id, alice.display_id);
  let s1 = s.clone();
  let s2 = s.clone();
  let a = tokio::spawn(async move { s1.add_member(card_id, user_id).await });
  let b = tokio::spawn(async move { s2.add_member(card_id, user_id).await });
  let (a, b) = (a.await.unwrap(), b.await.unwrap());

  assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
  let err = if a.is_err() {
    a.unwrap_err()
  } else {
    b.unwrap_err()
  };
  assert!(matches!(
    err,
    Error::Store(CoreError::DuplicateKey {
      entity: "membership",
      ..
    })
  ));
  assert_eq!(s.list_members(card_id).await.unwrap().len(), 1);
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_card_cascades_to_journeys_and_memberships() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let j1 = s
    .create_journey(journey_on(c.display_id, "Train", "2024-01-01", Some("09:00")))
    .await
    .unwrap();
  let j2 = s
    .create_journey(journey_on(c.display_id, "Museum", "2024-01-02", None))
    .await
    .unwrap();
  s.add_member(c.display_id, alice.display_id).await.unwrap();
  s.add_member(c.display_id, bob.display_id).await.unwrap();

  s.delete_card(c.display_id).await.unwrap();

  assert!(s.get_card(c.display_id).await.unwrap().is_none());
  assert!(s.get_journey(j1.display_id).await.unwrap().is_none());
  assert!(s.get_journey(j2.display_id).await.unwrap().is_none());
  assert!(s.list_journeys(c.display_id).await.unwrap().is_empty());
  assert!(s.list_cards(alice.display_id).await.unwrap().is_empty());
  assert!(s.list_cards(bob.display_id).await.unwrap().is_empty());

  // The users themselves are untouched.
  assert!(s.get_user(alice.display_id).await.unwrap().is_some());
  assert!(s.get_user(bob.display_id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_user_cascades_to_exactly_their_memberships() {
  let s = store().await;
  let c1 = card(&s).await;
  let c2 = s
    .create_card(NewTravelCard::new("Winter trip", "ski week"))
    .await
    .unwrap();
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.add_member(c1.display_id, alice.display_id).await.unwrap();
  s.add_member(c2.display_id, alice.display_id).await.unwrap();
  s.add_member(c1.display_id, bob.display_id).await.unwrap();

  s.delete_user(alice.display_id).await.unwrap();

  let c1_members = s.list_members(c1.display_id).await.unwrap();
  assert_eq!(c1_members.len(), 1);
  assert_eq!(c1_members[0].display_id, bob.display_id);
  assert!(s.list_members(c2.display_id).await.unwrap().is_empty());

  // The cards themselves are untouched.
  assert!(s.get_card(c1.display_id).await.unwrap().is_some());
  assert!(s.get_card(c2.display_id).await.unwrap().is_some());
}

#[tokio::test]
async fn display_id_update_cascades_to_references() {
  let s = store().await;
  let c = card(&s).await;
  let alice = user(&s, "alice").await;
  let j = s
    .create_journey(journey_on(c.display_id, "Train", "2024-01-01", Some("09:00")))
    .await
    .unwrap();
  s.add_member(c.display_id, alice.display_id).await.unwrap();

  let new_id = Uuid::new_v4();
  s.update_card_display_id(c.display_id, new_id).await.unwrap();

  assert!(s.get_card(c.display_id).await.unwrap().is_none());
  let moved = s.get_card(new_id).await.unwrap().unwrap();
  assert_eq!(moved.title, "Summer trip");

  assert!(s.list_journeys(c.display_id).await.unwrap().is_empty());
  let listed = s.list_journeys(new_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].display_id, j.display_id);
  assert_eq!(listed[0].card_id, new_id);

  let cards = s.list_cards(alice.display_id).await.unwrap();
  assert_eq!(cards.len(), 1);
  assert_eq!(cards[0].display_id, new_id);
}

#[tokio::test]
async fn display_id_update_missing_is_not_found() {
  let s = store().await;
  let err = s
    .update_card_display_id(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::NotFound {
      entity: "travel_card",
      ..
    })
  ));
}

#[tokio::test]
async fn display_id_update_to_taken_id_rejected() {
  let s = store().await;
  let c1 = card(&s).await;
  let c2 = s
    .create_card(NewTravelCard::new("Winter trip", "ski week"))
    .await
    .unwrap();

  let err = s
    .update_card_display_id(c1.display_id, c2.display_id)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Store(CoreError::DuplicateKey {
      entity: "travel_card",
      field: "display_id",
      ..
    })
  ));

  // Both cards keep their original identity.
  assert!(s.get_card(c1.display_id).await.unwrap().is_some());
  assert!(s.get_card(c2.display_id).await.unwrap().is_some());
}
