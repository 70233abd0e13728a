//! Core types and trait definitions for the tripcard travel-planning store.
//!
//! This crate is deliberately free of database dependencies. Storage
//! backends and API layers both depend on it; it depends on nothing heavier
//! than serde and chrono.

pub mod card;
pub mod error;
pub mod journey;
pub mod membership;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
