//! User — an account holder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, validate};

/// Where a user's credentials live.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
  /// Authenticated through an external OAuth identity provider.
  ExternalOauth,
  /// Username and hashed secret held locally.
  #[default]
  LocalCredentials,
}

/// An account holder. The display id is the only identifier that ever
/// leaves the store; the internal sequence id stays behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub display_id:  Uuid,
  pub username:    String,
  /// Hashed credential secret. Hashing happens upstream in the auth flow;
  /// the store treats this as opaque text.
  pub secret_hash: Option<String>,
  pub provider:    Provider,
}

/// Input to [`crate::store::CardStore::create_user`].
/// The display id is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:    String,
  pub secret_hash: Option<String>,
  pub provider:    Provider,
}

impl NewUser {
  /// Convenience constructor for a local-credentials user with no secret.
  pub fn new(username: impl Into<String>) -> Self {
    Self {
      username:    username.into(),
      secret_hash: None,
      provider:    Provider::default(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate::required("user", "username", &self.username)?;
    if let Some(hash) = &self.secret_hash {
      validate::bounded("user", "secret_hash", hash)?;
    }
    Ok(())
  }
}
