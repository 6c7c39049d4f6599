//! Serde-deserializable types matching the record service's responses.
//!
//! Kept apart from the domain types so that a missing id on the wire stays
//! visible here and never leaks into [`User`].

use serde::Deserialize;
use tracing::warn;

use super::types::User;

/// User record as returned by the remote service.
///
/// Any field beyond these three (address, phone, company, ...) is ignored.
#[derive(Debug, Deserialize)]
pub struct ApiUser {
  #[serde(default)]
  pub id: Option<u64>,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
}

impl ApiUser {
  /// Convert into a domain record. A record without an id gets id 0.
  pub fn into_user(self) -> User {
    let id = match self.id {
      Some(id) => id,
      None => {
        warn!(name = %self.name, "remote user record has no id, using 0");
        0
      }
    };

    User {
      id,
      name: self.name,
      email: self.email,
    }
  }
}

impl From<ApiUser> for User {
  fn from(api: ApiUser) -> Self {
    api.into_user()
  }
}
