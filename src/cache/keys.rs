//! Cache keys and [`Cacheable`] implementations for user records.

use crate::api::User;

use super::traits::{Cacheable, QueryKey};

impl Cacheable for User {
  type Key = u64;

  fn cache_key(&self) -> u64 {
    self.id
  }
}

/// Query keys for the record service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserQueryKey {
  /// The full user collection
  Users,
}

impl QueryKey for UserQueryKey {
  fn cache_hash(&self) -> String {
    match self {
      Self::Users => "users".to_string(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::Users => "all users".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_users_key() {
    assert_eq!(UserQueryKey::Users.cache_hash(), "users");
  }
}
