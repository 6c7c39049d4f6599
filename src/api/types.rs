use serde::{Deserialize, Serialize};

/// A user record as held by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
  pub email: String,
}

/// Write payload for create and update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserData {
  pub name: String,
  pub email: String,
}

impl User {
  /// The editable part of this record
  pub fn data(&self) -> UserData {
    UserData {
      name: self.name.clone(),
      email: self.email.clone(),
    }
  }
}
