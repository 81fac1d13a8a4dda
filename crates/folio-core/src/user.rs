//! Admin accounts.

use std::fmt;

use chrono::{DateTime, Utc};

/// An admin account. Every user is an administrator; there are no roles.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
  pub id:            i64,
  /// Unique, compared case-sensitively.
  pub username:      String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`.
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl fmt::Debug for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("User")
      .field("id", &self.id)
      .field("username", &self.username)
      .field("created_at", &self.created_at)
      .finish_non_exhaustive()
  }
}
