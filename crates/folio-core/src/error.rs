//! Error types for `folio-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown section: {0:?}")]
  UnknownSection(String),

  /// The section exists but cannot be reached through this route family
  /// (e.g. the biography singleton through the generic CRUD routes).
  #[error("section {0} is not available here")]
  SectionUnavailable(&'static str),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
