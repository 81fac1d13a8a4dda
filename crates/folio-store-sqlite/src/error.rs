//! Error type for `folio-store-sqlite`.

use folio_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown category in database: {0:?}")]
  UnknownCategory(String),

  /// The `users.username` uniqueness constraint refused an insert.
  #[error("username already exists: {0}")]
  UsernameTaken(String),

  #[error("connection pool must hold at least one connection")]
  EmptyPool,
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Error::UsernameTaken(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
