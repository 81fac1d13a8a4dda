pub mod dashboard;
pub mod public;
pub mod publish;
pub mod settings;
pub mod users;

use crate::error::Error;

/// Fallback for every unmatched route.
pub async fn not_found() -> Error { Error::NotFound }
