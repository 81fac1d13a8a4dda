//! SQLite backend for the Folio site store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated threads
//! without blocking the async runtime. Also provides the `sessions` table
//! backend for `tower-sessions`.

mod encode;
mod pool;
mod schema;
mod session;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use session::SqliteSessionStore;
pub use store::SqliteStore;
