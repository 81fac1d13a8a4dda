//! Core types and trait definitions for the Folio portfolio site.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend, the web layer and the admin tool all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod category;
pub mod content;
pub mod error;
pub mod password;
pub mod settings;
pub mod store;
pub mod user;

pub use error::{Error, Result};
