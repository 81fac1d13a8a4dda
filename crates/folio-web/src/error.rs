//! Error types and axum `IntoResponse` implementation.
//!
//! Public-facing failures render the site's own error pages; nothing about
//! the underlying cause is exposed to the visitor.

use askama::Template;
use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use folio_core::store::StoreError;
use thiserror::Error;

use crate::views::{ErrorPage, NotFoundPage};

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found")]
  NotFound,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("template error: {0}")]
  Render(#[from] askama::Error),
  #[error("session error: {0}")]
  Session(#[from] tower_sessions::session::Error),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("upload error: {0}")]
  Upload(#[from] std::io::Error),
  #[error(transparent)]
  Core(#[from] folio_core::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: StoreError>(e: E) -> Self { Error::Store(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn page(status: StatusCode, rendered: askama::Result<String>, fallback: &'static str) -> Response {
  match rendered {
    Ok(html) => (status, Html(html)).into_response(),
    Err(e) => {
      tracing::error!(error = %e, "failed to render error page");
      (status, fallback).into_response()
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::NotFound => page(StatusCode::NOT_FOUND, NotFoundPage.render(), "Not Found"),
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      e => {
        tracing::error!(error = %e, "request failed");
        page(StatusCode::INTERNAL_SERVER_ERROR, ErrorPage.render(), "Server Error")
      }
    }
  }
}
