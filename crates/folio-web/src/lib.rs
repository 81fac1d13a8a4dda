//! HTTP layer for the Folio portfolio site.
//!
//! Exposes an axum [`Router`] serving the public pages, the session-gated
//! admin panel and the static files, backed by any [`SiteStore`].

pub mod analytics;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod seo;
pub mod upload;
pub mod views;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  middleware,
  routing::get,
};
use folio_core::store::SiteStore;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{
  Expiry, SessionManagerLayer, SessionStore,
  cookie::{Key, SameSite},
};

use analytics::{geo::GeoResolver, online::OnlineRegistry};
use handlers::{dashboard, public, publish, settings, users};

/// Largest accepted request body on admin routes (image uploads).
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub const SESSION_COOKIE: &str = "folio.sid";

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
  #[default]
  Development,
  Production,
}

/// Runtime server configuration, deserialised from `folio.toml` and
/// `FOLIO_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_database_path")]
  pub database_path:     PathBuf,
  #[serde(default = "default_pool_size")]
  pub pool_size:         usize,
  /// Secret from which the cookie signing key is derived.
  pub session_secret:    String,
  #[serde(default)]
  pub environment:       Environment,
  #[serde(default = "default_upload_dir")]
  pub upload_dir:        PathBuf,
  #[serde(default = "default_public_dir")]
  pub public_dir:        PathBuf,
  /// MaxMind City database. Without one every visitor is "Unknown".
  #[serde(default)]
  pub geoip_path:        Option<PathBuf>,
  #[serde(default = "default_site_url")]
  pub site_url:          String,
  #[serde(default = "default_query_timeout_ms")]
  pub query_timeout_ms:  u64,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_database_path() -> PathBuf { PathBuf::from("folio.db") }
fn default_pool_size() -> usize { 5 }
fn default_upload_dir() -> PathBuf { PathBuf::from("public/uploads") }
fn default_public_dir() -> PathBuf { PathBuf::from("public") }
fn default_site_url() -> String { "http://localhost:3000".to_string() }
fn default_query_timeout_ms() -> u64 { 2000 }
fn default_session_ttl_hours() -> i64 { 24 }

impl ServerConfig {
  /// A configuration with every default and the given secret.
  pub fn with_secret(session_secret: impl Into<String>) -> Self {
    Self {
      host:              default_host(),
      port:              default_port(),
      database_path:     default_database_path(),
      pool_size:         default_pool_size(),
      session_secret:    session_secret.into(),
      environment:       Environment::default(),
      upload_dir:        default_upload_dir(),
      public_dir:        default_public_dir(),
      geoip_path:        None,
      site_url:          default_site_url(),
      query_timeout_ms:  default_query_timeout_ms(),
      session_ttl_hours: default_session_ttl_hours(),
    }
  }

  /// 64-byte cookie signing key, the SHA-512 digest of the session secret.
  pub fn signing_key(&self) -> Key {
    let digest = Sha512::digest(self.session_secret.as_bytes());
    Key::from(digest.as_slice())
  }

  /// Cookies are marked `Secure` in production only.
  pub fn secure_cookies(&self) -> bool { self.environment == Environment::Production }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SiteStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub online: Arc<OnlineRegistry>,
  pub geo:    Arc<GeoResolver>,
}

impl<S: SiteStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig, geo: GeoResolver) -> Self {
    Self {
      store:  Arc::new(store),
      config: Arc::new(config),
      online: Arc::new(OnlineRegistry::new()),
      geo:    Arc::new(geo),
    }
  }

  /// Upper bound on each analytics read.
  pub fn query_timeout(&self) -> Duration { Duration::from_millis(self.config.query_timeout_ms) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the site's [`Router`]. Sessions are persisted in `sessions`.
pub fn router<S, Sess>(state: AppState<S>, sessions: Sess) -> Router
where
  S: SiteStore + Clone + 'static,
  Sess: SessionStore + Clone,
{
  let session_layer = SessionManagerLayer::new(sessions)
    .with_name(SESSION_COOKIE)
    .with_secure(state.config.secure_cookies())
    .with_same_site(SameSite::Lax)
    .with_http_only(true)
    .with_expiry(Expiry::OnInactivity(time::Duration::hours(
      state.config.session_ttl_hours,
    )))
    .with_signed(state.config.signing_key());

  let admin = Router::new()
    .route("/",                          get(dashboard::show::<S>))
    .route("/biography",                 get(publish::biography_form::<S>).post(publish::save_biography::<S>))
    .route("/users",                     get(users::list::<S>))
    .route("/users/create",              get(users::create_form).post(users::create::<S>))
    .route("/password",                  get(auth::password_form).post(auth::change_password::<S>))
    .route("/settings",                  get(settings::show).post(settings::save::<S>))
    .route("/{section}",                 get(publish::list::<S>))
    .route("/{section}/create",          get(publish::create_form).post(publish::create::<S>))
    .route("/{section}/edit/{id}",       get(publish::edit_form::<S>).post(publish::edit::<S>))
    .route("/{section}/delete/{id}",     get(publish::delete::<S>))
    .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

  let pages = Router::new()
    .route("/",                          get(public::home::<S>))
    .route("/auth/login",                get(auth::login_form).post(auth::login::<S>))
    .route("/auth/logout",               get(auth::logout))
    .route("/{category}",                get(public::category::<S>))
    .route("/{category}/{id}",           get(public::single::<S>))
    .nest("/admin", admin)
    .layer(session_layer);

  let upload_dir = state.config.upload_dir.clone();
  let public_dir = state.config.public_dir.clone();

  // Analytics wraps every request, the fallback and file services included.
  pages
    .nest_service("/uploads", ServeDir::new(upload_dir))
    .nest_service("/static", ServeDir::new(public_dir))
    .fallback(handlers::not_found)
    .layer(middleware::from_fn_with_state(state.clone(), analytics::collect::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
