//! folio-server binary.
//!
//! Reads `folio.toml` (or the path given with `--config`) layered under
//! `FOLIO_*` environment variables, opens the SQLite store and serves the
//! site over HTTP.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use folio_store_sqlite::{SqliteSessionStore, SqliteStore};
use folio_web::{AppState, ServerConfig, analytics::geo::GeoResolver};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How often expired sessions are purged.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Parser)]
#[command(author, version, about = "Folio portfolio site server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "folio.toml", env = "FOLIO_CONFIG")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FOLIO").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  anyhow::ensure!(
    !server_cfg.session_secret.is_empty(),
    "session_secret must be set (FOLIO_SESSION_SECRET)"
  );

  let store = SqliteStore::open(&server_cfg.database_path, server_cfg.pool_size)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.database_path))?;

  let geo = match &server_cfg.geoip_path {
    Some(path) => GeoResolver::open(path)
      .with_context(|| format!("failed to open GeoIP database at {path:?}"))?,
    None => {
      tracing::warn!("no geoip_path configured; visitor locations will be Unknown");
      GeoResolver::disabled()
    }
  };

  let sessions = store.session_store();
  tokio::spawn(sweep_sessions(sessions.clone()));

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!(
    environment = %server_cfg.environment,
    pool_size = store.pool_size(),
    "starting folio-server"
  );

  let state = AppState::new(store, server_cfg, geo);
  let app = folio_web::router(state, sessions);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

/// Periodically delete expired session rows.
async fn sweep_sessions(sessions: SqliteSessionStore) {
  let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
  loop {
    interval.tick().await;
    match sessions.delete_expired().await {
      Ok(0) => {}
      Ok(n) => tracing::debug!(removed = n, "swept expired sessions"),
      Err(e) => tracing::warn!(error = %e, "session sweep failed"),
    }
  }
}
