//! `folio-admin`: one-off administration of a Folio database.
//!
//! # Usage
//!
//! ```text
//! folio-admin --database folio.db migrate
//! folio-admin create-admin
//! folio-admin reset-password --username admin
//! folio-admin seed-slider /images/slide-1.jpg /images/slide-2.jpg
//! ```

mod commands;

use std::{
  io::{self, BufRead as _, Write as _},
  path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commands::CreateAdmin;
use folio_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "folio-admin", about = "Administration tool for the Folio site store")]
struct Args {
  /// SQLite database file.
  #[arg(short, long, default_value = "folio.db", env = "FOLIO_DATABASE_PATH")]
  database: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the database and apply the schema.
  Migrate,
  /// Prompt for credentials and create an admin account.
  CreateAdmin,
  /// Set a new password for an existing account.
  ResetPassword {
    #[arg(short, long)]
    username: String,
    /// Prompted for when omitted.
    #[arg(short, long)]
    password: Option<String>,
  },
  /// Insert the default biography unless one exists.
  SeedBiography,
  /// Append hero-slider images.
  SeedSlider {
    #[arg(required = true)]
    image_urls: Vec<String>,
  },
  /// Print the argon2 hash of a prompted password.
  HashPassword,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();

  match args.command {
    Command::Migrate => {
      open(&args.database).await?;
      tracing::info!(database = ?args.database, "schema is up to date");
    }
    Command::CreateAdmin => {
      let store = open(&args.database).await?;
      let username = prompt("Username: ")?;
      let password = prompt("Password: ")?;
      match commands::create_admin(&store, &username, &password).await? {
        CreateAdmin::Created(user) => println!("Created user {:?} (id {}).", user.username, user.id),
        CreateAdmin::UsernameTaken => anyhow::bail!("username {username:?} already exists"),
      }
    }
    Command::ResetPassword { username, password } => {
      let store = open(&args.database).await?;
      let password = match password {
        Some(p) => p,
        None => prompt("New password: ")?,
      };
      commands::reset_password(&store, &username, &password).await?;
      println!("Password updated for {username:?}.");
    }
    Command::SeedBiography => {
      let store = open(&args.database).await?;
      if commands::seed_biography(&store).await? {
        println!("Default biography created.");
      } else {
        println!("Biography already exists, skipping.");
      }
    }
    Command::SeedSlider { image_urls } => {
      let store = open(&args.database).await?;
      let added = commands::seed_slider(&store, image_urls).await?;
      println!("Added {added} slide(s).");
    }
    Command::HashPassword => {
      let password = prompt("Password: ")?;
      println!("{}", folio_core::password::hash_password(&password)?);
    }
  }

  Ok(())
}

/// Open the store with a single connection. Opening applies the schema.
async fn open(path: &Path) -> Result<SqliteStore> {
  SqliteStore::open(path, 1)
    .await
    .with_context(|| format!("failed to open database at {path:?}"))
}

/// Read one trimmed line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
  let mut out = io::stdout();
  write!(out, "{label}")?;
  out.flush()?;
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read from stdin")?;
  Ok(line.trim().to_owned())
}
