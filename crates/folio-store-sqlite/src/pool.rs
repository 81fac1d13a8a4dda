//! A small fixed set of SQLite connections handed out round-robin.
//!
//! Each [`tokio_rusqlite::Connection`] owns one background thread, so a pool
//! of `n` connections lets `n` queries run at once while the async runtime
//! keeps serving other requests. WAL mode lets readers proceed during a
//! write; concurrent writers wait on the busy timeout.

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use tokio_rusqlite::Connection;

use crate::{Error, Result, schema::SCHEMA};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub(crate) struct Pool {
  conns: Arc<[Connection]>,
  next:  Arc<AtomicUsize>,
}

impl Pool {
  /// Open `size` connections to the database at `path`. The schema is applied
  /// through the first connection before the others are opened.
  pub(crate) async fn open(path: &Path, size: usize) -> Result<Self> {
    if size == 0 {
      return Err(Error::EmptyPool);
    }

    let mut conns = Vec::with_capacity(size);
    for i in 0..size {
      let conn = Connection::open(path).await?;
      configure(&conn).await?;
      if i == 0 {
        init_schema(&conn).await?;
      }
      conns.push(conn);
    }

    tracing::debug!(path = %path.display(), size, "opened sqlite pool");
    Ok(Self::from_connections(conns))
  }

  /// A single in-memory connection. Every connection to `:memory:` is its own
  /// database, so the pool cannot be larger than one.
  pub(crate) async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().await?;
    configure(&conn).await?;
    init_schema(&conn).await?;
    Ok(Self::from_connections(vec![conn]))
  }

  fn from_connections(conns: Vec<Connection>) -> Self {
    Self {
      conns: conns.into(),
      next:  Arc::new(AtomicUsize::new(0)),
    }
  }

  pub(crate) fn get(&self) -> &Connection {
    let i = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
    &self.conns[i]
  }

  pub(crate) fn size(&self) -> usize { self.conns.len() }
}

async fn configure(conn: &Connection) -> Result<()> {
  conn
    .call(|conn| {
      conn.busy_timeout(BUSY_TIMEOUT)?;
      conn.execute_batch("PRAGMA foreign_keys = ON;")?;
      Ok(())
    })
    .await?;
  Ok(())
}

async fn init_schema(conn: &Connection) -> Result<()> {
  conn
    .call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await?;
  Ok(())
}
