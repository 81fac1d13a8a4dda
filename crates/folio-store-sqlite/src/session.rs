//! `sessions` table backend for `tower-sessions`.
//!
//! Session data is stored as a JSON object next to its expiry (unix
//! seconds). Expired rows are never returned by `load` and are removed by
//! [`SqliteSessionStore::delete_expired`].

use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use rusqlite::OptionalExtension as _;
use time::OffsetDateTime;
use tower_sessions::{
  SessionStore,
  session::{Id, Record},
  session_store,
};

use crate::{Result, pool::Pool};

/// How many times `create` draws a fresh id after a collision.
const MAX_COLLISION_RETRIES: u32 = 8;

#[derive(Clone)]
pub struct SqliteSessionStore {
  pool: Pool,
}

impl fmt::Debug for SqliteSessionStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SqliteSessionStore")
      .field("connections", &self.pool.size())
      .finish()
  }
}

impl SqliteSessionStore {
  pub(crate) fn new(pool: Pool) -> Self { Self { pool } }

  /// Delete every session whose expiry has passed. Returns the number of
  /// rows removed.
  pub async fn delete_expired(&self) -> Result<usize> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let removed = self
      .pool
      .get()
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expiry_date <= ?1",
          rusqlite::params![now],
        )?)
      })
      .await?;
    Ok(removed)
  }
}

fn backend(e: impl fmt::Display) -> session_store::Error { session_store::Error::Backend(e.to_string()) }

fn encode_data(record: &Record) -> session_store::Result<String> {
  serde_json::to_string(&record.data).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
  async fn create(&self, record: &mut Record) -> session_store::Result<()> {
    let data = encode_data(record)?;
    let expiry = record.expiry_date.unix_timestamp();

    for _ in 0..=MAX_COLLISION_RETRIES {
      let (id, data) = (record.id.to_string(), data.clone());
      let inserted = self
        .pool
        .get()
        .call(move |conn| {
          Ok(conn.execute(
            "INSERT INTO sessions (id, data, expiry_date) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO NOTHING",
            rusqlite::params![id, data, expiry],
          )?)
        })
        .await
        .map_err(backend)?;

      if inserted == 1 {
        return Ok(());
      }
      record.id = Id::default();
    }

    Err(backend(format!(
      "session id collision retried too many times ({MAX_COLLISION_RETRIES})"
    )))
  }

  async fn save(&self, record: &Record) -> session_store::Result<()> {
    let id = record.id.to_string();
    let data = encode_data(record)?;
    let expiry = record.expiry_date.unix_timestamp();

    self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (id, data, expiry_date) VALUES (?1, ?2, ?3)
           ON CONFLICT (id) DO UPDATE SET data = excluded.data, expiry_date = excluded.expiry_date",
          rusqlite::params![id, data, expiry],
        )?;
        Ok(())
      })
      .await
      .map_err(backend)
  }

  async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
    let key = session_id.to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let row: Option<(String, i64)> = self
      .pool
      .get()
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT data, expiry_date FROM sessions WHERE id = ?1 AND expiry_date > ?2",
              rusqlite::params![key, now],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(backend)?;

    let Some((data, expiry)) = row else {
      return Ok(None);
    };

    let data: HashMap<String, serde_json::Value> =
      serde_json::from_str(&data).map_err(|e| session_store::Error::Decode(e.to_string()))?;
    let expiry_date = OffsetDateTime::from_unix_timestamp(expiry)
      .map_err(|e| session_store::Error::Decode(e.to_string()))?;

    Ok(Some(Record {
      id: *session_id,
      data,
      expiry_date,
    }))
  }

  async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
    let key = session_id.to_string();
    self
      .pool
      .get()
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE id = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await
      .map_err(backend)
  }
}
