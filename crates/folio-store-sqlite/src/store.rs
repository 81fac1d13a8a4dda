//! [`SqliteStore`], the SQLite implementation of [`SiteStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use folio_core::{
  analytics::{DayCount, LocationCount, NewPageView, PathCount, RecentView},
  category::Category,
  content::{ContentDraft, ContentItem, GalleryDraft, GalleryEntry, HeroSlide},
  settings::SiteSettings,
  store::SiteStore,
  user::User,
};

use crate::{
  Error, Result,
  encode::{
    CONTENT_COLUMNS, GALLERY_COLUMNS, RawContentItem, RawGalleryEntry, RawHeroSlide, RawUser,
    USER_COLUMNS, decode_day, decode_dt, encode_category, encode_dt,
  },
  pool::Pool,
  session::SqliteSessionStore,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The site store backed by a single SQLite file.
///
/// Cloning shares the reference-counted connection pool.
#[derive(Clone)]
pub struct SqliteStore {
  pool: Pool,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with `pool_size` connections and run
  /// schema initialisation.
  pub async fn open(path: impl AsRef<Path>, pool_size: usize) -> Result<Self> {
    let pool = Pool::open(path.as_ref(), pool_size).await?;
    Ok(Self { pool })
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let pool = Pool::open_in_memory().await?;
    Ok(Self { pool })
  }

  /// A `tower-sessions` backend sharing this store's connections.
  pub fn session_store(&self) -> SqliteSessionStore { SqliteSessionStore::new(self.pool.clone()) }

  pub fn pool_size(&self) -> usize { self.pool.size() }

  async fn query_content(&self, sql: String, category: Category, limit: Option<i64>) -> Result<Vec<ContentItem>> {
    let category = encode_category(category);

    let raws: Vec<RawContentItem> = self
      .pool
      .get()
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match limit {
          Some(n) => stmt
            .query_map(rusqlite::params![category, n], RawContentItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map(rusqlite::params![category], RawContentItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContentItem::into_item).collect()
  }

  async fn query_gallery(&self, limit: Option<i64>) -> Result<Vec<GalleryEntry>> {
    let raws: Vec<RawGalleryEntry> = self
      .pool
      .get()
      .call(move |conn| {
        // A negative LIMIT means "no limit" in SQLite.
        let mut stmt = conn.prepare(&format!(
          "SELECT {GALLERY_COLUMNS} FROM gallery ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit.unwrap_or(-1)], RawGalleryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGalleryEntry::into_entry).collect()
  }

  async fn count(&self, sql: &'static str, param: Option<String>) -> Result<i64> {
    let n = self
      .pool
      .get()
      .call(move |conn| {
        let n: i64 = match param {
          Some(p) => conn.query_row(sql, rusqlite::params![p], |r| r.get(0))?,
          None => conn.query_row(sql, [], |r| r.get(0))?,
        };
        Ok(n)
      })
      .await?;
    Ok(n)
  }
}

/// Insert the biography row unless one exists, as one statement so that
/// concurrent callers cannot both insert.
fn insert_biography(conn: &rusqlite::Connection, draft: &ContentDraft, created_at: &str) -> rusqlite::Result<bool> {
  let inserted = conn.execute(
    "INSERT INTO content_items (category, title, content, image_url, created_at)
     SELECT ?1, ?2, ?3, ?4, ?5
     WHERE NOT EXISTS (SELECT 1 FROM content_items WHERE category = ?1)",
    rusqlite::params![
      encode_category(Category::Biography),
      draft.title,
      draft.content,
      draft.image_url,
      created_at
    ],
  )?;
  Ok(inserted > 0)
}

// ─── SiteStore impl ──────────────────────────────────────────────────────────

impl SiteStore for SqliteStore {
  type Error = Error;

  // ── Content items ─────────────────────────────────────────────────────

  async fn list_content(&self, category: Category) -> Result<Vec<ContentItem>> {
    let sql = format!(
      "SELECT {CONTENT_COLUMNS} FROM content_items
       WHERE category = ?1
       ORDER BY created_at DESC, id DESC"
    );
    self.query_content(sql, category, None).await
  }

  async fn latest_content(&self, category: Category, limit: usize) -> Result<Vec<ContentItem>> {
    let sql = format!(
      "SELECT {CONTENT_COLUMNS} FROM content_items
       WHERE category = ?1
       ORDER BY created_at DESC, id DESC
       LIMIT ?2"
    );
    self.query_content(sql, category, Some(limit as i64)).await
  }

  async fn get_content(&self, category: Category, id: i64) -> Result<Option<ContentItem>> {
    let category = encode_category(category);

    let raw: Option<RawContentItem> = self
      .pool
      .get()
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTENT_COLUMNS} FROM content_items WHERE id = ?1 AND category = ?2"),
              rusqlite::params![id, category],
              RawContentItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContentItem::into_item).transpose()
  }

  async fn create_content(&self, category: Category, draft: ContentDraft) -> Result<ContentItem> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let cat_str = encode_category(category);
    let (title, content, image_url) = (draft.title.clone(), draft.content.clone(), draft.image_url.clone());

    let id = self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO content_items (category, title, content, image_url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![cat_str, title, content, image_url, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ContentItem {
      id,
      category,
      title: draft.title,
      content: draft.content,
      image_url: draft.image_url,
      // Round-trip through the stored form so the value matches a re-read.
      created_at: decode_dt(&encode_dt(created_at))?,
    })
  }

  async fn update_content(&self, category: Category, id: i64, draft: ContentDraft) -> Result<bool> {
    let cat_str = encode_category(category);

    let changed = self
      .pool
      .get()
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE content_items SET title = ?1, content = ?2, image_url = ?3
           WHERE id = ?4 AND category = ?5",
          rusqlite::params![draft.title, draft.content, draft.image_url, id, cat_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_content(&self, category: Category, id: i64) -> Result<bool> {
    let cat_str = encode_category(category);

    let changed = self
      .pool
      .get()
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM content_items WHERE id = ?1 AND category = ?2",
          rusqlite::params![id, cat_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn count_content(&self, category: Category) -> Result<i64> {
    self
      .count(
        "SELECT COUNT(*) FROM content_items WHERE category = ?1",
        Some(encode_category(category).to_owned()),
      )
      .await
  }

  // ── Biography ─────────────────────────────────────────────────────────

  async fn create_biography_if_absent(&self, draft: ContentDraft) -> Result<bool> {
    let at_str = encode_dt(Utc::now());
    let inserted = self
      .pool
      .get()
      .call(move |conn| Ok(insert_biography(conn, &draft, &at_str)?))
      .await?;
    Ok(inserted)
  }

  async fn save_biography(&self, draft: ContentDraft) -> Result<bool> {
    let at_str = encode_dt(Utc::now());
    let inserted = self
      .pool
      .get()
      .call(move |conn| {
        if insert_biography(conn, &draft, &at_str)? {
          return Ok(true);
        }
        conn.execute(
          "UPDATE content_items
           SET title = ?2, content = ?3, image_url = COALESCE(?4, image_url)
           WHERE category = ?1",
          rusqlite::params![
            encode_category(Category::Biography),
            draft.title,
            draft.content,
            draft.image_url
          ],
        )?;
        Ok(false)
      })
      .await?;
    Ok(inserted)
  }

  // ── Gallery ───────────────────────────────────────────────────────────

  async fn list_gallery(&self) -> Result<Vec<GalleryEntry>> { self.query_gallery(None).await }

  async fn latest_gallery(&self, limit: usize) -> Result<Vec<GalleryEntry>> {
    self.query_gallery(Some(limit as i64)).await
  }

  async fn get_gallery(&self, id: i64) -> Result<Option<GalleryEntry>> {
    let raw: Option<RawGalleryEntry> = self
      .pool
      .get()
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {GALLERY_COLUMNS} FROM gallery WHERE id = ?1"),
              rusqlite::params![id],
              RawGalleryEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGalleryEntry::into_entry).transpose()
  }

  async fn create_gallery(&self, draft: GalleryDraft) -> Result<GalleryEntry> {
    let at_str = encode_dt(Utc::now());
    let (image_url, caption, stored_at) = (draft.image_url.clone(), draft.caption.clone(), at_str.clone());

    let id = self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO gallery (image_url, caption, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![image_url, caption, stored_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(GalleryEntry {
      id,
      image_url: draft.image_url,
      caption: draft.caption,
      created_at: decode_dt(&at_str)?,
    })
  }

  async fn update_gallery(&self, id: i64, draft: GalleryDraft) -> Result<bool> {
    let changed = self
      .pool
      .get()
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE gallery SET caption = ?1, image_url = ?2 WHERE id = ?3",
          rusqlite::params![draft.caption, draft.image_url, id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_gallery(&self, id: i64) -> Result<bool> {
    let changed = self
      .pool
      .get()
      .call(move |conn| Ok(conn.execute("DELETE FROM gallery WHERE id = ?1", rusqlite::params![id])?))
      .await?;

    Ok(changed > 0)
  }

  async fn count_gallery(&self) -> Result<i64> { self.count("SELECT COUNT(*) FROM gallery", None).await }

  // ── Hero slider ───────────────────────────────────────────────────────

  async fn list_slides(&self) -> Result<Vec<HeroSlide>> {
    let raws: Vec<RawHeroSlide> = self
      .pool
      .get()
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, image_url, created_at FROM hero_slider ORDER BY id ASC")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHeroSlide {
              id:         row.get(0)?,
              image_url:  row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHeroSlide::into_slide).collect()
  }

  async fn add_slide(&self, image_url: String) -> Result<HeroSlide> {
    let at_str = encode_dt(Utc::now());
    let (url, stored_at) = (image_url.clone(), at_str.clone());

    let id = self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO hero_slider (image_url, created_at) VALUES (?1, ?2)",
          rusqlite::params![url, stored_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    RawHeroSlide { id, image_url, created_at: at_str }.into_slide()
  }

  // ── Settings ──────────────────────────────────────────────────────────

  async fn load_settings(&self) -> Result<SiteSettings> {
    let pairs: Vec<(String, String)> = self
      .pool
      .get()
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT setting_key, setting_value FROM settings")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(pairs.into_iter().collect())
  }

  async fn put_setting(&self, key: String, value: String) -> Result<()> {
    self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (setting_key, setting_value) VALUES (?1, ?2)
           ON CONFLICT (setting_key) DO UPDATE SET setting_value = excluded.setting_value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .pool
      .get()
      .call(move |conn| {
        // `=` on TEXT uses the BINARY collation: case-sensitive.
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
              rusqlite::params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .pool
      .get()
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .pool
      .get()
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn create_user(&self, username: String, password_hash: String) -> Result<User> {
    let at_str = encode_dt(Utc::now());
    let (name, hash, stored_at) = (username.clone(), password_hash.clone(), at_str.clone());

    let id: Option<i64> = self
      .pool
      .get()
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, hash, stored_at],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      tracing::debug!(%username, "username already taken");
      return Err(Error::UsernameTaken(username));
    };
    RawUser { id, username, password_hash, created_at: at_str }.into_user()
  }

  async fn set_password_hash(&self, user_id: i64, password_hash: String) -> Result<bool> {
    let changed = self
      .pool
      .get()
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?1 WHERE id = ?2",
          rusqlite::params![password_hash, user_id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Page views ────────────────────────────────────────────────────────

  async fn record_page_view(&self, view: NewPageView) -> Result<()> {
    let at_str = encode_dt(Utc::now());

    self
      .pool
      .get()
      .call(move |conn| {
        conn.execute(
          "INSERT INTO page_views (path, ip_address, user_agent, country, city, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            view.path,
            view.ip_address,
            view.user_agent,
            view.country,
            view.city,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count_views(&self) -> Result<i64> { self.count("SELECT COUNT(*) FROM page_views", None).await }

  async fn count_views_since(&self, since: DateTime<Utc>) -> Result<i64> {
    self
      .count("SELECT COUNT(*) FROM page_views WHERE created_at >= ?1", Some(encode_dt(since)))
      .await
  }

  async fn recent_views(&self, limit: usize) -> Result<Vec<RecentView>> {
    let limit = limit as i64;

    let rows = self
      .pool
      .get()
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT city, path FROM page_views ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RecentView {
              city: row.get(0)?,
              path: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn top_paths(&self, limit: usize) -> Result<Vec<PathCount>> {
    let limit = limit as i64;

    let rows = self
      .pool
      .get()
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT path, COUNT(*) AS views
           FROM page_views
           GROUP BY path
           ORDER BY views DESC, path ASC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(PathCount {
              path:  row.get(0)?,
              views: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn daily_views(&self, since: DateTime<Utc>) -> Result<Vec<DayCount>> {
    let since_str = encode_dt(since);

    let raws: Vec<(String, i64)> = self
      .pool
      .get()
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT substr(created_at, 1, 10) AS day, COUNT(*)
           FROM page_views
           WHERE created_at >= ?1
           GROUP BY day
           ORDER BY day ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(day, count)| Ok(DayCount { date: decode_day(&day)?, count }))
      .collect()
  }

  async fn top_locations(&self, limit: usize) -> Result<Vec<LocationCount>> {
    let limit = limit as i64;

    let rows = self
      .pool
      .get()
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT city || ', ' || country AS location, COUNT(*) AS views
           FROM page_views
           WHERE city != '' AND city != 'Unknown' AND city != 'Local'
             AND country IS NOT NULL
           GROUP BY location
           ORDER BY views DESC, location ASC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(LocationCount {
              location: row.get(0)?,
              count:    row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
