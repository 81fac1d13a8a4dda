//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with second precision
//! (`2024-05-01T09:30:00Z`), which sort lexicographically in time order and
//! whose first ten characters are the calendar day. Categories are stored as
//! their lowercase slug.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use folio_core::{
  category::Category,
  content::{ContentItem, GalleryEntry, HeroSlide},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Secs, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Category ────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str { c.as_str() }

pub fn decode_category(s: &str) -> Result<Category> {
  Category::from_str(s).map_err(|_| Error::UnknownCategory(s.to_owned()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const CONTENT_COLUMNS: &str = "id, category, title, content, image_url, created_at";

/// A `content_items` row as read from SQLite, before decoding.
pub struct RawContentItem {
  pub id:         i64,
  pub category:   String,
  pub title:      String,
  pub content:    String,
  pub image_url:  Option<String>,
  pub created_at: String,
}

impl RawContentItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      category:   row.get(1)?,
      title:      row.get(2)?,
      content:    row.get(3)?,
      image_url:  row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_item(self) -> Result<ContentItem> {
    Ok(ContentItem {
      id:         self.id,
      category:   decode_category(&self.category)?,
      title:      self.title,
      content:    self.content,
      image_url:  self.image_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const GALLERY_COLUMNS: &str = "id, image_url, caption, created_at";

pub struct RawGalleryEntry {
  pub id:         i64,
  pub image_url:  String,
  pub caption:    String,
  pub created_at: String,
}

impl RawGalleryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      image_url:  row.get(1)?,
      caption:    row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<GalleryEntry> {
    Ok(GalleryEntry {
      id:         self.id,
      image_url:  self.image_url,
      caption:    self.caption,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawHeroSlide {
  pub id:         i64,
  pub image_url:  String,
  pub created_at: String,
}

impl RawHeroSlide {
  pub fn into_slide(self) -> Result<HeroSlide> {
    Ok(HeroSlide {
      id:         self.id,
      image_url:  self.image_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const USER_COLUMNS: &str = "id, username, password_hash, created_at";

pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
