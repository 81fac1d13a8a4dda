//! Published content: text items, gallery photos and hero-slider images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

// ─── Content items ───────────────────────────────────────────────────────────

/// A row of `content_items`: an essay, a poem, a book, the biography, …
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
  pub id:         i64,
  pub category:   Category,
  pub title:      String,
  /// Rich text (HTML) as produced by the admin editor.
  pub content:    String,
  /// Public URL of the attached image, e.g. `/uploads/…`.
  pub image_url:  Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The writable fields of a content item. The category is fixed by the
/// route, never by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDraft {
  pub title:     String,
  pub content:   String,
  pub image_url: Option<String>,
}

// ─── Gallery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
  pub id:         i64,
  pub image_url:  String,
  pub caption:    String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryDraft {
  pub caption:   String,
  pub image_url: String,
}

// ─── Hero slider ─────────────────────────────────────────────────────────────

/// An image on the home-page slider. Seeded by the admin tool; the web app
/// only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSlide {
  pub id:         i64,
  pub image_url:  String,
  pub created_at: DateTime<Utc>,
}

// ─── Image association ───────────────────────────────────────────────────────

/// Pick the image to store for a create or edit.
///
/// A freshly uploaded image always wins; without one the previously stored
/// reference is kept (`None` on create).
pub fn resolve_image(uploaded: Option<String>, previous: Option<String>) -> Option<String> {
  uploaded.or(previous)
}
