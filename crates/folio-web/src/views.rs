//! Askama templates and the view models they render.
//!
//! Public pages extend `base.html` and carry the [`PageContext`] built by
//! the analytics middleware. Admin pages extend `admin/base.html`.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use folio_core::{
  analytics::{LocationCount, PathCount},
  content::{ContentItem, GalleryEntry, HeroSlide},
  settings::DEFAULT_AUTHOR,
};

use crate::{analytics::PageContext, error::Result, seo::Seo};

/// Render `template` as an HTML response.
pub fn render(template: &impl Template) -> Result<Response> {
  Ok(Html(template.render()?).into_response())
}

pub fn format_date(dt: &DateTime<Utc>) -> String { dt.format("%d %b %Y").to_string() }

impl PageContext {
  pub fn site_title(&self) -> &str {
    self
      .settings
      .get("site_title")
      .filter(|t| !t.trim().is_empty())
      .unwrap_or(DEFAULT_AUTHOR)
  }
}

// ─── Public pages ────────────────────────────────────────────────────────────

/// An item as shown in listings, whether text or photo.
#[derive(Debug, Clone)]
pub struct Card {
  pub id:        i64,
  pub title:     String,
  pub excerpt:   String,
  pub image_url: Option<String>,
  pub date:      String,
}

impl Card {
  pub fn from_item(item: &ContentItem) -> Self {
    Card {
      id:        item.id,
      title:     item.title.clone(),
      excerpt:   crate::seo::truncate_chars(&crate::seo::strip_tags(&item.content), 200).to_owned(),
      image_url: item.image_url.clone(),
      date:      format_date(&item.created_at),
    }
  }

  pub fn from_photo(entry: &GalleryEntry) -> Self {
    Card {
      id:        entry.id,
      title:     entry.caption.clone(),
      excerpt:   String::new(),
      image_url: Some(entry.image_url.clone()),
      date:      format_date(&entry.created_at),
    }
  }
}

/// A home-page block of the latest items of one category.
#[derive(Debug, Clone)]
pub struct Shelf {
  pub slug:  &'static str,
  pub title: &'static str,
  pub cards: Vec<Card>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomePage {
  pub page:      PageContext,
  pub seo:       Seo,
  pub biography: Option<Card>,
  pub slides:    Vec<HeroSlide>,
  pub shelves:   Vec<Shelf>,
  pub books:     Vec<Card>,
  pub gallery:   Vec<Card>,
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryPage {
  pub page:  PageContext,
  pub seo:   Seo,
  pub slug:  &'static str,
  pub title: &'static str,
  pub cards: Vec<Card>,
}

#[derive(Template)]
#[template(path = "single.html")]
pub struct SinglePage {
  pub page:           PageContext,
  pub seo:            Seo,
  pub slug:           &'static str,
  pub category_title: &'static str,
  pub title:          String,
  /// Trusted HTML authored in the admin editor.
  pub body:           String,
  pub image_url:      Option<String>,
  pub date:           String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
  pub error: Option<&'static str>,
}

// ─── Admin pages ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SectionCount {
  pub slug:  &'static str,
  pub title: &'static str,
  pub count: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
  pub counts:       Vec<SectionCount>,
  pub total_views:  i64,
  pub today_views:  i64,
  pub top_paths:    Vec<PathCount>,
  pub locations:    Vec<LocationCount>,
  /// JSON array of day labels for the chart script.
  pub chart_labels: String,
  /// JSON array of view counts, parallel to `chart_labels`.
  pub chart_values: String,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardPage {
  pub title: String,
  pub stats: Option<DashboardStats>,
}

#[derive(Debug, Clone)]
pub struct ListRow {
  pub id:    i64,
  pub title: String,
  pub date:  String,
}

#[derive(Template)]
#[template(path = "admin/list.html")]
pub struct ListPage {
  pub title:       String,
  pub base_path:   String,
  pub create_link: String,
  pub rows:        Vec<ListRow>,
}

/// Current values of the publishing form.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
  pub title:     String,
  pub content:   String,
  pub image_url: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/edit.html")]
pub struct EditPage {
  pub title:        String,
  pub action:       String,
  pub back_link:    String,
  /// Whether the form has a rich-text body (the gallery has none).
  pub rich_content: bool,
  pub values:       FormValues,
  pub error:        Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct UserRow {
  pub id:       i64,
  pub username: String,
  pub created:  String,
}

#[derive(Template)]
#[template(path = "admin/users_list.html")]
pub struct UsersListPage {
  pub title: String,
  pub users: Vec<UserRow>,
}

#[derive(Template)]
#[template(path = "admin/users_create.html")]
pub struct UserCreatePage {
  pub title: String,
  pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "admin/password.html")]
pub struct PasswordPage {
  pub title:   String,
  pub error:   Option<&'static str>,
  pub success: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct SettingField {
  pub key:       &'static str,
  pub label:     &'static str,
  pub value:     String,
  pub multiline: bool,
}

#[derive(Template)]
#[template(path = "admin/settings.html")]
pub struct SettingsPage {
  pub title:   String,
  pub success: bool,
  pub fields:  Vec<SettingField>,
}
