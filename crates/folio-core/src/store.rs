//! The `SiteStore` trait: every query the site issues.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! Higher layers (`folio-web`, `folio-admin`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every write is a single statement touching a single entity, so no method
//! requires a multi-statement transaction.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  analytics::{DayCount, LocationCount, NewPageView, PathCount, RecentView},
  category::Category,
  content::{ContentDraft, ContentItem, GalleryDraft, GalleryEntry, HeroSlide},
  settings::SiteSettings,
  user::User,
};

/// Errors a backend may report, with enough shape for callers to tell a
/// uniqueness violation apart from an outage.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when a write was refused by a uniqueness constraint.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over the site's relational store.
///
/// All list methods return rows newest first. All methods return `Send`
/// futures so the trait can be used from axum handlers.
pub trait SiteStore: Send + Sync {
  type Error: StoreError;

  // ── Content items ─────────────────────────────────────────────────────

  /// Every item of `category`. Unbounded.
  fn list_content(
    &self,
    category: Category,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  /// The `limit` newest items of `category`.
  fn latest_content(
    &self,
    category: Category,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  /// Look up an item by id, scoped to `category`. An id belonging to another
  /// category yields `None`.
  fn get_content(
    &self,
    category: Category,
    id: i64,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  fn create_content(
    &self,
    category: Category,
    draft: ContentDraft,
  ) -> impl Future<Output = Result<ContentItem, Self::Error>> + Send + '_;

  /// Overwrite title, content and image of an item. Returns `false` if no
  /// item of `category` has that id.
  fn update_content(
    &self,
    category: Category,
    id: i64,
    draft: ContentDraft,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete an item scoped to `category`. Returns whether a row was removed;
  /// deleting a missing id is not an error.
  fn delete_content(
    &self,
    category: Category,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_content(
    &self,
    category: Category,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Biography ─────────────────────────────────────────────────────────

  /// Insert the biography unless one already exists. The existence check
  /// and the insert are a single statement. Returns `true` when a row was
  /// inserted.
  fn create_biography_if_absent(
    &self,
    draft: ContentDraft,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert the biography, or overwrite the existing one. A draft without
  /// an image keeps the stored image. Returns `true` when a row was
  /// inserted.
  fn save_biography(
    &self,
    draft: ContentDraft,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Gallery ───────────────────────────────────────────────────────────

  fn list_gallery(&self) -> impl Future<Output = Result<Vec<GalleryEntry>, Self::Error>> + Send + '_;

  fn latest_gallery(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<GalleryEntry>, Self::Error>> + Send + '_;

  fn get_gallery(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<GalleryEntry>, Self::Error>> + Send + '_;

  fn create_gallery(
    &self,
    draft: GalleryDraft,
  ) -> impl Future<Output = Result<GalleryEntry, Self::Error>> + Send + '_;

  fn update_gallery(
    &self,
    id: i64,
    draft: GalleryDraft,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn delete_gallery(&self, id: i64) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_gallery(&self) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Hero slider ───────────────────────────────────────────────────────

  /// All slides in insertion order.
  fn list_slides(&self) -> impl Future<Output = Result<Vec<HeroSlide>, Self::Error>> + Send + '_;

  fn add_slide(
    &self,
    image_url: String,
  ) -> impl Future<Output = Result<HeroSlide, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn load_settings(&self) -> impl Future<Output = Result<SiteSettings, Self::Error>> + Send + '_;

  /// Insert or overwrite a single setting.
  fn put_setting(
    &self,
    key: String,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Case-sensitive exact match on username.
  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn get_user(&self, id: i64) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Insert a user. A taken username fails with an error whose
  /// [`StoreError::is_conflict`] is `true`.
  fn create_user(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn set_password_hash(
    &self,
    user_id: i64,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Page views ────────────────────────────────────────────────────────

  /// Append a page view. `created_at` is assigned by the store.
  fn record_page_view(
    &self,
    view: NewPageView,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn count_views(&self) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn count_views_since(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn recent_views(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<RecentView>, Self::Error>> + Send + '_;

  /// Paths ordered by view count, highest first.
  fn top_paths(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PathCount>, Self::Error>> + Send + '_;

  /// Views per UTC day since `since`, oldest day first. Days without views
  /// are omitted.
  fn daily_views(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<DayCount>, Self::Error>> + Send + '_;

  /// Views per `"City, CC"`, highest first. Rows with an unknown or local
  /// city, or without a country, are left out.
  fn top_locations(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LocationCount>, Self::Error>> + Send + '_;
}
