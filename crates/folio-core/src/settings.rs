//! Site settings: a flat key → value map, last write wins per key.

use std::collections::BTreeMap;

use serde::Serialize;

/// Author name used in SEO text when `site_author` is not set.
pub const DEFAULT_AUTHOR: &str = "Hudan Hidayat";

/// All settings, as loaded on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteSettings(BTreeMap<String, String>);

impl SiteSettings {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }

  /// The value for `key`, or an empty string. Convenient in templates.
  pub fn value(&self, key: &str) -> &str { self.get(key).unwrap_or_default() }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn author(&self) -> &str {
    self
      .get("site_author")
      .filter(|a| !a.trim().is_empty())
      .unwrap_or(DEFAULT_AUTHOR)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl FromIterator<(String, String)> for SiteSettings {
  fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}
