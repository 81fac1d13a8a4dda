//! Page-view events and the read models aggregated from them.
//!
//! Page views are strictly append-only: the site inserts one row per
//! qualifying request and never updates or deletes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// City recorded when an address cannot be geo-resolved.
pub const UNKNOWN_CITY: &str = "Unknown";

/// A page view about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPageView {
  pub path:       String,
  pub ip_address: String,
  pub user_agent: Option<String>,
  /// ISO 3166 country code, `None` when unresolved.
  pub country:    Option<String>,
  pub city:       String,
}

/// One entry of the "recently viewed" ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentView {
  pub city: String,
  pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
  pub path:  String,
  pub views: i64,
}

/// Views on one calendar day (UTC). Days without views are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
  pub date:  NaiveDate,
  pub count: i64,
}

/// Views grouped by `"City, CC"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
  pub location: String,
  pub count:    i64,
}
