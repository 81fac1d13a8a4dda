//! The admin dashboard: content counts and traffic statistics.

use axum::{extract::State, response::Response};
use chrono::{Duration, Utc};
use folio_core::{category::Section, store::SiteStore};

use crate::{
  AppState,
  analytics::start_of_day,
  auth::AdminSession,
  error::{Error, Result},
  views::{DashboardPage, DashboardStats, SectionCount, render},
};

const TOP_PATHS: usize = 5;
const TOP_LOCATIONS: usize = 5;
const CHART_DAYS: i64 = 7;

pub async fn show<S>(State(state): State<AppState<S>>, _admin: AdminSession) -> Result<Response>
where
  S: SiteStore + Clone + 'static,
{
  let stats = match gather(&state).await {
    Ok(stats) => Some(stats),
    Err(e) => {
      tracing::warn!(error = %e, "dashboard statistics unavailable");
      None
    }
  };

  render(&DashboardPage {
    title: "Dashboard".to_string(),
    stats,
  })
}

/// Every dashboard query. Any failure discards the whole set.
async fn gather<S>(state: &AppState<S>) -> Result<DashboardStats>
where
  S: SiteStore + Clone + 'static,
{
  let store = &state.store;

  let mut counts = Vec::new();
  for section in Section::all().filter(|s| !s.descriptor().singleton) {
    let count = match section {
      Section::Gallery => store.count_gallery().await.map_err(Error::store)?,
      Section::Content(category) => store.count_content(category).await.map_err(Error::store)?,
    };
    counts.push(SectionCount {
      slug: section.slug(),
      title: section.title(),
      count,
    });
  }

  let today = start_of_day(Utc::now());
  let total_views = store.count_views().await.map_err(Error::store)?;
  let today_views = store.count_views_since(today).await.map_err(Error::store)?;
  let top_paths = store.top_paths(TOP_PATHS).await.map_err(Error::store)?;
  let locations = store.top_locations(TOP_LOCATIONS).await.map_err(Error::store)?;
  let series = store
    .daily_views(today - Duration::days(CHART_DAYS))
    .await
    .map_err(Error::store)?;

  let labels: Vec<String> = series.iter().map(|d| d.date.format("%-d/%-m/%Y").to_string()).collect();
  let values: Vec<i64> = series.iter().map(|d| d.count).collect();

  Ok(DashboardStats {
    counts,
    total_views,
    today_views,
    top_paths,
    locations,
    chart_labels: serde_json::to_string(&labels)?,
    chart_values: serde_json::to_string(&values)?,
  })
}
