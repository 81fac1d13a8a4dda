//! Per-request analytics: online visitors, the view ticker, page-view
//! logging and settings hydration.
//!
//! [`collect`] runs in front of every page. It never fails the request:
//! each store read is bounded by the configured timeout and falls back to
//! an empty default, and the page-view insert runs detached from the
//! response.

pub mod filter;
pub mod geo;
pub mod online;

use std::{
  fmt::Display,
  future::Future,
  net::{IpAddr, Ipv4Addr, SocketAddr},
  sync::Arc,
  time::Duration,
};

use axum::{
  extract::{ConnectInfo, Request, State},
  http::header,
  middleware::Next,
  response::Response,
};
use chrono::{DateTime, Utc};
use folio_core::{
  analytics::{NewPageView, RecentView},
  settings::SiteSettings,
  store::SiteStore,
};

use crate::AppState;

/// Entries shown in the "recently viewed" ticker.
pub const RECENT_VIEWS: usize = 10;

/// What every rendered page knows about the site and its traffic.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
  pub settings:     SiteSettings,
  pub online_count: usize,
  pub today_views:  i64,
  pub recent_views: Vec<RecentView>,
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
  now
    .date_naive()
    .and_hms_opt(0, 0, 0)
    .map(|dt| dt.and_utc())
    .unwrap_or(now)
}

/// The address the request came from, or the unspecified address when the
/// server was not started with connect info.
pub fn client_ip(req: &Request) -> IpAddr {
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip())
    .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Await a store read, giving up after `limit`. Errors and timeouts are
/// logged and replaced with the default value.
async fn bounded<T, E>(limit: Duration, what: &'static str, fut: impl Future<Output = Result<T, E>>) -> T
where
  T: Default,
  E: Display,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(Ok(value)) => value,
    Ok(Err(e)) => {
      tracing::warn!(error = %e, "failed to load {what}");
      T::default()
    }
    Err(_) => {
      tracing::warn!(timeout_ms = limit.as_millis() as u64, "timed out loading {what}");
      T::default()
    }
  }
}

/// Analytics middleware.
pub async fn collect<S>(State(state): State<AppState<S>>, mut req: Request, next: Next) -> Response
where
  S: SiteStore + Clone + 'static,
{
  let ip = client_ip(&req);
  state.online.touch(ip);

  let limit = state.query_timeout();
  let since = start_of_day(Utc::now());
  let (today_views, recent_views, settings) = tokio::join!(
    bounded(limit, "today's views", state.store.count_views_since(since)),
    bounded(limit, "recent views", state.store.recent_views(RECENT_VIEWS)),
    bounded(limit, "site settings", state.store.load_settings()),
  );

  let user_agent = req
    .headers()
    .get(header::USER_AGENT)
    .and_then(|v| v.to_str().ok());
  let path = req.uri().path();

  if filter::should_log(req.method(), path, user_agent, ip) {
    let location = state.geo.lookup(ip);
    let view = NewPageView {
      path:       path.to_owned(),
      ip_address: ip.to_string(),
      user_agent: user_agent.map(str::to_owned),
      country:    location.country,
      city:       location.city,
    };
    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
      if let Err(e) = store.record_page_view(view).await {
        tracing::error!(error = %e, "failed to record page view");
      }
    });
  }

  req.extensions_mut().insert(PageContext {
    settings,
    online_count: state.online.active_count(),
    today_views,
    recent_views,
  });

  next.run(req).await
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn start_of_day_is_utc_midnight() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 17, 45, 12).unwrap();
    assert_eq!(start_of_day(now), Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
  }

  #[tokio::test]
  async fn bounded_read_falls_back_on_error() {
    let v: i64 = bounded(Duration::from_secs(1), "test", async { Err::<i64, _>("boom") }).await;
    assert_eq!(v, 0);
  }

  #[tokio::test]
  async fn bounded_read_falls_back_on_timeout() {
    let slow = async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok::<_, String>(vec![1, 2, 3])
    };
    let v: Vec<i32> = bounded(Duration::from_millis(10), "test", slow).await;
    assert!(v.is_empty());
  }
}
