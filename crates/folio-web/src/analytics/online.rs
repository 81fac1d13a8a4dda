//! Who is on the site right now.

use std::{
  collections::HashMap,
  net::IpAddr,
  sync::{Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

/// Visitors idle for longer than this are no longer counted.
pub const IDLE_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Last-seen instant per client address, kept for the life of the process.
///
/// Every call sweeps out visitors idle past the window, so the map never
/// grows beyond the addresses seen within one window.
#[derive(Debug)]
pub struct OnlineRegistry {
  idle: Duration,
  seen: Mutex<HashMap<IpAddr, Instant>>,
}

impl Default for OnlineRegistry {
  fn default() -> Self { Self::new() }
}

impl OnlineRegistry {
  pub fn new() -> Self { Self::with_idle_window(IDLE_WINDOW) }

  pub fn with_idle_window(idle: Duration) -> Self {
    Self {
      idle,
      seen: Mutex::new(HashMap::new()),
    }
  }

  /// Record a request from `ip`.
  pub fn touch(&self, ip: IpAddr) { self.touch_at(ip, Instant::now()) }

  /// Number of distinct addresses seen within the idle window.
  pub fn active_count(&self) -> usize { self.active_count_at(Instant::now()) }

  fn touch_at(&self, ip: IpAddr, now: Instant) {
    let mut seen = self.lock();
    seen.insert(ip, now);
    sweep(&mut seen, now, self.idle);
  }

  fn active_count_at(&self, now: Instant) -> usize {
    let mut seen = self.lock();
    sweep(&mut seen, now, self.idle);
    seen.len()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, Instant>> {
    self.seen.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn sweep(seen: &mut HashMap<IpAddr, Instant>, now: Instant, idle: Duration) {
  seen.retain(|_, last| now.saturating_duration_since(*last) <= idle);
}
