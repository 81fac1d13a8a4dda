//! Which requests count as a page view.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use axum::http::Method;

/// Path fragments requested by vulnerability scanners. Matched
/// case-insensitively anywhere in the path.
pub const BLOCKED_PATH_TOKENS: &[&str] = &[
  "wp-admin",
  "wp-login",
  "wp-content",
  "wp-includes",
  "xmlrpc",
  "phpmyadmin",
  ".env",
  ".git",
  "cgi-bin",
  "admin.php",
  "config",
  "setup",
  "install",
  "shell",
  "eval-stdin",
  "vendor/phpunit",
  "actuator",
  "debug",
  "console",
  "boaform",
  "hnap1",
];

/// User-agent fragments of crawlers, scripts and scanners.
pub const BOT_AGENT_TOKENS: &[&str] = &[
  "bot",
  "crawler",
  "spider",
  "slurp",
  "curl",
  "wget",
  "python",
  "go-http-client",
  "java/",
  "okhttp",
  "libwww",
  "httpclient",
  "scrapy",
  "headless",
  "phantomjs",
  "zgrab",
  "masscan",
  "nmap",
  "nikto",
  "sqlmap",
];

/// Whether a request should be persisted as a page view.
pub fn should_log(method: &Method, path: &str, user_agent: Option<&str>, ip: IpAddr) -> bool {
  *method == Method::GET
    && is_page_path(path)
    && !is_scanner_path(path)
    && !is_bot(user_agent)
    && !is_local(ip)
}

/// Public pages only: no admin or auth routes and nothing that looks like
/// a file.
fn is_page_path(path: &str) -> bool {
  !path.starts_with("/admin")
    && !path.starts_with("/auth")
    && !path.contains('.')
    && path != "/favicon.ico"
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  let haystack = haystack.to_ascii_lowercase();
  needles.iter().any(|n| haystack.contains(n))
}

pub fn is_scanner_path(path: &str) -> bool { contains_any(path, BLOCKED_PATH_TOKENS) }

/// A missing user agent is treated as a bot.
pub fn is_bot(user_agent: Option<&str>) -> bool {
  match user_agent {
    Some(ua) => contains_any(ua, BOT_AGENT_TOKENS),
    None => true,
  }
}

/// Loopback, private, link-local, unspecified and unique-local addresses.
pub fn is_local(ip: IpAddr) -> bool {
  match ip {
    IpAddr::V4(v4) => is_local_v4(v4),
    IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
      Some(v4) => is_local_v4(v4),
      None => is_local_v6(v6),
    },
  }
}

fn is_local_v4(ip: Ipv4Addr) -> bool {
  ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_local_v6(ip: Ipv6Addr) -> bool {
  let first = ip.segments()[0];
  ip.is_loopback()
    || ip.is_unspecified()
    || (first & 0xfe00) == 0xfc00
    || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
  use super::*;

  const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

  fn public_ip() -> IpAddr { "203.0.113.5".parse().unwrap() }

  #[test]
  fn ordinary_page_view_is_logged() {
    assert!(should_log(&Method::GET, "/esai/3", Some(BROWSER), public_ip()));
    assert!(should_log(&Method::GET, "/", Some(BROWSER), public_ip()));
  }

  #[test]
  fn non_get_and_private_areas_are_skipped() {
    assert!(!should_log(&Method::POST, "/esai", Some(BROWSER), public_ip()));
    assert!(!should_log(&Method::GET, "/admin/esai", Some(BROWSER), public_ip()));
    assert!(!should_log(&Method::GET, "/auth/login", Some(BROWSER), public_ip()));
    assert!(!should_log(&Method::GET, "/favicon.ico", Some(BROWSER), public_ip()));
    assert!(!should_log(&Method::GET, "/static/site.css", Some(BROWSER), public_ip()));
  }

  #[test]
  fn scanner_paths_are_skipped() {
    for path in ["/wp-login", "/WP-ADMIN/setup", "/cgi-bin/x", "/vendor/phpunit/src", "/HNAP1"] {
      assert!(!should_log(&Method::GET, path, Some(BROWSER), public_ip()), "{path}");
    }
  }

  #[test]
  fn bots_are_skipped() {
    assert!(is_bot(None));
    assert!(is_bot(Some("Googlebot/2.1 (+http://www.google.com/bot.html)")));
    assert!(is_bot(Some("curl/8.5.0")));
    assert!(is_bot(Some("Python-urllib/3.12")));
    assert!(is_bot(Some("Mozilla/5.0 HeadlessChrome/120.0")));
    assert!(!is_bot(Some(BROWSER)));
  }

  #[test]
  fn local_addresses_are_skipped() {
    for ip in [
      "127.0.0.1",
      "10.1.2.3",
      "172.16.0.9",
      "192.168.1.20",
      "169.254.0.1",
      "0.0.0.0",
      "::1",
      "::",
      "fd12:3456::1",
      "fe80::1",
      "::ffff:192.168.0.1",
    ] {
      assert!(is_local(ip.parse().unwrap()), "{ip}");
    }
    assert!(!is_local(public_ip()));
    assert!(!is_local("2001:db8::1".parse().unwrap()));
  }
}
