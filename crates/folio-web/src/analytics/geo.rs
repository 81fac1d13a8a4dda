//! Offline IP geolocation against a MaxMind City database.

use std::{net::IpAddr, path::Path};

use folio_core::analytics::UNKNOWN_CITY;
use maxminddb::{Reader, geoip2};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
  /// ISO 3166 country code.
  pub country: Option<String>,
  pub city:    String,
}

impl GeoLocation {
  pub fn unknown() -> Self {
    Self {
      country: None,
      city:    UNKNOWN_CITY.to_string(),
    }
  }
}

/// Resolves addresses to a country and city. Without a database every
/// lookup is unknown.
pub struct GeoResolver {
  reader: Option<Reader<Vec<u8>>>,
}

impl std::fmt::Debug for GeoResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeoResolver")
      .field("loaded", &self.reader.is_some())
      .finish()
  }
}

impl GeoResolver {
  pub fn disabled() -> Self { Self { reader: None } }

  pub fn open(path: &Path) -> Result<Self, maxminddb::MaxMindDbError> {
    Ok(Self {
      reader: Some(Reader::open_readfile(path)?),
    })
  }

  pub fn lookup(&self, ip: IpAddr) -> GeoLocation {
    let Some(reader) = &self.reader else {
      return GeoLocation::unknown();
    };

    let record = match reader.lookup::<geoip2::City>(ip) {
      Ok(Some(record)) => record,
      Ok(None) => return GeoLocation::unknown(),
      Err(e) => {
        tracing::debug!(%ip, error = %e, "geo lookup failed");
        return GeoLocation::unknown();
      }
    };

    let country = record
      .country
      .and_then(|c| c.iso_code)
      .map(str::to_owned);
    let city = record
      .city
      .and_then(|c| c.names)
      .and_then(|names| names.get("en").map(|n| (*n).to_owned()))
      .unwrap_or_else(|| UNKNOWN_CITY.to_string());

    GeoLocation { country, city }
  }
}
