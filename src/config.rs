//! Runtime configuration read from the environment (and a `.env` file if present).
//!
//! | Variable | Default |
//! |---|---|
//! | `WMS_DB_PATH` | `wms_store` (opened as `wms_store.lmdb`) |
//! | `WMS_MAP_SIZE` | 10 MiB |
//! | `WMS_SESSION_TTL_HOURS` | 24 (1 to 8760) |
//!
//! Values that do not parse, or fall outside their range, are logged and
//! replaced by the default.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::Duration;
use log::warn;

use crate::auth::{DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS};
use crate::lmdb_medium::DEFAULT_MAP_SIZE;

pub const DB_PATH_VAR: &str = "WMS_DB_PATH";
pub const MAP_SIZE_VAR: &str = "WMS_MAP_SIZE";
pub const SESSION_TTL_VAR: &str = "WMS_SESSION_TTL_HOURS";

pub const DEFAULT_DB_PATH: &str = "wms_store";

/// Smallest LMDB map accepted from configuration.
pub const MIN_MAP_SIZE: usize = 64 * 1024;

const SESSION_TTL_RANGE: RangeInclusive<i64> = 1..=MAX_SESSION_TTL_HOURS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: String,
    pub map_size: usize,
    pub session_ttl_hours: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            map_size: DEFAULT_MAP_SIZE,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    /// Builds a config from any variable source. Unparseable or out-of-range numbers keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            db_path: lookup(DB_PATH_VAR)
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.db_path),
            map_size: parse_or(&lookup, MAP_SIZE_VAR, defaults.map_size, MIN_MAP_SIZE..=usize::MAX),
            session_ttl_hours: parse_or(
                &lookup,
                SESSION_TTL_VAR,
                defaults.session_ttl_hours,
                SESSION_TTL_RANGE,
            ),
        }
    }

    /// The session lifetime, clamped to 1 to 8760 hours.
    pub fn session_ttl(&self) -> Duration {
        let hours = self
            .session_ttl_hours
            .clamp(*SESSION_TTL_RANGE.start(), *SESSION_TTL_RANGE.end());
        Duration::hours(hours)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T, valid: RangeInclusive<T>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Copy + Display,
{
    let raw = match lookup(name) {
        Some(raw) => raw,
        None => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(value) if valid.contains(&value) => value,
        Ok(_) => {
            warn!(
                "Ignoring out-of-range {}='{}' (allowed {}..={}); using {}",
                name,
                raw,
                valid.start(),
                valid.end(),
                default
            );
            default
        }
        Err(_) => {
            warn!("Ignoring invalid {}='{}'; using {}", name, raw, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(StoreConfig::from_lookup(lookup_from(&[])), StoreConfig::default());
    }

    #[test]
    fn values_are_read() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/wms"),
            (MAP_SIZE_VAR, "2097152"),
            (SESSION_TTL_VAR, "8"),
        ]));
        assert_eq!(config.db_path, "/tmp/wms");
        assert_eq!(config.map_size, 2097152);
        assert_eq!(config.session_ttl(), Duration::hours(8));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (MAP_SIZE_VAR, "big"),
            (SESSION_TTL_VAR, "-"),
            (DB_PATH_VAR, "  "),
        ]));
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn out_of_range_ttl_falls_back() {
        for ttl in ["10000000000", "-5", "0", "8761"] {
            let config = StoreConfig::from_lookup(lookup_from(&[(SESSION_TTL_VAR, ttl)]));
            assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS, "{ttl}");
        }

        let config = StoreConfig::from_lookup(lookup_from(&[(SESSION_TTL_VAR, "8760")]));
        assert_eq!(config.session_ttl(), Duration::hours(8760));
    }

    #[test]
    fn tiny_map_size_falls_back() {
        let config = StoreConfig::from_lookup(lookup_from(&[(MAP_SIZE_VAR, "0")]));
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
    }

    #[test]
    fn hand_built_ttl_is_clamped() {
        let config = StoreConfig {
            session_ttl_hours: -4,
            ..StoreConfig::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(1));

        let config = StoreConfig {
            session_ttl_hours: i64::MAX,
            ..StoreConfig::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(MAX_SESSION_TTL_HOURS));
    }
}
