//! Application settings read from the Rocket figment.
//!
//! Values come from `Rocket.toml` and `ROCKET_`-prefixed environment
//! variables, e.g. `ROCKET_JWT_SECRET`.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::clock::{DEFAULT_TIMEZONE, parse_timezone};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt_secret: String,
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    #[serde(default = "default_ttl_days")]
    pub jwt_ttl_days: i64,
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_issuer() -> String {
    "ems-api".to_string()
}

fn default_audience() -> String {
    "ems-client".to_string()
}

fn default_ttl_days() -> i64 {
    7
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_string()
}

fn default_document_dir() -> String {
    "uploads/documents".to_string()
}

fn default_broadcast_capacity() -> usize {
    64
}

impl AppConfig {
    /// Zone used when a tenant's own setting is missing or unusable.
    pub fn fallback_timezone(&self) -> Tz {
        parse_timezone(&self.default_timezone).unwrap_or(DEFAULT_TIMEZONE)
    }
}
