use std::time::Duration;
use rocket::figment::providers::Env;
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};
use crate::service::PollSettings;

/// Upper bounds applied when settings are read, so configured durations
/// always stay within the date and timer ranges.
pub const TTL_CEILING_SECS: u64 = 10 * 365 * 24 * 3600;
pub const REQUEST_TIMEOUT_CEILING_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Service settings, read from the same figment as Rocket's own config.
///
/// Keys come from `Rocket.toml` or from `POLL_`-prefixed environment
/// variables (`POLL_DEFAULT_TTL_SECS=3600`); `DATABASE_URL` is read as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub default_ttl_secs: u64,
    pub max_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            default_ttl_secs: 7 * 24 * 3600,
            max_ttl_secs: 30 * 24 * 3600,
            request_timeout_secs: 10,
            cleanup_interval_secs: 60,
            store: StoreKind::Postgres,
            database_url: None,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    pub fn figment() -> Figment {
        rocket::Config::figment()
            .merge(Env::prefixed("POLL_").global())
            .merge(Env::raw().only(&["DATABASE_URL"]).global())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        figment.extract()
    }

    /// The maximum TTL is capped at [`TTL_CEILING_SECS`] and the default
    /// never exceeds the maximum.
    pub fn poll_settings(&self) -> PollSettings {
        let max_ttl_secs = self.max_ttl_secs.min(TTL_CEILING_SECS);
        PollSettings {
            base_url: self.base_url.clone(),
            default_ttl: Duration::from_secs(self.default_ttl_secs.min(max_ttl_secs)),
            max_ttl: Duration::from_secs(max_ttl_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.min(REQUEST_TIMEOUT_CEILING_SECS))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}
