use crate::cache::DEFAULT_TTL;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_URL_ENV: &str = "TRAFFIC_DATABASE_URL";
pub const DEFAULT_CSV: &str = "Traffic_Data_2024.csv";

/// Marker left in sample connection strings that were never filled in.
const PLACEHOLDER: &str = "your_password";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub csv_path: PathBuf,
    pub cache_ttl: Duration,
}

impl Config {
    /// Build a config; the connection string has no fallback value.
    pub fn new(database_url: Option<String>) -> Result<Self> {
        let database_url = database_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no database configured; pass --database or set {}",
                    DATABASE_URL_ENV
                ))
            })?;
        if database_url.contains(PLACEHOLDER) {
            return Err(Error::Config(
                "database connection string still contains the placeholder password".into(),
            ));
        }
        Ok(Self {
            database_url,
            csv_path: PathBuf::from(DEFAULT_CSV),
            cache_ttl: DEFAULT_TTL,
        })
    }

    pub fn with_csv(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.csv_path = p;
        }
        self
    }

    pub fn with_ttl_secs(mut self, secs: Option<u64>) -> Self {
        if let Some(s) = secs {
            self.cache_ttl = Duration::from_secs(s);
        }
        self
    }
}
