use serde::Deserialize;
use std::env;
use std::fs;

use crate::model::{ConfigError, StorageError};

/// Application settings loaded from `config.json`.
///
/// Database credentials deliberately live in the environment (`.env`),
/// not here, so the config file can be committed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,
    #[serde(default = "default_cleaned_file")]
    pub cleaned_file: String,
    /// Optional model output appended to the dataset at serve time.
    #[serde(default = "default_forecast_file")]
    pub forecast_file: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Month preselected by the dashboard filters.
    #[serde(default = "default_month")]
    pub default_month: u32,
    #[serde(default = "default_top_parks")]
    pub top_parks_limit: usize,
}

fn default_raw_dir() -> String {
    "data/raw".into()
}

fn default_cleaned_file() -> String {
    "data/cleaned/all_parks_recreation_visits.csv".into()
}

fn default_forecast_file() -> String {
    "data/cleaned/monthly_forecasts.csv".into()
}

fn default_bind_addr() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8050
}

fn default_month() -> u32 {
    7
}

fn default_top_parks() -> usize {
    5
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    Ok(config)
}

/// Postgres connection settings, read from the environment after
/// `dotenv` has run. PG_HOST and PG_PORT have local-dev defaults; the
/// rest are required.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, StorageError> {
        let user = env::var("PG_USER").map_err(|_| StorageError::MissingEnv("PG_USER"))?;
        let password =
            env::var("PG_PASSWORD").map_err(|_| StorageError::MissingEnv("PG_PASSWORD"))?;
        let dbname = env::var("PG_DB").map_err(|_| StorageError::MissingEnv("PG_DB"))?;
        let host = env::var("PG_HOST").unwrap_or_else(|_| "localhost".into());
        let port = env::var("PG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432);

        Ok(Self {
            user,
            password,
            host,
            port,
            dbname,
        })
    }

    /// Connection string for `postgres::Client::connect`.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.user, self.password, self.dbname
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.raw_dir, "data/raw");
        assert_eq!(cfg.port, 8050);
        assert_eq!(cfg.default_month, 7);
        assert_eq!(cfg.top_parks_limit, 5);
    }

    #[test]
    fn explicit_values_win() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"port": 9000, "raw_dir": "elsewhere"}"#).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.raw_dir, "elsewhere");
    }
}
