// Core structs: VisitRecord, tier/season enums and error types.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One month of recreation visits for a single park unit.
///
/// The serde renames match the canonical column headers of the cleaned
/// CSV, so the same struct round-trips through `csv` readers and writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    #[serde(rename = "Park")]
    pub park: String,
    #[serde(rename = "Unit Code")]
    pub unit_code: String,
    #[serde(rename = "Park Type")]
    pub park_type: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Recreation Visits")]
    pub recreation_visits: i64,
    /// Set for rows appended from the forecast file; never written to
    /// the cleaned CSV or the database.
    #[serde(skip_serializing, default)]
    pub is_forecast: bool,
}

impl VisitRecord {
    /// Identity of a record within the dataset. The database enforces the
    /// same key with a unique index.
    pub fn key(&self) -> (String, i32, u32) {
        (self.unit_code.clone(), self.year, self.month)
    }
}

/// Visit-volume tier of a state under the active filter, split at the
/// 0.33 / 0.66 quantiles of per-state visit sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateTier {
    Hotspot,
    Normal,
    #[serde(rename = "Off-Season")]
    OffSeason,
}

/// Meteorological season used for the region heatmap and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn of_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Display order of season columns in the heatmap payload.
pub const SEASON_ORDER: [Season; 4] =
    [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file}: missing required columns {missing:?}")]
    MissingColumns { file: String, missing: Vec<String> },
    #[error("no usable CSV files under {0}")]
    NoUsableFiles(String),
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}
