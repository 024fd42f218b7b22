//! The immutable serving dataset and the common filter every dashboard
//! view applies before aggregating.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{info, warn};

use crate::ingest::{forecast, VisitSource};
use crate::model::{IngestError, VisitRecord};
use crate::states;

/// Process-wide dataset, loaded once at server startup and shared
/// read-only between request handlers.
pub struct Dataset {
    records: Vec<VisitRecord>,
    years: Vec<i32>,
}

impl Dataset {
    pub fn new(mut records: Vec<VisitRecord>) -> Self {
        // Rows without a state or park name cannot feed any view.
        records.retain(|r| !r.state.is_empty() && !r.park.is_empty());
        for record in &mut records {
            if record.park_type.is_empty() {
                record.park_type = "Unknown".into();
            }
        }

        let years: Vec<i32> = records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self { records, years }
    }

    /// Load from the first available source, then append forecasts.
    /// Source order encodes preference: database first, CSV fallback.
    pub async fn load(
        sources: &[Box<dyn VisitSource>],
        forecast_file: &str,
    ) -> Result<Dataset, IngestError> {
        for source in sources {
            match source.load().await {
                Ok(mut records) => {
                    info!("Loaded {} records from {}", records.len(), source.describe());
                    forecast::append_forecasts(&mut records, forecast_file)?;
                    return Ok(Dataset::new(records));
                }
                Err(e) => {
                    warn!("{} unavailable: {}", source.describe(), e);
                }
            }
        }
        Err(IngestError::SourceUnavailable(
            "no dataset source available".into(),
        ))
    }

    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Distinct park types, ascending, for the filter dropdown.
    pub fn park_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.park_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Apply the common dashboard filter.
    pub fn filter(&self, query: &FilterQuery) -> Vec<&VisitRecord> {
        self.records.iter().filter(|r| query.matches(r)).collect()
    }
}

/// The five dashboard filters. `None` and the `"All"` sentinel both mean
/// "no restriction"; the sentinel comes straight from dropdown payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Touring region group name ("East Coast", "West", ...).
    pub region: Option<String>,
    /// "National Park" keeps national parks, "City" keeps the rest.
    pub destination: Option<String>,
    pub park_type: Option<String>,
}

impl FilterQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(format!("month must be between 1 and 12, got {}", month));
            }
        }
        Ok(())
    }

    /// Copy with the time axis cleared, for views spanning all periods.
    pub fn without_time(&self) -> FilterQuery {
        FilterQuery {
            month: None,
            year: None,
            ..self.clone()
        }
    }

    fn matches(&self, record: &VisitRecord) -> bool {
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        if let Some(month) = self.month {
            if record.month != month {
                return false;
            }
        }
        if let Some(region) = self.region.as_deref() {
            if region != "All" {
                let members = states::region_members(region);
                if !members.contains(&record.state.as_str()) {
                    return false;
                }
            }
        }
        match self.destination.as_deref() {
            Some("National Park") => {
                if !record.park_type.to_lowercase().contains("national park") {
                    return false;
                }
            }
            Some("City") => {
                if record.park_type.to_lowercase().contains("national park") {
                    return false;
                }
            }
            _ => {}
        }
        if let Some(park_type) = self.park_type.as_deref() {
            if park_type != "All" && record.park_type != park_type {
                return false;
            }
        }
        true
    }
}
