//! Ranking views: top parks, per-year leaders, active park counts and
//! the spend index.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::VisitRecord;
use crate::states;

#[derive(Debug, Clone, Serialize)]
pub struct ParkVisits {
    pub park: String,
    pub visits: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub visits: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearTopPark {
    pub year: i32,
    pub park: String,
    pub visits: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub active_parks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendRow {
    pub state: String,
    pub state_name: String,
    /// Synthetic $80–$200 comfort index derived from visit volume.
    pub avg_spend: f64,
    pub visits: i64,
}

fn sums_by_park(rows: &[&VisitRecord]) -> BTreeMap<String, i64> {
    let mut sums = BTreeMap::new();
    for record in rows {
        *sums.entry(record.park.clone()).or_default() += record.recreation_visits;
    }
    sums
}

fn sums_by_year(rows: &[&VisitRecord]) -> BTreeMap<i32, i64> {
    let mut sums = BTreeMap::new();
    for record in rows {
        *sums.entry(record.year).or_default() += record.recreation_visits;
    }
    sums
}

/// Busiest parks under the filter, best first. Ties break on name so
/// the ordering is stable.
pub fn top_parks(rows: &[&VisitRecord], limit: usize) -> Vec<ParkVisits> {
    let mut parks: Vec<ParkVisits> = sums_by_park(rows)
        .into_iter()
        .map(|(park, visits)| ParkVisits { park, visits })
        .collect();
    parks.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.park.cmp(&b.park)));
    parks.truncate(limit);
    parks
}

/// Visit totals per year, ascending by year, optionally truncated so a
/// selected year ends the series.
pub fn yearly_trend(rows: &[&VisitRecord], cap_year: Option<i32>) -> Vec<YearValue> {
    sums_by_year(rows)
        .into_iter()
        .filter(|(year, _)| cap_year.is_none_or(|cap| *year <= cap))
        .map(|(year, visits)| YearValue { year, visits })
        .collect()
}

/// The single busiest park of each year.
pub fn top_park_per_year(rows: &[&VisitRecord]) -> Vec<YearTopPark> {
    let mut per_year: BTreeMap<i32, BTreeMap<String, i64>> = BTreeMap::new();
    for record in rows {
        *per_year
            .entry(record.year)
            .or_default()
            .entry(record.park.clone())
            .or_default() += record.recreation_visits;
    }

    per_year
        .into_iter()
        .filter_map(|(year, parks)| {
            parks
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|(park, visits)| YearTopPark { year, park, visits })
        })
        .collect()
}

/// Distinct reporting parks per year.
pub fn active_parks_per_year(rows: &[&VisitRecord], cap_year: Option<i32>) -> Vec<YearCount> {
    let mut per_year: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    for record in rows {
        per_year
            .entry(record.year)
            .or_default()
            .insert(record.park.as_str());
    }

    per_year
        .into_iter()
        .filter(|(year, _)| cap_year.is_none_or(|cap| *year <= cap))
        .map(|(year, parks)| YearCount {
            year,
            active_parks: parks.len(),
        })
        .collect()
}

/// Min-max normalizes state visit sums onto a $80–$200 band; an
/// all-zero selection maps to $0. Top ten states, highest first.
pub fn spend_index_by_state(rows: &[&VisitRecord], limit: usize) -> Vec<SpendRow> {
    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for record in rows {
        *sums.entry(record.state.clone()).or_default() += record.recreation_visits;
    }
    if sums.is_empty() {
        return Vec::new();
    }

    let min = *sums.values().min().unwrap_or(&0) as f64;
    let max = *sums.values().max().unwrap_or(&0) as f64;

    let mut states_out: Vec<SpendRow> = sums
        .into_iter()
        .map(|(state, visits)| {
            let avg_spend = if max > 0.0 {
                let norm = (visits as f64 - min) / (max - min + 1e-9);
                80.0 + norm * 120.0
            } else {
                0.0
            };
            let state_name = states::state_name(&state)
                .map(str::to_string)
                .unwrap_or_else(|| state.clone());
            SpendRow {
                state,
                state_name,
                avg_spend,
                visits,
            }
        })
        .collect();

    states_out.sort_by(|a, b| {
        b.avg_spend
            .total_cmp(&a.avg_spend)
            .then_with(|| a.state.cmp(&b.state))
    });
    states_out.truncate(limit);
    states_out
}
