//! State tier classification for the choropleth map.
//!
//! States are ranked by their visit sums under the active filter and
//! split at the 0.33 / 0.66 quantiles: the top third are Hotspots, the
//! bottom third Off-Season, the middle Normal. States missing from the
//! selection default to Normal so the map is always fully painted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{StateTier, VisitRecord};
use crate::states;

/// Number of parks listed in a state's hover payload.
const HOVER_PARK_LIMIT: usize = 5;

/// One map row, covering every registry state.
#[derive(Debug, Clone, Serialize)]
pub struct StateTierRow {
    pub state: &'static str,
    pub state_name: &'static str,
    pub tier: StateTier,
    /// Busiest parks of the state under the filter, best first.
    pub top_parks: Vec<String>,
}

/// Linear-interpolation quantile over an ascending slice, matching the
/// default dataframe definition the dashboards were built against.
pub fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = (n as f64 - 1.0) * q.clamp(0.0, 1.0);
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Tier of every state present in `rows`. Empty input yields an empty
/// map; the caller backfills Normal through [`map_rows`].
pub fn classify_state_tiers(rows: &[&VisitRecord]) -> BTreeMap<String, StateTier> {
    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for record in rows {
        *sums.entry(record.state.clone()).or_default() += record.recreation_visits;
    }
    if sums.is_empty() {
        return BTreeMap::new();
    }

    let mut values: Vec<f64> = sums.values().map(|v| *v as f64).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let q_off = quantile_linear(&values, 0.33);
    let q_hot = quantile_linear(&values, 0.66);

    sums.into_iter()
        .map(|(state, visits)| {
            let v = visits as f64;
            let tier = if v >= q_hot {
                StateTier::Hotspot
            } else if v <= q_off {
                StateTier::OffSeason
            } else {
                StateTier::Normal
            };
            (state, tier)
        })
        .collect()
}

/// Busiest parks per state under the filter, for map hovers.
pub fn top_parks_by_state(
    rows: &[&VisitRecord],
    limit: usize,
) -> BTreeMap<String, Vec<String>> {
    let mut sums: BTreeMap<(String, String), i64> = BTreeMap::new();
    for record in rows {
        *sums
            .entry((record.state.clone(), record.park.clone()))
            .or_default() += record.recreation_visits;
    }

    let mut per_state: BTreeMap<String, Vec<(String, i64)>> = BTreeMap::new();
    for ((state, park), visits) in sums {
        per_state.entry(state).or_default().push((park, visits));
    }

    per_state
        .into_iter()
        .map(|(state, mut parks)| {
            parks.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let names = parks.into_iter().take(limit).map(|(park, _)| park).collect();
            (state, names)
        })
        .collect()
}

/// The full map payload: one row per registry state, Normal where the
/// selection has no data.
pub fn map_rows(rows: &[&VisitRecord]) -> Vec<StateTierRow> {
    let tiers = classify_state_tiers(rows);
    let mut hover = top_parks_by_state(rows, HOVER_PARK_LIMIT);

    states::STATES
        .iter()
        .map(|&(code, name)| StateTierRow {
            state: code,
            state_name: name,
            tier: tiers.get(code).copied().unwrap_or(StateTier::Normal),
            top_parks: hover.remove(code).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::dataset::tests::record;

    fn by_state(pairs: &[(&str, i64)]) -> Vec<VisitRecord> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (state, visits))| {
                record(
                    &format!("Park {}", i),
                    &format!("U{}", i),
                    "National Park",
                    state,
                    2023,
                    7,
                    *visits,
                )
            })
            .collect()
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let values = [10.0, 20.0, 30.0];
        assert_eq!(quantile_linear(&values, 0.0), 10.0);
        assert_eq!(quantile_linear(&values, 0.5), 20.0);
        assert_eq!(quantile_linear(&values, 1.0), 30.0);
        // 0.33 lands between the first two values.
        let q = quantile_linear(&values, 0.33);
        assert!(q > 10.0 && q < 20.0);
        assert!(quantile_linear(&[], 0.5) == 0.0);
        assert_eq!(quantile_linear(&[42.0], 0.9), 42.0);
    }

    #[test]
    fn thirds_split_into_three_tiers() {
        let records = by_state(&[("ME", 100), ("UT", 500), ("WY", 1000)]);
        let rows: Vec<&VisitRecord> = records.iter().collect();
        let tiers = classify_state_tiers(&rows);
        assert_eq!(tiers["ME"], StateTier::OffSeason);
        assert_eq!(tiers["UT"], StateTier::Normal);
        assert_eq!(tiers["WY"], StateTier::Hotspot);
    }

    #[test]
    fn equal_volumes_are_all_hotspots() {
        // Degenerate quantiles collapse to the shared value; the >= test
        // then marks every state a Hotspot.
        let records = by_state(&[("ME", 100), ("UT", 100), ("WY", 100)]);
        let rows: Vec<&VisitRecord> = records.iter().collect();
        let tiers = classify_state_tiers(&rows);
        assert!(tiers.values().all(|t| *t == StateTier::Hotspot));
    }

    #[test]
    fn map_rows_cover_every_state_with_normal_default() {
        let records = by_state(&[("ME", 100), ("UT", 500), ("WY", 1000)]);
        let rows: Vec<&VisitRecord> = records.iter().collect();
        let map = map_rows(&rows);
        assert_eq!(map.len(), states::STATES.len());

        let illinois = map.iter().find(|r| r.state == "IL").unwrap();
        assert_eq!(illinois.tier, StateTier::Normal);
        assert!(illinois.top_parks.is_empty());
    }

    #[test]
    fn empty_selection_paints_everything_normal() {
        let map = map_rows(&[]);
        assert!(map.iter().all(|r| r.tier == StateTier::Normal));
    }

    #[test]
    fn hover_parks_are_ranked_and_capped() {
        let records = vec![
            record("Small", "A", "T", "UT", 2023, 7, 10),
            record("Big", "B", "T", "UT", 2023, 7, 900),
            record("Mid", "C", "T", "UT", 2023, 7, 500),
        ];
        let rows: Vec<&VisitRecord> = records.iter().collect();
        let hover = top_parks_by_state(&rows, 2);
        assert_eq!(hover["UT"], vec!["Big".to_string(), "Mid".to_string()]);
    }

    #[test]
    fn tier_sums_reconcile_with_raw_totals() {
        let records = by_state(&[("ME", 100), ("ME", 50), ("UT", 500)]);
        let rows: Vec<&VisitRecord> = records.iter().collect();
        let raw_total: i64 = rows.iter().map(|r| r.recreation_visits).sum();

        let mut sums: std::collections::BTreeMap<&str, i64> = Default::default();
        for r in &rows {
            *sums.entry(r.state.as_str()).or_default() += r.recreation_visits;
        }
        assert_eq!(sums.values().sum::<i64>(), raw_total);
    }
}
