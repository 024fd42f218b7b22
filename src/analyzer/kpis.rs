//! KPI cards and the storyline block.

use serde::Serialize;

use crate::analyzer::dataset::{Dataset, FilterQuery};
use crate::model::VisitRecord;
use crate::states;
use crate::utils::{fmt_compact, month_name};

/// Placeholder shown when a selection has no data to name a leader.
const NO_LEADER: &str = "—";

#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub month: u32,
    pub year: i32,
    pub top_park_month: String,
    /// Month total divided by the number of reporting parks.
    pub avg_per_park: f64,
    pub total_month: i64,
    pub peak_year: i32,
    pub yoy_pct: f64,
    pub yoy_positive: bool,
    pub top_park_year: String,
    pub total_year: i64,
    pub top_state_year: String,
}

fn park_leader(rows: &[&VisitRecord]) -> Option<(String, i64, usize)> {
    let mut sums: std::collections::BTreeMap<&str, i64> = Default::default();
    for record in rows {
        *sums.entry(record.park.as_str()).or_default() += record.recreation_visits;
    }
    if sums.is_empty() {
        return None;
    }
    let total: i64 = sums.values().sum();
    let count = sums.len();
    let leader = sums
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(park, _)| park.to_string())?;
    Some((leader, total, count))
}

/// Compute the KPI card set. The month/year of `query` fall back to the
/// dashboard defaults (July, latest year) when unset; the remaining
/// filters apply to every sub-view.
pub fn compute_kpis(dataset: &Dataset, query: &FilterQuery, default_month: u32) -> KpiSummary {
    let month = query.month.unwrap_or(default_month);
    let year = query
        .year
        .or_else(|| dataset.latest_year())
        .unwrap_or_default();

    let month_query = FilterQuery {
        month: Some(month),
        year: Some(year),
        ..query.clone()
    };
    let (top_park_month, total_month, avg_per_park) =
        match park_leader(&dataset.filter(&month_query)) {
            Some((leader, total, count)) => {
                (leader, total, total as f64 / count.max(1) as f64)
            }
            None => (NO_LEADER.to_string(), 0, 0.0),
        };

    // Peak year and YoY run over the full history of the current
    // region/destination/type selection.
    let all_rows = dataset.filter(&query.without_time());
    let mut yearly: std::collections::BTreeMap<i32, i64> = Default::default();
    for record in &all_rows {
        *yearly.entry(record.year).or_default() += record.recreation_visits;
    }

    let peak_year = yearly
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(y, _)| *y)
        .unwrap_or(year);

    let current = yearly.get(&year).copied();
    let previous = yearly.get(&(year - 1)).copied();
    let yoy_pct = match (current, previous) {
        (Some(curr), Some(prev)) if prev != 0 => {
            (curr - prev) as f64 / prev as f64 * 100.0
        }
        _ => 0.0,
    };

    let year_query = FilterQuery {
        month: None,
        year: Some(year),
        ..query.clone()
    };
    let year_rows = dataset.filter(&year_query);
    let (top_park_year, total_year) = match park_leader(&year_rows) {
        Some((leader, total, _)) => (leader, total),
        None => (NO_LEADER.to_string(), 0),
    };

    let mut state_sums: std::collections::BTreeMap<&str, i64> = Default::default();
    for record in &year_rows {
        *state_sums.entry(record.state.as_str()).or_default() += record.recreation_visits;
    }
    let top_state_year = state_sums
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(code, _)| {
            states::state_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string())
        })
        .unwrap_or_else(|| NO_LEADER.to_string());

    KpiSummary {
        month,
        year,
        top_park_month,
        avg_per_park,
        total_month,
        peak_year,
        yoy_pct,
        yoy_positive: yoy_pct >= 0.0,
        top_park_year,
        total_year,
        top_state_year,
    }
}

/// Three sentences summarizing the KPI set for the storyline block.
pub fn storyline(kpis: &KpiSummary) -> Vec<String> {
    vec![
        format!(
            "In {} {}, {} visitors are recorded under the current view.",
            month_name(kpis.month),
            kpis.year,
            fmt_compact(kpis.total_month as f64)
        ),
        format!(
            "Top park this month is {} and the yearly leader is {}.",
            kpis.top_park_month, kpis.top_park_year
        ),
        format!(
            "Visitor volume is {:+.1}% vs previous year, with peak year at {}.",
            kpis.yoy_pct, kpis.peak_year
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::dataset::tests::{record, sample_dataset};

    #[test]
    fn month_kpis_name_the_leader_and_reconcile_totals() {
        let ds = sample_dataset();
        let query = FilterQuery {
            month: Some(7),
            year: Some(2023),
            ..Default::default()
        };
        let kpis = compute_kpis(&ds, &query, 7);

        assert_eq!(kpis.top_park_month, "Zion NP");
        // July 2023: Acadia 600 + Zion 900 + Gateway Arch 300.
        assert_eq!(kpis.total_month, 1800);
        assert!((kpis.avg_per_park - 600.0).abs() < 1e-9);
    }

    #[test]
    fn yoy_compares_adjacent_years() {
        let ds = Dataset::new(vec![
            record("P", "P1", "T", "ME", 2022, 7, 1000),
            record("P", "P1", "T", "ME", 2023, 7, 1500),
        ]);
        let query = FilterQuery {
            month: Some(7),
            year: Some(2023),
            ..Default::default()
        };
        let kpis = compute_kpis(&ds, &query, 7);
        assert!((kpis.yoy_pct - 50.0).abs() < 1e-9);
        assert!(kpis.yoy_positive);
        assert_eq!(kpis.peak_year, 2023);
    }

    #[test]
    fn missing_previous_year_means_flat_yoy() {
        let ds = Dataset::new(vec![record("P", "P1", "T", "ME", 2023, 7, 1000)]);
        let query = FilterQuery {
            year: Some(2023),
            ..Default::default()
        };
        let kpis = compute_kpis(&ds, &query, 7);
        assert_eq!(kpis.yoy_pct, 0.0);
        assert!(kpis.yoy_positive);
    }

    #[test]
    fn empty_selection_uses_placeholders() {
        let ds = sample_dataset();
        let query = FilterQuery {
            month: Some(2),
            year: Some(1999),
            ..Default::default()
        };
        let kpis = compute_kpis(&ds, &query, 7);
        assert_eq!(kpis.top_park_month, "—");
        assert_eq!(kpis.total_month, 0);
        assert_eq!(kpis.avg_per_park, 0.0);
    }

    #[test]
    fn defaults_fill_month_and_year() {
        let ds = sample_dataset();
        let kpis = compute_kpis(&ds, &FilterQuery::default(), 7);
        assert_eq!(kpis.month, 7);
        assert_eq!(kpis.year, 2023);
    }

    #[test]
    fn top_state_is_reported_by_display_name() {
        let ds = sample_dataset();
        let query = FilterQuery {
            year: Some(2023),
            ..Default::default()
        };
        let kpis = compute_kpis(&ds, &query, 7);
        assert_eq!(kpis.top_state_year, "Utah");
    }

    #[test]
    fn storyline_has_three_sentences() {
        let ds = sample_dataset();
        let kpis = compute_kpis(&ds, &FilterQuery::default(), 7);
        let lines = storyline(&kpis);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Jul 2023"));
        assert!(lines[1].contains(&kpis.top_park_month));
    }
}
