//! Cross-view reconciliation: every aggregate must add up to the same
//! raw sums it was derived from.

use parkflow::analyzer::{dataset::FilterQuery, kpis, rankings, seasonal, tiers, Dataset};
use parkflow::model::VisitRecord;

fn record(park: &str, unit: &str, state: &str, year: i32, month: u32, visits: i64) -> VisitRecord {
    VisitRecord {
        park: park.into(),
        unit_code: unit.into(),
        park_type: "National Park".into(),
        region: String::new(),
        state: state.into(),
        year,
        month,
        recreation_visits: visits,
        is_forecast: false,
    }
}

fn dataset() -> Dataset {
    Dataset::new(vec![
        record("Acadia NP", "ACAD", "ME", 2022, 4, 150),
        record("Acadia NP", "ACAD", "ME", 2022, 7, 500),
        record("Acadia NP", "ACAD", "ME", 2023, 7, 650),
        record("Zion NP", "ZION", "UT", 2022, 7, 400),
        record("Zion NP", "ZION", "UT", 2023, 7, 800),
        record("Zion NP", "ZION", "UT", 2023, 12, 90),
        record("Olympic NP", "OLYM", "WA", 2023, 7, 700),
        record("Starved Rock", "STRO", "IL", 2023, 7, 300),
    ])
}

fn raw_total(rows: &[&VisitRecord]) -> i64 {
    rows.iter().map(|r| r.recreation_visits).sum()
}

#[test]
fn state_tier_sums_cover_the_whole_selection() {
    let ds = dataset();
    let query = FilterQuery {
        year: Some(2023),
        ..Default::default()
    };
    let rows = ds.filter(&query);

    // Every filtered record belongs to exactly one state row of the map.
    let map = tiers::map_rows(&rows);
    let mapped_states: Vec<&str> = map.iter().map(|r| r.state).collect();
    assert!(rows.iter().all(|r| mapped_states.contains(&r.state.as_str())));
}

#[test]
fn heatmap_total_matches_grouped_raw_sum() {
    let ds = dataset();
    let rows = ds.filter(&FilterQuery::default());
    let matrix = seasonal::region_season_matrix(&rows);

    // IL belongs to no region group and is the only excluded state.
    let grouped: i64 = rows
        .iter()
        .filter(|r| r.state != "IL")
        .map(|r| r.recreation_visits)
        .sum();
    assert_eq!(matrix.total, grouped);
}

#[test]
fn monthly_profile_reconciles_with_the_year_total() {
    let ds = dataset();
    let query = FilterQuery {
        year: Some(2023),
        ..Default::default()
    };
    let rows = ds.filter(&query);
    let profile = seasonal::monthly_profile(&rows);
    assert_eq!(profile.iter().sum::<i64>(), raw_total(&rows));
}

#[test]
fn yearly_trend_reconciles_with_the_unfiltered_total() {
    let ds = dataset();
    let rows = ds.filter(&FilterQuery::default());
    let trend = rankings::yearly_trend(&rows, None);
    assert_eq!(trend.iter().map(|y| y.visits).sum::<i64>(), raw_total(&rows));
}

#[test]
fn top_parks_with_a_large_limit_sum_to_the_total() {
    let ds = dataset();
    let rows = ds.filter(&FilterQuery::default());
    let all_parks = rankings::top_parks(&rows, usize::MAX);
    assert_eq!(
        all_parks.iter().map(|p| p.visits).sum::<i64>(),
        raw_total(&rows)
    );
}

#[test]
fn kpi_year_total_matches_the_year_filter() {
    let ds = dataset();
    let query = FilterQuery {
        month: Some(7),
        year: Some(2023),
        ..Default::default()
    };
    let summary = kpis::compute_kpis(&ds, &query, 7);

    let year_rows = ds.filter(&FilterQuery {
        year: Some(2023),
        ..Default::default()
    });
    assert_eq!(summary.total_year, raw_total(&year_rows));

    let month_rows = ds.filter(&query);
    assert_eq!(summary.total_month, raw_total(&month_rows));
}

#[test]
fn filters_only_ever_shrink_the_selection() {
    let ds = dataset();
    let unfiltered = ds.filter(&FilterQuery::default()).len();
    for query in [
        FilterQuery {
            month: Some(7),
            ..Default::default()
        },
        FilterQuery {
            region: Some("Mountain".into()),
            ..Default::default()
        },
        FilterQuery {
            destination: Some("City".into()),
            ..Default::default()
        },
    ] {
        assert!(ds.filter(&query).len() <= unfiltered);
    }
}
