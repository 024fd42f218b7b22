//! Seasonal aggregations: the region/season heatmap, the monthly
//! profile sparkline and the data-driven seasonal recommendations.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Season, VisitRecord, SEASON_ORDER};
use crate::states;

/// Heatmap payload: `values[region][season]`, zero-filled, fixed orders.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonMatrix {
    pub regions: Vec<&'static str>,
    pub seasons: Vec<&'static str>,
    pub values: Vec<Vec<i64>>,
    pub total: i64,
}

/// Region/season visit sums. The "Other" group is excluded from the
/// matrix (but counted in nothing else either, matching the dashboard).
pub fn region_season_matrix(rows: &[&VisitRecord]) -> SeasonMatrix {
    let mut sums: HashMap<(&'static str, Season), i64> = HashMap::new();
    for record in rows {
        let group = states::region_group(&record.state);
        if group == states::OTHER_GROUP {
            continue;
        }
        *sums
            .entry((group, Season::of_month(record.month)))
            .or_default() += record.recreation_visits;
    }

    let mut values = Vec::with_capacity(states::HEATMAP_REGION_ORDER.len());
    let mut total = 0i64;
    for region in states::HEATMAP_REGION_ORDER {
        let mut row = Vec::with_capacity(SEASON_ORDER.len());
        for season in SEASON_ORDER {
            let v = sums.get(&(region, season)).copied().unwrap_or(0);
            total += v;
            row.push(v);
        }
        values.push(row);
    }

    SeasonMatrix {
        regions: states::HEATMAP_REGION_ORDER.to_vec(),
        seasons: SEASON_ORDER.iter().map(|s| s.label()).collect(),
        values,
        total,
    }
}

/// Visit sums for months 1-12; months absent from the selection are 0.
pub fn monthly_profile(rows: &[&VisitRecord]) -> [i64; 12] {
    let mut profile = [0i64; 12];
    for record in rows {
        if (1..=12).contains(&record.month) {
            profile[record.month as usize - 1] += record.recreation_visits;
        }
    }
    profile
}

/// A region's standing within one season.
#[derive(Debug, Clone, Serialize)]
pub struct RegionShare {
    pub region: &'static str,
    pub visits: i64,
    /// Share of the season total, in percent.
    pub share_pct: f64,
}

/// Per-season region ranking for the recommendations view.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonRecommendation {
    pub season: &'static str,
    pub months: &'static str,
    /// Region groups ranked by historical visit share, best first.
    pub regions: Vec<RegionShare>,
}

fn season_months(season: Season) -> &'static str {
    match season {
        Season::Spring => "March – May",
        Season::Summer => "June – August",
        Season::Fall => "September – November",
        Season::Winter => "December – February",
    }
}

/// Rank region groups inside each season by their share of that
/// season's visits. Replaces a hand-written editorial page with the
/// same story computed from the data.
pub fn seasonal_recommendations(rows: &[&VisitRecord]) -> Vec<SeasonRecommendation> {
    let matrix = region_season_matrix(rows);

    SEASON_ORDER
        .iter()
        .enumerate()
        .map(|(season_idx, season)| {
            let season_total: i64 = matrix.values.iter().map(|row| row[season_idx]).sum();
            let mut regions: Vec<RegionShare> = matrix
                .regions
                .iter()
                .enumerate()
                .map(|(region_idx, &region)| {
                    let visits = matrix.values[region_idx][season_idx];
                    let share_pct = if season_total > 0 {
                        visits as f64 * 100.0 / season_total as f64
                    } else {
                        0.0
                    };
                    RegionShare {
                        region,
                        visits,
                        share_pct,
                    }
                })
                .collect();
            regions.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.region.cmp(b.region)));

            SeasonRecommendation {
                season: season.label(),
                months: season_months(*season),
                regions,
            }
        })
        .collect()
}
