//! Request handlers. Every endpoint applies the common dashboard filter
//! and shapes one aggregate for the front end; handlers never mutate
//! shared state.

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::analyzer::{kpis, rankings, seasonal, tiers, FilterQuery};
use crate::states;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody { error: message })
}

/// Extra knobs that ride alongside the filter on some endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    uptime_seconds: u64,
    records: usize,
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthBody {
        status: "ok",
        uptime_seconds: state.started.elapsed().as_secs(),
        records: state.dataset.len(),
    })
}

#[derive(Debug, Serialize)]
struct MetaBody {
    years: Vec<i32>,
    latest_year: Option<i32>,
    default_month: u32,
    region_groups: Vec<&'static str>,
    destinations: Vec<&'static str>,
    park_types: Vec<String>,
}

pub async fn meta(state: web::Data<AppState>) -> impl Responder {
    let mut region_groups = vec!["All"];
    region_groups.extend(states::REGION_GROUPS.iter().map(|(name, _)| *name));

    HttpResponse::Ok().json(MetaBody {
        years: state.dataset.years().to_vec(),
        latest_year: state.dataset.latest_year(),
        default_month: state.default_month,
        region_groups,
        destinations: vec!["All", "National Park", "City"],
        park_types: state.dataset.park_types(),
    })
}

pub async fn map_tiers(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(tiers::map_rows(&rows))
}

pub async fn kpis(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    HttpResponse::Ok().json(kpis::compute_kpis(
        &state.dataset,
        &query,
        state.default_month,
    ))
}

#[derive(Debug, Serialize)]
struct StorylineBody {
    lines: Vec<String>,
}

pub async fn storyline(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let summary = kpis::compute_kpis(&state.dataset, &query, state.default_month);
    HttpResponse::Ok().json(StorylineBody {
        lines: kpis::storyline(&summary),
    })
}

/// Region/season heatmap for the selected year; the month filter does
/// not apply to this view.
pub async fn heatmap(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    query.month = None;
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(seasonal::region_season_matrix(&rows))
}

/// Visits per year for the selected month, across all years up to the
/// selected one.
pub async fn yearly_trend(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    let cap_year = query.year.take();
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(rankings::yearly_trend(&rows, cap_year))
}

#[derive(Debug, Serialize)]
struct MonthlyProfileBody {
    months: Vec<&'static str>,
    visits: Vec<i64>,
}

/// Twelve-month visit profile of the selected year.
pub async fn monthly_profile(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    query.month = None;
    let rows = state.dataset.filter(&query);
    let profile = seasonal::monthly_profile(&rows);
    HttpResponse::Ok().json(MonthlyProfileBody {
        months: crate::utils::MONTH_NAMES.to_vec(),
        visits: profile.to_vec(),
    })
}

pub async fn top_parks(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
    extra: web::Query<LimitQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let limit = extra.limit.unwrap_or(state.top_parks_limit);
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(rankings::top_parks(&rows, limit))
}

/// Best park of each year for the selected month.
pub async fn top_park_by_year(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    query.year = None;
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(rankings::top_park_per_year(&rows))
}

pub async fn active_parks(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    let cap_year = query.year.take();
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(rankings::active_parks_per_year(&rows, cap_year))
}

pub async fn state_spend(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(rankings::spend_index_by_state(&rows, 10))
}

/// Season-by-season region rankings; months are bucketed into seasons,
/// so the month filter is cleared.
pub async fn recommendations(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> impl Responder {
    if let Err(message) = query.validate() {
        return bad_request(message);
    }
    let mut query = query.into_inner();
    query.month = None;
    let rows = state.dataset.filter(&query);
    HttpResponse::Ok().json(seasonal::seasonal_recommendations(&rows))
}
