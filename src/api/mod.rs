// HTTP dashboard API: serves the aggregates the chart front end renders.

pub mod handlers;
pub mod routes;

use std::time::Instant;

use actix_web::{web, App, HttpServer};
use tracing::info;

use crate::analyzer::Dataset;
use crate::config::AppConfig;

/// Read-only state shared by every request handler.
pub struct AppState {
    pub dataset: Dataset,
    pub default_month: u32,
    pub top_parks_limit: usize,
    pub started: Instant,
}

/// Runs the dev server until interrupted. The dataset is loaded once by
/// the caller and never mutated afterwards.
pub async fn run_server(config: AppConfig, dataset: Dataset) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        dataset,
        default_month: config.default_month,
        top_parks_limit: config.top_parks_limit,
        started: Instant::now(),
    });

    info!(
        "Dashboard API listening on http://{}:{}",
        config.bind_addr, config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure_routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
