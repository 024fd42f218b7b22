//! API route configuration.

use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/meta", web::get().to(handlers::meta))
            .route("/map/tiers", web::get().to(handlers::map_tiers))
            .route("/kpis", web::get().to(handlers::kpis))
            .route("/storyline", web::get().to(handlers::storyline))
            .route("/heatmap", web::get().to(handlers::heatmap))
            .route("/trend/yearly", web::get().to(handlers::yearly_trend))
            .route("/profile/monthly", web::get().to(handlers::monthly_profile))
            .service(
                web::scope("/parks")
                    .route("/top", web::get().to(handlers::top_parks))
                    .route("/top-by-year", web::get().to(handlers::top_park_by_year))
                    .route("/active", web::get().to(handlers::active_parks)),
            )
            .route("/states/spend", web::get().to(handlers::state_spend))
            .route("/recommendations", web::get().to(handlers::recommendations)),
    );
}
