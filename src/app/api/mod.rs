//! HTTP API: production queries, the Grafana datasource and the health probe.

pub mod auth;
pub mod grafana;
mod handlers;
mod params;
pub mod responses;

use crate::core::solar::SolarService;
use auth::{require_basic_auth, Credentials};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub solar: Arc<SolarService>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(solar: Arc<SolarService>, credentials: Credentials) -> Self {
        Self {
            solar,
            credentials: Arc::new(credentials),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.solar.timezone()
    }
}

/// Routes behind basic auth.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/production/peak", get(handlers::get_production_peak))
        .route("/api/production/bounds", get(handlers::get_production_bounds))
        .route("/api/production/weather", get(handlers::get_production_weather))
        .route("/api/production/daily", get(handlers::get_daily_production))
        .route("/api/temperature/stats", get(handlers::get_temperature_stats))
        .route("/grafana", get(grafana::test_connection))
        .route("/grafana/", get(grafana::test_connection))
        .route("/grafana/metrics", post(grafana::metrics))
        .route(
            "/grafana/metric-payload-options",
            post(grafana::metric_payload_options),
        )
        .route("/grafana/query", post(grafana::query))
}

pub fn create_router(state: AppState) -> Router {
    let protected = protected_routes().route_layer(middleware::from_fn_with_state(
        state.credentials.clone(),
        require_basic_auth,
    ));

    Router::new()
        .merge(protected)
        .route("/status/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
