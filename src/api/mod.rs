pub mod analysis;
pub mod health;
pub mod tickets;

use axum::Router;
use axum::routing::{get, post};

use crate::context::AppContext;

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/db", get(health::db_health))
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_tickets),
        )
        .route("/analyze", post(analysis::analyze))
        .route("/analysis/latest", get(analysis::latest))
        .with_state(ctx)
}
