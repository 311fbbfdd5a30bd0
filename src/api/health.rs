use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::context::AppContext;
use crate::services::{TriageStore, blocking};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend running" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn db_health(State(ctx): State<AppContext>) -> Json<Value> {
    let store = ctx.store.clone();
    match blocking(move || store.ping()).await {
        Ok(()) => Json(json!({ "status": "ok", "db": "connected" })),
        Err(err) => {
            tracing::warn!(error = %err, "database health check failed");
            Json(json!({ "status": "error", "db": err.to_string() }))
        }
    }
}
