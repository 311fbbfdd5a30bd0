use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::context::AppContext;
use crate::domain::analysis::AnalysisResult;
use crate::error::AppResult;
use crate::services::{AnalysisStore, blocking};

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "ticketIds")]
    pub ticket_ids: Option<Vec<i64>>,
}

/// A missing or unreadable body analyzes every ticket.
pub async fn analyze(
    State(ctx): State<AppContext>,
    body: Option<Json<AnalyzeRequest>>,
) -> AppResult<Json<AnalysisResult>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let result = ctx.pipeline.run(request.ticket_ids).await?;
    Ok(Json(result.into()))
}

pub async fn latest(State(ctx): State<AppContext>) -> AppResult<Json<AnalysisResult>> {
    let store = ctx.store.clone();
    let result = match blocking(move || store.latest_with_tickets()).await? {
        Some((run, ticket_analysis)) => AnalysisResult {
            analysis_run: Some(run),
            ticket_analysis,
        },
        None => AnalysisResult::default(),
    };
    Ok(Json(result))
}
