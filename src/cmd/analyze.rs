use crate::context::AppContext;
use crate::domain::analysis::AnalysisResult;
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct AnalyzeCommandArgs {
    pub ticket_ids: Vec<i64>,
}

pub async fn run(ctx: &AppContext, args: AnalyzeCommandArgs) -> AppResult<AnalysisResult> {
    let ticket_ids = if args.ticket_ids.is_empty() {
        None
    } else {
        Some(args.ticket_ids)
    };
    let result = ctx.pipeline.run(ticket_ids).await?;
    Ok(result.into())
}
