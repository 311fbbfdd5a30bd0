use tokio::net::TcpListener;

use crate::api;
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct ServeCommandArgs {
    pub bind: Option<String>,
}

pub async fn run(ctx: AppContext, args: ServeCommandArgs) -> AppResult<()> {
    let bind = args
        .bind
        .unwrap_or_else(|| ctx.config.bind_address.clone());
    let listener = TcpListener::bind(&bind).await?;

    tracing::info!(
        address = %listener.local_addr()?,
        database = %ctx.config.database.display(),
        mode = ctx.pipeline.mode().label(),
        "triage service listening"
    );

    axum::serve(listener, api::router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("triage service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
