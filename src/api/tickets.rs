use axum::Json;
use axum::extract::State;

use crate::context::AppContext;
use crate::domain::ticket::{NewTicket, Ticket};
use crate::error::AppResult;
use crate::services::{TicketStore, blocking};

pub async fn create_tickets(
    State(ctx): State<AppContext>,
    Json(items): Json<Vec<NewTicket>>,
) -> AppResult<Json<Vec<Ticket>>> {
    let store = ctx.store.clone();
    let created = blocking(move || store.create_tickets(items)).await?;
    tracing::info!(count = created.len(), "tickets created");
    Ok(Json(created))
}

pub async fn list_tickets(State(ctx): State<AppContext>) -> AppResult<Json<Vec<Ticket>>> {
    let store = ctx.store.clone();
    let tickets = blocking(move || store.tickets_by_ids_or_all(None)).await?;
    Ok(Json(tickets))
}
