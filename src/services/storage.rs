use crate::domain::analysis::{AnalysisRun, ClassifiedTicket, TicketAnalysis};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::error::AppResult;

pub trait TicketStore: Send + Sync {
    /// Inserts all tickets in one transaction, returning them in input order.
    fn create_tickets(&self, items: Vec<NewTicket>) -> AppResult<Vec<Ticket>>;

    /// Tickets with the given ids, or every ticket when `ids` is `None` or
    /// empty. Always ordered by id ascending.
    fn tickets_by_ids_or_all(&self, ids: Option<&[i64]>) -> AppResult<Vec<Ticket>>;
}

pub trait AnalysisStore: Send + Sync {
    fn create_run_with_results(
        &self,
        summary: &str,
        analyses: &[ClassifiedTicket],
    ) -> AppResult<(AnalysisRun, Vec<TicketAnalysis>)>;

    fn latest_with_tickets(&self) -> AppResult<Option<(AnalysisRun, Vec<TicketAnalysis>)>>;
}

/// Everything the service needs from its backing database.
pub trait TriageStore: TicketStore + AnalysisStore {
    /// Cheap round trip used by the readiness probe.
    fn ping(&self) -> AppResult<()>;
}

/// Runs store work on tokio's blocking pool so SQLite calls never stall the
/// async workers.
pub async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
