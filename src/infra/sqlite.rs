use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::config::DatabaseLocation;
use crate::domain::analysis::{
    AnalysisRun, Category, ClassifiedTicket, Priority, TicketAnalysis,
};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::error::{AppError, AppResult};
use crate::infra::schema;
use crate::services::{AnalysisStore, TicketStore, TriageStore};

const TICKET_COLUMNS: &str = "id, title, description, created_at";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(location: &DatabaseLocation) -> AppResult<Self> {
        let conn = match location {
            DatabaseLocation::Memory => Connection::open_in_memory()?,
            DatabaseLocation::File(path) => Connection::open(path)?,
        };
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let store = Self::open(&DatabaseLocation::Memory)?;
        store.init_schema()?;
        Ok(store)
    }

    pub fn init_schema(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::DDL)?;
        Ok(())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("database connection lock poisoned".to_string()))
    }
}

impl TicketStore for SqliteStore {
    fn create_tickets(&self, items: Vec<NewTicket>) -> AppResult<Vec<Ticket>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(items.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tickets(title, description, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for item in items {
                let created_at = Utc::now();
                stmt.execute(params![item.title, item.description, created_at])?;
                created.push(Ticket {
                    id: tx.last_insert_rowid(),
                    title: item.title,
                    description: item.description,
                    created_at,
                });
            }
        }
        tx.commit()?;
        Ok(created)
    }

    fn tickets_by_ids_or_all(&self, ids: Option<&[i64]>) -> AppResult<Vec<Ticket>> {
        let conn = self.lock()?;
        let tickets = match ids.filter(|ids| !ids.is_empty()) {
            Some(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "SELECT {TICKET_COLUMNS} FROM tickets WHERE id IN ({placeholders}) ORDER BY id ASC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(ids.iter()), ticket_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets ORDER BY id ASC");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], ticket_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(tickets)
    }
}

impl AnalysisStore for SqliteStore {
    fn create_run_with_results(
        &self,
        summary: &str,
        analyses: &[ClassifiedTicket],
    ) -> AppResult<(AnalysisRun, Vec<TicketAnalysis>)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO analysis_runs(created_at, summary) VALUES (?1, ?2)",
            params![created_at, summary],
        )?;
        let run = AnalysisRun {
            id: tx.last_insert_rowid(),
            created_at,
            summary: Some(summary.to_string()),
        };

        let mut rows = Vec::with_capacity(analyses.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ticket_analysis(analysis_run_id, ticket_id, category, priority, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for item in analyses {
                let classification = &item.classification;
                stmt.execute(params![
                    run.id,
                    item.ticket.id,
                    classification.category.as_str(),
                    classification.priority.as_str(),
                    classification.notes,
                ])?;
                rows.push(TicketAnalysis {
                    id: tx.last_insert_rowid(),
                    analysis_run_id: run.id,
                    ticket_id: item.ticket.id,
                    category: classification.category,
                    priority: classification.priority,
                    notes: Some(classification.notes.clone()),
                    ticket: item.ticket.clone(),
                });
            }
        }

        tx.commit()?;
        Ok((run, rows))
    }

    fn latest_with_tickets(&self) -> AppResult<Option<(AnalysisRun, Vec<TicketAnalysis>)>> {
        let conn = self.lock()?;

        let run = conn
            .query_row(
                "SELECT id, created_at, summary FROM analysis_runs
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                [],
                |row| {
                    Ok(AnalysisRun {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        summary: row.get(2)?,
                    })
                },
            )
            .optional()?;
        let Some(run) = run else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT a.id, a.analysis_run_id, a.ticket_id, a.category, a.priority, a.notes,
                    t.id, t.title, t.description, t.created_at
             FROM ticket_analysis a
             JOIN tickets t ON t.id = a.ticket_id
             WHERE a.analysis_run_id = ?1
             ORDER BY a.id ASC",
        )?;
        let raw = stmt
            .query_map(params![run.id], |row| {
                Ok(RawAnalysisRow {
                    id: row.get(0)?,
                    analysis_run_id: row.get(1)?,
                    ticket_id: row.get(2)?,
                    category: row.get(3)?,
                    priority: row.get(4)?,
                    notes: row.get(5)?,
                    ticket: Ticket {
                        id: row.get(6)?,
                        title: row.get(7)?,
                        description: row.get(8)?,
                        created_at: row.get::<_, DateTime<Utc>>(9)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let items = raw
            .into_iter()
            .map(RawAnalysisRow::into_analysis)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Some((run, items)))
    }
}

impl TriageStore for SqliteStore {
    fn ping(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

struct RawAnalysisRow {
    id: i64,
    analysis_run_id: i64,
    ticket_id: i64,
    category: String,
    priority: String,
    notes: Option<String>,
    ticket: Ticket,
}

impl RawAnalysisRow {
    fn into_analysis(self) -> AppResult<TicketAnalysis> {
        let category = Category::from_str(&self.category).ok_or_else(|| {
            AppError::Storage(format!(
                "analysis row {} has unknown category '{}'",
                self.id, self.category
            ))
        })?;
        let priority = Priority::from_str(&self.priority).ok_or_else(|| {
            AppError::Storage(format!(
                "analysis row {} has unknown priority '{}'",
                self.id, self.priority
            ))
        })?;
        Ok(TicketAnalysis {
            id: self.id,
            analysis_run_id: self.analysis_run_id,
            ticket_id: self.ticket_id,
            category,
            priority,
            notes: self.notes,
            ticket: self.ticket,
        })
    }
}
