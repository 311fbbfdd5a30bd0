use std::sync::Arc;

use crate::domain::analysis::{AnalysisResult, AnalysisRun, ClassifiedTicket, TicketAnalysis};
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::services::{AnalysisStore, LanguageModelService, TicketStore, TriageStore, blocking};
use crate::workflow::classifier::classify_ticket;
use crate::workflow::llm_classifier::classify_with_model;

const SUMMARY_TITLE_LIMIT: usize = 5;
pub const NO_TICKETS_SUMMARY: &str = "No tickets to analyze.";
pub const UNAVAILABLE_NOTE: &str = " (LLM unavailable; rule-based fallback)";

/// How tickets get classified. Built once from configuration.
#[derive(Clone)]
pub enum ClassifierMode {
    Rules,
    Llm(Arc<dyn LanguageModelService>),
}

impl ClassifierMode {
    pub fn label(&self) -> &'static str {
        match self {
            ClassifierMode::Rules => "rules",
            ClassifierMode::Llm(_) => "llm",
        }
    }
}

#[derive(Debug)]
pub struct FetchResult {
    pub tickets: Vec<Ticket>,
}

#[derive(Debug)]
pub struct ClassifyResult {
    pub analyses: Vec<ClassifiedTicket>,
    pub used_llm: bool,
}

#[derive(Debug)]
pub struct PersistResult {
    pub run: AnalysisRun,
    pub analyses: Vec<TicketAnalysis>,
}

impl From<PersistResult> for AnalysisResult {
    fn from(result: PersistResult) -> Self {
        AnalysisResult {
            analysis_run: Some(result.run),
            ticket_analysis: result.analyses,
        }
    }
}

/// fetch -> classify -> persist, once per call.
#[derive(Clone)]
pub struct AnalysisPipeline {
    store: Arc<dyn TriageStore>,
    mode: ClassifierMode,
}

impl AnalysisPipeline {
    pub fn new(store: Arc<dyn TriageStore>, mode: ClassifierMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> &ClassifierMode {
        &self.mode
    }

    /// Store stages run on the blocking pool; only the model call is awaited
    /// on the async workers.
    pub async fn run(&self, ticket_ids: Option<Vec<i64>>) -> AppResult<PersistResult> {
        let pipeline = self.clone();
        let fetched = blocking(move || pipeline.fetch(ticket_ids.as_deref())).await?;
        let classified = self.classify(fetched).await;
        let pipeline = self.clone();
        let persisted = blocking(move || pipeline.persist(classified)).await?;

        tracing::info!(
            run_id = persisted.run.id,
            tickets = persisted.analyses.len(),
            mode = self.mode.label(),
            "analysis run stored"
        );
        Ok(persisted)
    }

    pub fn fetch(&self, ticket_ids: Option<&[i64]>) -> AppResult<FetchResult> {
        let tickets = self.store.tickets_by_ids_or_all(ticket_ids)?;
        Ok(FetchResult { tickets })
    }

    pub async fn classify(&self, fetched: FetchResult) -> ClassifyResult {
        let tickets = fetched.tickets;
        match &self.mode {
            ClassifierMode::Rules => ClassifyResult {
                analyses: classify_with_rules(tickets, None),
                used_llm: false,
            },
            ClassifierMode::Llm(model) => match classify_with_model(model.as_ref(), &tickets).await
            {
                Some(analyses) => ClassifyResult {
                    analyses,
                    used_llm: true,
                },
                None => ClassifyResult {
                    analyses: classify_with_rules(tickets, Some(UNAVAILABLE_NOTE)),
                    used_llm: false,
                },
            },
        }
    }

    pub fn persist(&self, classified: ClassifyResult) -> AppResult<PersistResult> {
        let tickets = classified
            .analyses
            .iter()
            .map(|item| &item.ticket)
            .collect::<Vec<_>>();
        let summary = summarize(&tickets, classified.used_llm);

        let (run, analyses) = self
            .store
            .create_run_with_results(&summary, &classified.analyses)?;
        Ok(PersistResult { run, analyses })
    }
}

fn classify_with_rules(tickets: Vec<Ticket>, note_suffix: Option<&str>) -> Vec<ClassifiedTicket> {
    tickets
        .into_iter()
        .map(|ticket| {
            let classification = classify_ticket(&ticket);
            let classification = match note_suffix {
                Some(suffix) => classification.with_note_suffix(suffix),
                None => classification,
            };
            ClassifiedTicket {
                ticket,
                classification,
            }
        })
        .collect()
}

pub fn summarize(tickets: &[&Ticket], used_llm: bool) -> String {
    if tickets.is_empty() {
        return NO_TICKETS_SUMMARY.to_string();
    }

    let titles = tickets
        .iter()
        .take(SUMMARY_TITLE_LIMIT)
        .map(|ticket| ticket.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let suffix = if tickets.len() > SUMMARY_TITLE_LIMIT {
        format!(" (+{} more)", tickets.len() - SUMMARY_TITLE_LIMIT)
    } else {
        String::new()
    };
    let mode = if used_llm { "LLM mode" } else { "rule mode" };

    format!(
        "Analyzed {} tickets using {mode}. Example titles: {titles}{suffix}.",
        tickets.len()
    )
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::analysis::{Category, Priority};
    use crate::domain::ticket::NewTicket;
    use crate::error::AppError;
    use crate::infra::sqlite::SqliteStore;
    use crate::workflow::llm_classifier::MISSING_RESULT_NOTE;

    struct ScriptedModel(&'static str);

    #[async_trait]
    impl LanguageModelService for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> AppResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct OfflineModel;

    #[async_trait]
    impl LanguageModelService for OfflineModel {
        async fn generate(&self, _prompt: &str) -> AppResult<String> {
            Err(AppError::LanguageModel("connection refused".to_string()))
        }
    }

    fn seeded_store(titles: &[&str]) -> (Arc<SqliteStore>, Vec<Ticket>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let tickets = store
            .create_tickets(
                titles
                    .iter()
                    .map(|title| NewTicket {
                        title: title.to_string(),
                        description: "details".to_string(),
                    })
                    .collect(),
            )
            .unwrap();
        (store, tickets)
    }

    #[tokio::test]
    async fn empty_store_creates_run_without_rows() {
        let (store, _) = seeded_store(&[]);
        let pipeline = AnalysisPipeline::new(store.clone(), ClassifierMode::Rules);

        let result = pipeline.run(None).await.unwrap();
        assert_eq!(result.run.summary.as_deref(), Some(NO_TICKETS_SUMMARY));
        assert!(result.analyses.is_empty());

        let (latest, rows) = store.latest_with_tickets().unwrap().unwrap();
        assert_eq!(latest.id, result.run.id);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn rules_mode_classifies_selected_tickets() {
        let (store, tickets) =
            seeded_store(&["Billing issue", "Server down", "Feature idea"]);
        let pipeline = AnalysisPipeline::new(store, ClassifierMode::Rules);

        let result = pipeline
            .run(Some(vec![tickets[2].id, tickets[0].id]))
            .await
            .unwrap();
        assert_eq!(result.analyses.len(), 2);
        assert_eq!(result.analyses[0].ticket_id, tickets[0].id);
        assert_eq!(result.analyses[0].category, Category::Billing);
        assert_eq!(result.analyses[1].category, Category::FeatureRequest);
        assert_eq!(
            result.run.summary.as_deref(),
            Some("Analyzed 2 tickets using rule mode. Example titles: Billing issue, Feature idea.")
        );
    }

    #[tokio::test]
    async fn non_list_reply_falls_back_for_whole_batch() {
        let (store, _) = seeded_store(&["Crash on login", "Refund charge"]);
        let model = Arc::new(ScriptedModel(r#"{"not": "a list"}"#));
        let pipeline = AnalysisPipeline::new(store, ClassifierMode::Llm(model));

        let result = pipeline.run(None).await.unwrap();
        assert!(
            result
                .run
                .summary
                .as_deref()
                .unwrap()
                .contains("using rule mode")
        );
        for row in &result.analyses {
            assert!(row.notes.as_deref().unwrap().ends_with(UNAVAILABLE_NOTE));
        }
        assert_eq!(result.analyses[0].category, Category::Bug);
        assert_eq!(result.analyses[1].category, Category::Billing);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_rules() {
        let (store, _) = seeded_store(&["Site down"]);
        let pipeline = AnalysisPipeline::new(store, ClassifierMode::Llm(Arc::new(OfflineModel)));

        let classified = pipeline.classify(pipeline.fetch(None).unwrap()).await;
        assert!(!classified.used_llm);
        assert_eq!(classified.analyses[0].classification.priority, Priority::High);
    }

    #[tokio::test]
    async fn partial_reply_mixes_model_and_rules() {
        let (store, _) = seeded_store(&["First", "Second"]);
        // Ids start at 1 in a fresh database.
        let model = Arc::new(ScriptedModel(
            r#"[{"ticket_id": 1, "category": "feature_request", "priority": "medium", "notes": "ok"}]"#,
        ));
        let pipeline = AnalysisPipeline::new(store, ClassifierMode::Llm(model));

        let result = pipeline.run(None).await.unwrap();
        assert!(result.run.summary.as_deref().unwrap().contains("using LLM mode"));
        assert_eq!(result.analyses[0].category, Category::FeatureRequest);
        assert_eq!(result.analyses[0].notes.as_deref(), Some("ok"));
        assert_eq!(result.analyses[1].category, Category::Other);
        assert!(
            result.analyses[1]
                .notes
                .as_deref()
                .unwrap()
                .ends_with(MISSING_RESULT_NOTE)
        );
    }

    #[test]
    fn summary_truncates_after_five_titles() {
        let tickets = (1..=7)
            .map(|id| Ticket {
                id,
                title: format!("T{id}"),
                description: String::new(),
                created_at: chrono::Utc::now(),
            })
            .collect::<Vec<_>>();
        let refs = tickets.iter().collect::<Vec<_>>();

        assert_eq!(
            summarize(&refs, true),
            "Analyzed 7 tickets using LLM mode. Example titles: T1, T2, T3, T4, T5 (+2 more)."
        );
        assert_eq!(summarize(&[], false), NO_TICKETS_SUMMARY);
    }
}
