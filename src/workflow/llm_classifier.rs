use serde::Serialize;
use serde_json::Value;

use crate::domain::analysis::{Category, Classification, ClassifiedTicket, Priority};
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;
use crate::workflow::classifier::classify_ticket;

const TRIAGE_INSTRUCTIONS: &str = r#"You are a support ticket triage assistant.

For each ticket, assign:
- category: one of "bug", "billing", "feature_request", "other"
- priority: one of "low", "medium", "high"
- notes: a short explanation (1-2 sentences).

Return ONLY valid JSON (no markdown fences): a list with one object per ticket, e.g.
[
  {"ticket_id": 1, "category": "bug", "priority": "high", "notes": "..."}
]"#;

pub const MISSING_RESULT_NOTE: &str = " (LLM missing result; rule-based fallback)";
pub const INVALID_RESULT_NOTE: &str = " (LLM invalid result; rule-based fallback)";
const DEFAULT_LLM_NOTES: &str = "LLM classification.";

#[derive(Serialize)]
struct TicketPayload<'a> {
    ticket_id: i64,
    title: &'a str,
    description: &'a str,
}

/// Classifies the whole batch with one model call.
///
/// Returns `None` when the model cannot be used at all (empty batch, call
/// failure, unparseable reply, or a reply that is not a list of objects); the caller then falls back to
/// rules for every ticket. Individual tickets the reply misses or labels
/// badly are classified by rules here and annotated in their notes.
pub async fn classify_with_model(
    model: &dyn LanguageModelService,
    tickets: &[Ticket],
) -> Option<Vec<ClassifiedTicket>> {
    if tickets.is_empty() {
        return None;
    }

    match try_classify(model, tickets).await {
        Ok(results) => Some(results),
        Err(err) => {
            tracing::warn!(error = %err, "LLM classification unavailable, falling back to rules");
            None
        }
    }
}

async fn try_classify(
    model: &dyn LanguageModelService,
    tickets: &[Ticket],
) -> AppResult<Vec<ClassifiedTicket>> {
    let prompt = build_prompt(tickets)?;
    let raw = model.generate(&prompt).await?;
    let cleaned = strip_code_fence(&raw);
    tracing::debug!(response = %cleaned, "raw LLM response");
    parse_results(cleaned, tickets)
}

pub fn build_prompt(tickets: &[Ticket]) -> AppResult<String> {
    let payload = tickets
        .iter()
        .map(|ticket| TicketPayload {
            ticket_id: ticket.id,
            title: &ticket.title,
            description: &ticket.description,
        })
        .collect::<Vec<_>>();
    let tickets_json = serde_json::to_string(&payload)?;
    Ok(format!("{TRIAGE_INSTRUCTIONS}\n\nTICKETS_JSON =\n{tickets_json}"))
}

/// Removes a surrounding Markdown fence such as ```` ```json ... ``` ````.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    match (trimmed.find('\n'), trimmed.rfind("```")) {
        (Some(first_newline), Some(last_fence)) if last_fence > first_newline => {
            trimmed[first_newline + 1..last_fence].trim()
        }
        _ => trimmed,
    }
}

fn parse_results(raw: &str, tickets: &[Ticket]) -> AppResult<Vec<ClassifiedTicket>> {
    let data: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = data else {
        return Err(AppError::LanguageModel(
            "model returned non-list JSON".to_string(),
        ));
    };
    if !items.iter().all(Value::is_object) {
        return Err(AppError::LanguageModel(
            "model returned a list with non-object entries".to_string(),
        ));
    }

    let results = tickets
        .iter()
        .map(|ticket| {
            let entry = items
                .iter()
                .find(|item| item.get("ticket_id").and_then(as_ticket_id) == Some(ticket.id));

            let classification = match entry {
                None => classify_ticket(ticket).with_note_suffix(MISSING_RESULT_NOTE),
                Some(entry) => model_classification(entry).unwrap_or_else(|| {
                    classify_ticket(ticket).with_note_suffix(INVALID_RESULT_NOTE)
                }),
            };

            ClassifiedTicket {
                ticket: ticket.clone(),
                classification,
            }
        })
        .collect();

    Ok(results)
}

fn as_ticket_id(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.fract() == 0.0)
            .map(|number| number as i64)
    })
}

fn model_classification(entry: &Value) -> Option<Classification> {
    let label = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or_default();

    let category = Category::from_str(label("category"))?;
    let priority = Priority::from_str(label("priority"))?;
    let notes = match label("notes").trim() {
        "" => DEFAULT_LLM_NOTES.to_string(),
        notes => notes.to_string(),
    };

    Some(Classification {
        category,
        priority,
        notes,
    })
}
