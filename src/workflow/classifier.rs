use crate::domain::analysis::{Category, Classification, Priority};
use crate::domain::ticket::Ticket;

// Checked in order; the first list with a hit decides.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Billing, &["billing", "invoice", "charge", "payment"]),
    (Category::Bug, &["bug", "error", "crash", "issue", "failure"]),
    (Category::FeatureRequest, &["feature", "request"]),
];

const PRIORITY_RULES: &[(Priority, &[&str])] = &[
    (Priority::High, &["urgent", "asap", "down", "critical"]),
    (Priority::Medium, &["slow", "annoying", "degraded"]),
];

pub fn classify_ticket(ticket: &Ticket) -> Classification {
    classify_text(&ticket.text())
}

/// Keyword classification over free text. Matching is case-insensitive
/// substring search.
pub fn classify_text(text: &str) -> Classification {
    let text = text.to_lowercase();

    let category = first_match(&text, CATEGORY_RULES).unwrap_or(Category::Other);
    let priority = first_match(&text, PRIORITY_RULES).unwrap_or(Priority::Low);

    Classification {
        category,
        priority,
        notes: format!(
            "Rule-based classification: {}, {}",
            category.as_str(),
            priority.as_str()
        ),
    }
}

fn first_match<T: Copy>(text: &str, rules: &[(T, &[&str])]) -> Option<T> {
    rules
        .iter()
        .find(|(_, words)| words.iter().any(|word| text.contains(word)))
        .map(|(label, _)| *label)
}
