use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ticket::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bug,
    Billing,
    FeatureRequest,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "bug",
            Category::Billing => "billing",
            Category::FeatureRequest => "feature_request",
            Category::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bug" => Some(Category::Bug),
            "billing" => Some(Category::Billing),
            "feature_request" => Some(Category::FeatureRequest),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
    pub notes: String,
}

impl Classification {
    pub fn with_note_suffix(mut self, suffix: &str) -> Self {
        self.notes.push_str(suffix);
        self
    }
}

/// A ticket paired with the classification chosen for it in the current run.
#[derive(Debug, Clone)]
pub struct ClassifiedTicket {
    pub ticket: Ticket,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAnalysis {
    pub id: i64,
    pub analysis_run_id: i64,
    pub ticket_id: i64,
    pub category: Category,
    pub priority: Priority,
    pub notes: Option<String>,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    pub analysis_run: Option<AnalysisRun>,
    pub ticket_analysis: Vec<TicketAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_labels() {
        assert_eq!(Category::from_str("Billing"), Some(Category::Billing));
        assert_eq!(
            Category::from_str(" feature_request "),
            Some(Category::FeatureRequest)
        );
        assert_eq!(Category::from_str("feature request"), None);
    }

    #[test]
    fn parses_priority_labels() {
        assert_eq!(Priority::from_str("HIGH"), Some(Priority::High));
        assert_eq!(Priority::from_str("critical"), None);
    }

    #[test]
    fn serializes_labels_in_snake_case() {
        let value = serde_json::to_value(Category::FeatureRequest).unwrap();
        assert_eq!(value, serde_json::json!("feature_request"));
        let value = serde_json::to_value(Priority::Medium).unwrap();
        assert_eq!(value, serde_json::json!("medium"));
    }
}
