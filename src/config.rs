use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseLocation,
    pub analysis_mode: AnalysisMode,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub bind_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Rules,
    Llm,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Rules => "rules",
            AnalysisMode::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn parse(url: &str) -> AppResult<Self> {
        let trimmed = url.trim();
        let path = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        if path.is_empty() {
            return Err(AppError::Configuration(
                "DATABASE_URL does not name a database".to_string(),
            ));
        }
        if path == ":memory:" {
            return Ok(DatabaseLocation::Memory);
        }
        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }

    pub fn display(&self) -> String {
        match self {
            DatabaseLocation::Memory => ":memory:".to_string(),
            DatabaseLocation::File(path) => path.display().to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = read("DATABASE_URL").ok_or_else(|| {
            AppError::Configuration("DATABASE_URL environment variable is not set".to_string())
        })?;
        let database = DatabaseLocation::parse(&database_url)?;

        let analysis_mode = match read("ANALYSIS_MODE").map(|mode| mode.to_lowercase()) {
            None => AnalysisMode::Rules,
            Some(mode) if mode == "rules" => AnalysisMode::Rules,
            Some(mode) if mode == "llm" => AnalysisMode::Llm,
            Some(other) => {
                tracing::warn!(mode = %other, "unknown ANALYSIS_MODE, using rules");
                AnalysisMode::Rules
            }
        };

        Ok(Self {
            database,
            analysis_mode,
            gemini_api_key: read("GEMINI_API_KEY"),
            gemini_model: read("GEMINI_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            bind_address: read("TRIAGE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
        })
    }

    /// Mode actually used for analysis. LLM mode needs an API key.
    pub fn effective_mode(&self) -> AnalysisMode {
        match (self.analysis_mode, &self.gemini_api_key) {
            (AnalysisMode::Llm, Some(_)) => AnalysisMode::Llm,
            _ => AnalysisMode::Rules,
        }
    }
}
