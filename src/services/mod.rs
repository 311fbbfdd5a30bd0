pub mod language_model;
pub mod storage;

pub use language_model::LanguageModelService;
pub use storage::{AnalysisStore, TicketStore, TriageStore, blocking};
