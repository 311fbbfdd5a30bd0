pub mod analysis;
pub mod classifier;
pub mod llm_classifier;
