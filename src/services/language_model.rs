use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Sends one prompt and returns the model's raw text reply.
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}
