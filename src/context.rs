use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::TriageStore;
use crate::workflow::analysis::AnalysisPipeline;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn TriageStore>,
    pub pipeline: AnalysisPipeline,
}

impl AppContext {
    pub fn new(config: AppConfig, store: Arc<dyn TriageStore>, pipeline: AnalysisPipeline) -> Self {
        Self {
            config,
            store,
            pipeline,
        }
    }
}
