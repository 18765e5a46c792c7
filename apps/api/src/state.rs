use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::matching::policy::ScoringPolicy;
use crate::nlp_client::QueryParser;
use crate::store::TalentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TalentStore>,
    /// Free-text query parser. Default: `NlpClient` against `NLP_SERVICE_URL`.
    pub parser: Arc<dyn QueryParser>,
    pub config: Config,
    pub policy: Arc<ScoringPolicy>,
}

impl AppState {
    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.config.nlp_timeout_secs)
    }
}
