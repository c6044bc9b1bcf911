use std::sync::Arc;

use crate::config::Config;
use crate::phantom::PhantomClient;
use crate::scoring::engine::ProfileScorer;
use crate::sheets::LinkSheet;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Shared HTTP client for remote CSV downloads and the collaborators.
    pub http: reqwest::Client,
    /// `None` when PhantomBuster credentials are not configured.
    pub phantom: Option<PhantomClient>,
    /// `None` when the Google service account is not configured.
    pub sheets: Option<Arc<dyn LinkSheet>>,
    /// Pluggable scorer. Default: WeightedScorer with the configured weights.
    pub scorer: Arc<dyn ProfileScorer>,
}
