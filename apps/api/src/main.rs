mod analyze;
mod config;
mod errors;
mod phantom;
mod profile;
mod routes;
mod scoring;
mod sheets;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::phantom::PhantomClient;
use crate::routes::build_router;
use crate::scoring::engine::WeightedScorer;
use crate::sheets::google::GoogleSheetsClient;
use crate::sheets::LinkSheet;
use crate::state::AppState;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlist API v{}", env!("CARGO_PKG_VERSION"));

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let phantom = match &config.phantom {
        Some(phantom_config) => {
            info!(
                "PhantomBuster client initialized (agent: {}, mode: {:?})",
                phantom_config.agent_id, phantom_config.mode
            );
            Some(PhantomClient::new(http.clone(), phantom_config.clone()))
        }
        None => {
            warn!("PHANTOMBUSTER_API_KEY / PHANTOMBUSTER_AGENT_ID not set; scraping routes disabled");
            None
        }
    };

    let sheets: Option<Arc<dyn LinkSheet>> = match &config.sheets {
        Some(sheets_config) => {
            info!(
                "Google Sheets client initialized (range: {})",
                sheets_config.range
            );
            Some(Arc::new(GoogleSheetsClient::new(
                http.clone(),
                sheets_config.clone(),
            )))
        }
        None => {
            warn!("Google service account not configured; /sheets routes disabled");
            None
        }
    };

    let weights = config.scoring_weights;
    info!(
        "Scoring weights: education {} / required {} / desired {} / experience {} (sum {})",
        weights.education,
        weights.required_skills,
        weights.desired_skills,
        weights.experience,
        weights.criteria_sum()
    );
    let scorer = Arc::new(WeightedScorer::new(weights));

    let state = AppState {
        config: config.clone(),
        http,
        phantom,
        sheets,
        scorer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
