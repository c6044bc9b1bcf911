pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analyze::handlers as analyze;
use crate::errors::AppError;
use crate::sheets::handlers as sheets;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking
        .route("/analyze/rank", post(analyze::handle_rank))
        .route("/analyze/score", post(analyze::handle_score))
        .route("/analyze/phantom/launch", post(analyze::handle_launch))
        .route(
            "/analyze/phantom/status/:run_id",
            get(analyze::handle_status),
        )
        .route("/scraper/run", post(analyze::handle_scraper_run))
        // Spreadsheet link store
        .route("/sheets/ping", get(sheets::handle_ping))
        .route("/sheets/append-links", post(sheets::handle_append_links))
        .route("/sheets/clear", post(sheets::handle_clear))
        .route("/sheets/append-trim", post(sheets::handle_append_trim))
        .fallback(not_found)
        .with_state(state)
}
