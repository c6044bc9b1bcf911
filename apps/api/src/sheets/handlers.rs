//! Axum route handlers for the spreadsheet link store.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::sheets::{
    append_and_trim, AppendOutcome, ClearOutcome, LinkSheet, TrimOutcome, DEFAULT_WINDOW_SIZE,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LinksRequest {
    #[serde(default)]
    pub links: Vec<String>,
    /// Only read by append-trim. Absent or non-positive means the default window.
    #[serde(default, alias = "windowSize")]
    pub window_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SheetsResponse<T> {
    pub ok: bool,
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub configured: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /sheets/ping
pub async fn handle_ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        configured: state.sheets.is_some(),
    })
}

/// POST /sheets/append-links
pub async fn handle_append_links(
    State(state): State<AppState>,
    Json(request): Json<LinksRequest>,
) -> Result<Json<SheetsResponse<AppendOutcome>>, AppError> {
    require_links(&request.links)?;
    let sheet = configured_sheet(&state)?;

    let result = sheet.append_links(&request.links).await?;
    Ok(Json(SheetsResponse { ok: true, result }))
}

/// POST /sheets/clear
pub async fn handle_clear(
    State(state): State<AppState>,
) -> Result<Json<SheetsResponse<ClearOutcome>>, AppError> {
    let sheet = configured_sheet(&state)?;

    let result = sheet.clear().await?;
    Ok(Json(SheetsResponse { ok: true, result }))
}

/// POST /sheets/append-trim
///
/// Appends the links and keeps only the most recent `window_size` entries.
pub async fn handle_append_trim(
    State(state): State<AppState>,
    Json(request): Json<LinksRequest>,
) -> Result<Json<SheetsResponse<TrimOutcome>>, AppError> {
    require_links(&request.links)?;
    let sheet = configured_sheet(&state)?;

    let window = request
        .window_size
        .filter(|w| *w > 0)
        .map(|w| usize::try_from(w).unwrap_or(usize::MAX))
        .unwrap_or(DEFAULT_WINDOW_SIZE);

    let result = append_and_trim(sheet.as_ref(), &request.links, window).await?;
    Ok(Json(SheetsResponse { ok: true, result }))
}

fn configured_sheet(state: &AppState) -> Result<Arc<dyn LinkSheet>, AppError> {
    state
        .sheets
        .clone()
        .ok_or(AppError::NotConfigured("Google Sheets"))
}

fn require_links(links: &[String]) -> Result<(), AppError> {
    if links.is_empty() {
        return Err(AppError::Validation(
            "links must be a non-empty array".to_string(),
        ));
    }
    Ok(())
}
