//! Spreadsheet link store: the single-column list of profile URLs the
//! scraping agent reads its input from.

pub mod google;
pub mod handlers;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_WINDOW_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("service account credentials rejected: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    #[error("invalid spreadsheet range: {0}")]
    InvalidRange(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppendOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    pub updated_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClearOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_range: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimOutcome {
    /// Number of links submitted by the caller.
    pub updated: usize,
    /// Number of links left in the sheet.
    pub kept: usize,
}

/// First column of one configured range, one link per row.
#[async_trait]
pub trait LinkSheet: Send + Sync {
    /// Trimmed, non-empty values of the first column, top to bottom.
    async fn read_links(&self) -> Result<Vec<String>, SheetsError>;

    /// Appends one row per link below the existing data.
    async fn append_links(&self, links: &[String]) -> Result<AppendOutcome, SheetsError>;

    async fn clear(&self) -> Result<ClearOutcome, SheetsError>;

    /// Writes `links` from the top of the range. Callers clear first.
    async fn write_links(&self, links: &[String]) -> Result<(), SheetsError>;
}

/// Merges existing and new links into a FIFO window.
///
/// Values are trimmed, blanks dropped, duplicates removed keeping the first
/// occurrence, and only the last `window` entries survive.
pub fn merge_window(current: &[String], new: &[String], window: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(current.len() + new.len());
    for link in current.iter().chain(new) {
        let link = link.trim();
        if !link.is_empty() && !merged.iter().any(|m| m == link) {
            merged.push(link.to_string());
        }
    }
    let skip = merged.len().saturating_sub(window);
    merged.split_off(skip)
}

/// Appends `new` links and trims the sheet down to the last `window` links.
pub async fn append_and_trim(
    sheet: &dyn LinkSheet,
    new: &[String],
    window: usize,
) -> Result<TrimOutcome, SheetsError> {
    if new.is_empty() {
        return Ok(TrimOutcome {
            updated: 0,
            kept: 0,
        });
    }

    let current = sheet.read_links().await?;
    let kept = merge_window(&current, new, window);

    sheet.clear().await?;
    if !kept.is_empty() {
        if let Err(e) = sheet.write_links(&kept).await {
            warn!(
                lost = kept.len(),
                "Sheet was cleared but rewriting the link window failed: {e}"
            );
            return Err(e);
        }
    }

    info!(
        existing = current.len(),
        added = new.len(),
        kept = kept.len(),
        window,
        "Trimmed spreadsheet link window"
    );

    Ok(TrimOutcome {
        updated: new.len(),
        kept: kept.len(),
    })
}

#[cfg(test)]
pub use memory::MemorySheet;
