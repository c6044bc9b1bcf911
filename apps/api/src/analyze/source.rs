//! Payload sources for a ranking request and how each becomes raw records.

use std::path::PathBuf;

use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::profile::input::{records_from_base64, records_from_csv, records_from_json};
use crate::profile::RawRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSource<'a> {
    /// Inline JSON array of row objects.
    Rows(&'a Value),
    CsvBase64(&'a str),
    /// Remote CSV: explicit or the result file of a finished scraping run.
    CsvUrl(String),
    LocalFile(PathBuf),
}

impl PayloadSource<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadSource::Rows(_) => "rows",
            PayloadSource::CsvBase64(_) => "csv_base64",
            PayloadSource::CsvUrl(_) => "csv_url",
            PayloadSource::LocalFile(_) => "local_file",
        }
    }

    /// Loads the whole batch. A decoding problem anywhere rejects the batch.
    pub async fn load(&self, http: &Client) -> Result<Vec<RawRecord>, AppError> {
        let records = match self {
            PayloadSource::Rows(rows) => records_from_json(rows)?,
            PayloadSource::CsvBase64(encoded) => records_from_base64(encoded)?,
            PayloadSource::CsvUrl(url) => {
                let bytes = http
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                records_from_csv(&bytes)?
            }
            PayloadSource::LocalFile(path) => {
                if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                    return Err(AppError::Validation(format!(
                        "local results CSV not found at {}; send rows, csv_base64 or csv_url, \
                         or set LOCAL_RESULTS_CSV",
                        path.display()
                    )));
                }
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                records_from_csv(&bytes)?
            }
        };

        debug!(source = self.kind(), records = records.len(), "Loaded profile batch");
        Ok(records)
    }
}

/// Picks the first inline or remote source the request carries.
///
/// Precedence is `rows`, then `csv_base64`, then `csv_url`. `None` means the
/// caller falls back to a scraping run or the local file. Blank strings and
/// JSON `null` count as absent.
pub fn explicit_source<'a>(
    rows: Option<&'a Value>,
    csv_base64: Option<&'a str>,
    csv_url: Option<&'a str>,
) -> Option<PayloadSource<'a>> {
    let present = |s: Option<&'a str>| s.map(str::trim).filter(|s| !s.is_empty());

    if let Some(rows) = rows.filter(|r| !r.is_null()) {
        return Some(PayloadSource::Rows(rows));
    }
    if let Some(encoded) = present(csv_base64) {
        return Some(PayloadSource::CsvBase64(encoded));
    }
    present(csv_url).map(|url| PayloadSource::CsvUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_rows_win_over_everything() {
        let rows = json!([{ "name": "Ana" }]);
        let source = explicit_source(Some(&rows), Some("YQ=="), Some("https://x/y.csv"));
        assert_eq!(source, Some(PayloadSource::Rows(&rows)));
    }

    #[test]
    fn test_base64_wins_over_url() {
        let source = explicit_source(None, Some("YQ=="), Some("https://x/y.csv"));
        assert_eq!(source, Some(PayloadSource::CsvBase64("YQ==")));
    }

    #[test]
    fn test_blank_and_null_are_absent() {
        let null = Value::Null;
        let source = explicit_source(Some(&null), Some("  "), Some("https://x/y.csv"));
        assert_eq!(source, Some(PayloadSource::CsvUrl("https://x/y.csv".to_string())));
        assert_eq!(explicit_source(None, None, Some("")), None);
    }

    #[tokio::test]
    async fn test_local_file_loads_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,skills").unwrap();
        writeln!(file, "Ana,python").unwrap();

        let source = PayloadSource::LocalFile(file.path().to_path_buf());
        let records = source.load(&Client::new()).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_local_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = PayloadSource::LocalFile(dir.path().join("absent.csv"));
        let result = source.load(&Client::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_nested_rows_reject_batch() {
        let rows = json!([{ "name": "Ana", "skills": ["python"] }]);
        let result = PayloadSource::Rows(&rows).load(&Client::new()).await;
        assert!(matches!(result, Err(AppError::MalformedBatch(_))));
    }
}
