//! Google Sheets v4 client authenticated as a service account.
//!
//! Access tokens come from the OAuth2 JWT bearer grant: a self-signed RS256
//! assertion is exchanged at the token endpoint and the result is cached
//! until shortly before it expires.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::{AppendOutcome, ClearOutcome, LinkSheet, SheetsError};
use crate::config::SheetsConfig;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the cached token expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<UpdateSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSummary {
    updated_range: Option<String>,
    updated_rows: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearResponse {
    cleared_range: Option<String>,
}

pub struct GoogleSheetsClient {
    client: Client,
    config: SheetsConfig,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, config: SheetsConfig) -> Self {
        Self {
            client,
            config,
            token: Mutex::new(None),
        }
    }

    /// Returns a cached access token or mints a new one.
    ///
    /// The lock is held across the exchange so concurrent callers share one
    /// token request.
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cache = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + TOKEN_REFRESH_MARGIN_SECS {
                return Ok(cached.access_token.clone());
            }
        }

        let claims = Claims {
            iss: &self.config.service_account_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];
        let token: TokenResponse = send_json(self.client.post(TOKEN_URL).form(&params)).await?;

        debug!(expires_in = token.expires_in, "Obtained Google access token");

        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(token.access_token)
    }

    /// `.../spreadsheets/{id}/values/{range}[:{action}]`, with the range
    /// percent-encoded as one path segment.
    fn values_url(&self, action: Option<&str>) -> Result<Url, SheetsError> {
        let range = self.config.range.as_str();
        let segment = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };

        let mut url =
            Url::parse(SHEETS_API_URL).map_err(|e| SheetsError::InvalidRange(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidRange(range.to_string()))?
            .extend([
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                segment.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl LinkSheet for GoogleSheetsClient {
    async fn read_links(&self) -> Result<Vec<String>, SheetsError> {
        let token = self.access_token().await?;
        let url = self.values_url(None)?;
        let range: ValueRange = send_json(self.client.get(url).bearer_auth(token)).await?;
        Ok(first_column(&range))
    }

    async fn append_links(&self, links: &[String]) -> Result<AppendOutcome, SheetsError> {
        let token = self.access_token().await?;
        let url = self.values_url(Some("append"))?;
        let request = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": as_rows(links) }));

        let response: AppendResponse = send_json(request).await?;
        let updates = response.updates.unwrap_or_default();
        Ok(AppendOutcome {
            updated_range: updates.updated_range,
            updated_rows: updates.updated_rows.unwrap_or(links.len()),
        })
    }

    async fn clear(&self) -> Result<ClearOutcome, SheetsError> {
        let token = self.access_token().await?;
        let url = self.values_url(Some("clear"))?;
        let response: ClearResponse =
            send_json(self.client.post(url).bearer_auth(token).json(&json!({}))).await?;
        Ok(ClearOutcome {
            cleared_range: response.cleared_range,
        })
    }

    async fn write_links(&self, links: &[String]) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = self.values_url(None)?;
        let request = self
            .client
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": as_rows(links) }));
        let _: Value = send_json(request).await?;
        Ok(())
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SheetsError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

fn as_rows(links: &[String]) -> Vec<[&str; 1]> {
    links.iter().map(|l| [l.as_str()]).collect()
}

fn first_column(range: &ValueRange) -> Vec<String> {
    range
        .values
        .iter()
        .filter_map(|row| match row.first()? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(range: &str) -> GoogleSheetsClient {
        GoogleSheetsClient::new(
            Client::new(),
            SheetsConfig {
                service_account_email: "svc@project.iam.gserviceaccount.com".to_string(),
                private_key: "not a pem".to_string(),
                spreadsheet_id: "sheet-123".to_string(),
                range: range.to_string(),
            },
        )
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = client("Links!A:A").values_url(Some("append")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Links!A:A:append"
        );

        let url = client("My Sheet!A:A").values_url(None).unwrap();
        assert!(url.as_str().ends_with("/values/My%20Sheet!A:A"));
    }

    #[test]
    fn test_first_column_trims_and_skips_blanks() {
        let range: ValueRange = serde_json::from_value(json!({
            "range": "A1:A4",
            "values": [[" https://a "], [], [""], ["https://b", "ignored"], [42]]
        }))
        .unwrap();
        assert_eq!(first_column(&range), vec!["https://a", "https://b", "42"]);
    }

    #[test]
    fn test_missing_values_is_empty() {
        let range: ValueRange = serde_json::from_value(json!({ "range": "A1:A1" })).unwrap();
        assert!(first_column(&range).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_private_key_fails_before_any_request() {
        let result = client("A:A").access_token().await;
        assert!(matches!(result, Err(SheetsError::Credentials(_))));
    }
}
