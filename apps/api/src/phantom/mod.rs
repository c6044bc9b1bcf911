//! PhantomBuster client — launches the profile scraping agent and polls its runs.
//!
//! The ranking core never observes run state. A finished run only contributes
//! the URL of its result CSV, which `/analyze/rank` downloads and scores.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{PhantomConfig, PhantomMode};

const PHANTOMBUSTER_API_URL: &str = "https://api.phantombuster.com/api/v2";
const API_KEY_HEADER: &str = "X-Phantombuster-Key-1";
const DEFAULT_PROFILES_PER_LAUNCH: u32 = 10;

#[derive(Debug, Error)]
pub enum PhantomError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PhantomBuster API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("scraper mode needs PHANTOMBUSTER_SESSION_COOKIE and PHANTOMBUSTER_USER_AGENT")]
    MissingScraperSession,
}

/// Three-state view of a scraping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Finished,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatus {
    pub run_id: String,
    pub status: RunState,
    /// Result CSV location; only present once the run is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_url: Option<String>,
}

/// Input for one launch: either explicit profile URLs or a spreadsheet URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LaunchOptions {
    #[serde(default, alias = "sheetUrl")]
    pub sheet_url: Option<String>,
    #[serde(default, alias = "profileUrls")]
    pub profile_urls: Vec<String>,
    #[serde(default, alias = "numberOfProfilesPerLaunch")]
    pub number_of_profiles_per_launch: Option<u32>,
}

#[derive(Clone)]
pub struct PhantomClient {
    client: Client,
    config: PhantomConfig,
}

impl PhantomClient {
    pub fn new(client: Client, config: PhantomConfig) -> Self {
        Self { client, config }
    }

    /// Launches the configured agent. The returned status is always `running`.
    pub async fn launch(&self, options: &LaunchOptions) -> Result<RunStatus, PhantomError> {
        let argument = build_argument(&self.config, options)?;
        let body = json!({ "id": self.config.agent_id, "argument": argument });

        let response = self
            .client
            .post(format!("{PHANTOMBUSTER_API_URL}/agents/launch"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let launched = read_json(response).await?;

        let run_id = match extract_run_id(&launched) {
            Some(id) => id,
            None => self
                .last_launch_id()
                .await
                .unwrap_or_else(|| "unknown".to_string()),
        };

        info!(run_id = %run_id, mode = ?self.config.mode, "Launched PhantomBuster agent");

        Ok(RunStatus {
            run_id,
            status: RunState::Running,
            csv_url: None,
        })
    }

    /// Polls one run.
    pub async fn status(&self, run_id: &str) -> Result<RunStatus, PhantomError> {
        let fetched = self.get_json("/containers/fetch", run_id).await?;
        let status = interpret_status(run_id, &fetched);
        debug!(run_id, status = ?status.status, "Fetched PhantomBuster run status");
        Ok(status)
    }

    /// Some launch responses omit the container id; the agent record has it.
    async fn last_launch_id(&self) -> Option<String> {
        match self.get_json("/agents/fetch", &self.config.agent_id).await {
            Ok(agent) => first_id(
                &agent,
                &[
                    "/data/lastLaunch/containerId",
                    "/data/lastLaunchContainerId",
                    "/data/lastRun/id",
                ],
            ),
            Err(e) => {
                warn!("Could not fetch agent after launch: {e}");
                None
            }
        }
    }

    async fn get_json(&self, path: &str, id: &str) -> Result<Value, PhantomError> {
        let response = self
            .client
            .get(format!("{PHANTOMBUSTER_API_URL}{path}"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(&[("id", id)])
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value, PhantomError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(PhantomError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

/// Builds the agent `argument` object for the configured mode.
///
/// Explicit profile URLs win over a spreadsheet; the request's spreadsheet
/// wins over the configured default.
pub fn build_argument(
    config: &PhantomConfig,
    options: &LaunchOptions,
) -> Result<Value, PhantomError> {
    let mut argument = Map::new();

    match config.mode {
        PhantomMode::Visitor => {
            argument.insert("onlyGetFirstResult".into(), Value::Bool(false));
        }
        PhantomMode::Scraper => {
            let (Some(cookie), Some(user_agent)) = (&config.session_cookie, &config.user_agent)
            else {
                return Err(PhantomError::MissingScraperSession);
            };
            argument.insert("sessionCookie".into(), json!(cookie));
            argument.insert("userAgent".into(), json!(user_agent));
            argument.insert(
                "numberOfProfilesPerLaunch".into(),
                json!(options
                    .number_of_profiles_per_launch
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_PROFILES_PER_LAUNCH)),
            );
        }
    }

    let profile_urls: Vec<&str> = options
        .profile_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();

    if !profile_urls.is_empty() {
        argument.insert("profileUrls".into(), json!(profile_urls));
    } else if let Some(sheet) = options
        .sheet_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(config.sheet_url.as_deref())
    {
        argument.insert("spreadsheetUrl".into(), json!(sheet));
    }

    Ok(Value::Object(argument))
}

/// Finds the run id across the response shapes the launch endpoint has used.
pub fn extract_run_id(body: &Value) -> Option<String> {
    first_id(
        body,
        &["/data/id", "/data/containerId", "/containerId", "/container/id", "/id"],
    )
}

/// Maps a container fetch response onto the three-state run status.
pub fn interpret_status(run_id: &str, body: &Value) -> RunStatus {
    let raw = first_str(body, &["/data/status", "/status"]).unwrap_or("unknown");

    let (status, csv_url) = match raw {
        "done" | "finished" => (
            RunState::Finished,
            first_str(
                body,
                &[
                    "/data/output/fileUrl",
                    "/data/output/outputFileUrl",
                    "/output/fileUrl",
                    "/output/outputFileUrl",
                ],
            )
            .map(str::to_string),
        ),
        "error" => (RunState::Error, None),
        _ => (RunState::Running, None),
    };

    RunStatus {
        run_id: run_id.to_string(),
        status,
        csv_url,
    }
}

fn first_str<'a>(body: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .filter_map(|p| body.pointer(p)?.as_str())
        .find(|s| !s.trim().is_empty())
}

fn first_id(body: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| match body.pointer(p)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
