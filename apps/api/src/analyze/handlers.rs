//! Axum route handlers for ranking and the scraping-run lifecycle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::analyze::source::{explicit_source, PayloadSource};
use crate::errors::AppError;
use crate::phantom::{LaunchOptions, PhantomClient, RunState, RunStatus};
use crate::profile::extract::extract;
use crate::profile::input::records_from_json;
use crate::profile::Profile;
use crate::scoring::engine::{PreparedJob, ScoredProfile};
use crate::scoring::job_spec::JobSpec;
use crate::scoring::ranker::rank;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RankRequest {
    /// Kept raw so a non-object job answers with the JSON error envelope.
    #[serde(default)]
    pub job: Option<Value>,
    #[serde(default)]
    pub rows: Option<Value>,
    #[serde(default, alias = "csvBase64")]
    pub csv_base64: Option<String>,
    #[serde(default, alias = "csvUrl")]
    pub csv_url: Option<String>,
    #[serde(default, alias = "phantomRunId")]
    pub phantom_run_id: Option<String>,
    /// Falls back to `DEFAULT_TOP_N`; non-positive values give an empty `top`.
    #[serde(default, alias = "topN")]
    pub top_n: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub job: Option<Value>,
    /// One row object, decoded with the same rules as a batch row.
    #[serde(default)]
    pub profile: Option<Value>,
}

/// 202 body while a scraping run has not produced its result file.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub status: RunState,
    pub run_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ScraperRunResponse {
    pub ok: bool,
    pub run: RunStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze/rank
///
/// Resolves the batch (rows > csv_base64 > csv_url > finished run > local
/// file), extracts every profile and returns the ranked result.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Response, AppError> {
    let job = job_from(request.job.as_ref())?;

    let source = match explicit_source(
        request.rows.as_ref(),
        request.csv_base64.as_deref(),
        request.csv_url.as_deref(),
    ) {
        Some(source) => source,
        None => match non_blank(request.phantom_run_id.as_deref()) {
            Some(run_id) => {
                let run = configured_phantom(&state)?.status(run_id).await?;
                match run_payload(run)? {
                    RunPayload::Ready(url) => PayloadSource::CsvUrl(url),
                    RunPayload::Pending(pending) => {
                        return Ok((StatusCode::ACCEPTED, Json(pending)).into_response());
                    }
                }
            }
            None => PayloadSource::LocalFile(state.config.local_results_csv.clone()),
        },
    };

    let records = source.load(&state.http).await?;
    let profiles: Vec<Profile> = records.iter().map(extract).collect();

    let top_n = match request.top_n {
        Some(n) => usize::try_from(n.max(0)).unwrap_or(usize::MAX),
        None => state.config.default_top_n,
    };

    let result = rank(state.scorer.as_ref(), &profiles, &job, top_n);

    info!(
        source = source.kind(),
        total = result.total,
        top_n,
        best = result.all.first().map(|s| s.score),
        "Ranked candidate batch"
    );

    Ok(Json(result).into_response())
}

/// POST /analyze/score
///
/// Scores a single row against a job, returning the profile with its reasons.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoredProfile>, AppError> {
    let job = job_from(request.job.as_ref())?;
    let Some(row) = request.profile else {
        return Err(AppError::Validation("profile is required".to_string()));
    };

    let records = records_from_json(&Value::Array(vec![row]))?;
    let profile = records.first().map(extract).unwrap_or_default();

    let scored = state.scorer.score(&profile, &PreparedJob::new(&job));
    Ok(Json(scored))
}

/// POST /analyze/phantom/launch
pub async fn handle_launch(
    State(state): State<AppState>,
    Json(options): Json<LaunchOptions>,
) -> Result<Json<RunStatus>, AppError> {
    let has_sheet = non_blank(options.sheet_url.as_deref()).is_some();
    if has_sheet && !options.profile_urls.is_empty() {
        return Err(AppError::Validation(
            "send either sheet_url or profile_urls, not both".to_string(),
        ));
    }

    let run = configured_phantom(&state)?.launch(&options).await?;
    Ok(Json(run))
}

/// GET /analyze/phantom/status/:run_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatus>, AppError> {
    let run_id = non_blank(Some(run_id.as_str()))
        .ok_or_else(|| AppError::Validation("run_id cannot be empty".to_string()))?;

    let run = configured_phantom(&state)?.status(run_id).await?;
    Ok(Json(run))
}

/// POST /scraper/run
///
/// Launches the agent against its configured spreadsheet.
pub async fn handle_scraper_run(
    State(state): State<AppState>,
) -> Result<Json<ScraperRunResponse>, AppError> {
    let run = configured_phantom(&state)?
        .launch(&LaunchOptions::default())
        .await?;
    Ok(Json(ScraperRunResponse { ok: true, run }))
}

/// What a polled run contributes to a ranking request.
#[derive(Debug)]
enum RunPayload {
    Ready(String),
    Pending(PendingResponse),
}

/// A finished run yields its result URL. Any run that is not finished,
/// including a failed one, is reported back as pending with its state.
fn run_payload(run: RunStatus) -> Result<RunPayload, AppError> {
    match (run.status, run.csv_url) {
        (RunState::Finished, Some(url)) => Ok(RunPayload::Ready(url)),
        (RunState::Finished, None) => Err(AppError::Upstream(format!(
            "run {} finished without a result file",
            run.run_id
        ))),
        (status, _) => {
            let message = match status {
                RunState::Error => {
                    "Scraping run failed, launch a new run or send the CSV directly"
                }
                _ => "Scraping run still in progress, try again shortly",
            };
            Ok(RunPayload::Pending(PendingResponse {
                status,
                run_id: run.run_id,
                message: message.to_string(),
            }))
        }
    }
}

fn job_from(raw: Option<&Value>) -> Result<JobSpec, AppError> {
    match raw {
        None | Some(Value::Null) => Err(AppError::Validation("job is required".to_string())),
        Some(value) if value.is_object() => JobSpec::deserialize(value)
            .map_err(|e| AppError::Validation(format!("job could not be read: {e}"))),
        Some(_) => Err(AppError::Validation("job must be an object".to_string())),
    }
}

fn configured_phantom(state: &AppState) -> Result<&PhantomClient, AppError> {
    state
        .phantom
        .as_ref()
        .ok_or(AppError::NotConfigured("PhantomBuster"))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(status: RunState, csv_url: Option<&str>) -> RunStatus {
        RunStatus {
            run_id: "c-7".to_string(),
            status,
            csv_url: csv_url.map(str::to_string),
        }
    }

    #[test]
    fn test_finished_run_yields_result_url() {
        let payload = run_payload(run(RunState::Finished, Some("https://x/result.csv"))).unwrap();
        assert!(matches!(payload, RunPayload::Ready(url) if url == "https://x/result.csv"));
    }

    #[test]
    fn test_running_run_is_pending() {
        let payload = run_payload(run(RunState::Running, None)).unwrap();
        let RunPayload::Pending(pending) = payload else {
            panic!("expected pending");
        };
        assert_eq!(pending.status, RunState::Running);
        assert_eq!(pending.run_id, "c-7");
    }

    #[test]
    fn test_failed_run_is_reported_as_not_finished() {
        let payload = run_payload(run(RunState::Error, None)).unwrap();
        let RunPayload::Pending(pending) = payload else {
            panic!("expected pending");
        };
        let body = serde_json::to_value(&pending).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("failed"));
    }

    #[test]
    fn test_finished_run_without_file_is_upstream_error() {
        let result = run_payload(run(RunState::Finished, None));
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[test]
    fn test_job_must_be_an_object() {
        assert!(matches!(job_from(None), Err(AppError::Validation(_))));
        assert!(matches!(job_from(Some(&Value::Null)), Err(AppError::Validation(_))));
        assert!(matches!(
            job_from(Some(&json!("python"))),
            Err(AppError::Validation(_))
        ));

        let job = job_from(Some(&json!({ "required_skills": ["python", 3] }))).unwrap();
        assert_eq!(job.required_skills, vec!["python", "3"]);
    }
}
