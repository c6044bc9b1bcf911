use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::scoring::weights::ScoringWeights;

/// Application configuration loaded from environment variables.
///
/// Only the HTTP surface is mandatory. The scraping and spreadsheet
/// collaborators are enabled when their credentials are present; routes that
/// need a missing collaborator answer 503.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// CSV used by `/analyze/rank` when the request names no payload source.
    pub local_results_csv: PathBuf,
    pub default_top_n: usize,
    pub scoring_weights: ScoringWeights,
    pub phantom: Option<PhantomConfig>,
    pub sheets: Option<SheetsConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhantomMode {
    /// Profile visitor: only needs the input list.
    Visitor,
    /// Profile scraper: also needs a session cookie and user agent.
    Scraper,
}

impl FromStr for PhantomMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "visitor" => Ok(PhantomMode::Visitor),
            "scraper" => Ok(PhantomMode::Scraper),
            other => bail!("PHANTOMBUSTER_MODE '{other}' is invalid (use visitor|scraper)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhantomConfig {
    pub api_key: String,
    pub agent_id: String,
    pub mode: PhantomMode,
    /// Spreadsheet the agent reads when a launch names no input.
    pub sheet_url: Option<String>,
    pub session_cookie: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub service_account_email: String,
    /// PEM private key, with literal `\n` sequences already expanded.
    pub private_key: String,
    pub spreadsheet_id: String,
    pub range: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let phantom = match (get("PHANTOMBUSTER_API_KEY"), get("PHANTOMBUSTER_AGENT_ID")) {
            (Some(api_key), Some(agent_id)) => Some(PhantomConfig {
                api_key,
                agent_id,
                mode: get("PHANTOMBUSTER_MODE")
                    .as_deref()
                    .unwrap_or("visitor")
                    .parse()?,
                sheet_url: get("PHANTOMBUSTER_SHEET_URL"),
                session_cookie: get("PHANTOMBUSTER_SESSION_COOKIE"),
                user_agent: get("PHANTOMBUSTER_USER_AGENT"),
            }),
            _ => None,
        };

        let sheets = match (
            get("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            get("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY"),
            get("GOOGLE_SHEETS_ID"),
        ) {
            (Some(service_account_email), Some(private_key), Some(spreadsheet_id)) => {
                Some(SheetsConfig {
                    service_account_email,
                    private_key: private_key.replace("\\n", "\n"),
                    spreadsheet_id,
                    range: get("GOOGLE_SHEETS_RANGE").unwrap_or_else(|| "A:A".to_string()),
                })
            }
            _ => None,
        };

        let defaults = ScoringWeights::default();
        let weight = |key: &str, default: f64| -> Result<f64> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("{key} must be a number")),
                None => Ok(default),
            }
        };
        let scoring_weights = ScoringWeights {
            education: weight("SCORING_WEIGHT_EDUCATION", defaults.education)?,
            required_skills: weight("SCORING_WEIGHT_REQUIRED", defaults.required_skills)?,
            desired_skills: weight("SCORING_WEIGHT_DESIRED", defaults.desired_skills)?,
            experience: weight("SCORING_WEIGHT_EXPERIENCE", defaults.experience)?,
            role_bonus: weight("SCORING_ROLE_BONUS", defaults.role_bonus)?,
            bonus_term_points: weight("SCORING_BONUS_TERM_POINTS", defaults.bonus_term_points)?,
            bonus_terms_cap: weight("SCORING_BONUS_TERMS_CAP", defaults.bonus_terms_cap)?,
        };

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            local_results_csv: PathBuf::from(
                get("LOCAL_RESULTS_CSV").unwrap_or_else(|| "./data/result.csv".to_string()),
            ),
            default_top_n: get("DEFAULT_TOP_N")
                .unwrap_or_else(|| "5".to_string())
                .parse::<usize>()
                .context("DEFAULT_TOP_N must be a non-negative integer")?,
            scoring_weights,
            phantom,
            sheets,
        })
    }
}
