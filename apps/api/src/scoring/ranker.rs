//! Ranker — scores a whole batch and orders it.

use serde::Serialize;
use tracing::debug;

use crate::profile::Profile;
use crate::scoring::engine::{PreparedJob, ProfileScorer, ScoredProfile};
use crate::scoring::job_spec::JobSpec;

#[derive(Debug, Clone, Serialize)]
pub struct RankResult {
    /// Number of input profiles.
    pub total: usize,
    /// Prefix of `all`, at most `top_n` long.
    pub top: Vec<ScoredProfile>,
    /// Every profile, descending by score; ties keep input order.
    pub all: Vec<ScoredProfile>,
}

/// Scores each profile independently, then sorts descending by score.
///
/// The sort is stable, so equal scorers keep their relative input order.
/// `top_n == 0` yields an empty `top` with a fully populated `all`.
pub fn rank(
    scorer: &dyn ProfileScorer,
    profiles: &[Profile],
    job: &JobSpec,
    top_n: usize,
) -> RankResult {
    let prepared = PreparedJob::new(job);

    let mut all: Vec<ScoredProfile> = profiles
        .iter()
        .map(|profile| scorer.score(profile, &prepared))
        .collect();
    all.sort_by(|a, b| b.score.cmp(&a.score));

    let top = all.iter().take(top_n).cloned().collect();

    debug!(
        backend = scorer.backend(),
        total = profiles.len(),
        top_n,
        best = all.first().map(|s| s.score),
        "Ranked profile batch"
    );

    RankResult {
        total: profiles.len(),
        top,
        all,
    }
}
