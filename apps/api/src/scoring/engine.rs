//! Scoring Engine — pluggable, trait-based scorer that measures a profile against a job spec.
//!
//! Default: `WeightedScorer` (pure-Rust, deterministic, fully testable).
//!
//! `AppState` holds an `Arc<dyn ProfileScorer>`, built at startup from the
//! configured `ScoringWeights`.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::profile::education::classify;
use crate::profile::Profile;
use crate::scoring::job_spec::{EducationRequirement, JobSpec};
use crate::scoring::weights::{
    ScoringWeights, DESIRED_NEUTRAL_CREDIT, EDUCATION_BELOW_CREDIT, EDUCATION_EQUAL_CREDIT,
};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// A profile with its score and the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub score: u32, // 0 – 100
    /// Evaluation order: education, required misses, experience, role, bonus terms.
    pub reasons: Vec<String>,
}

/// Per-criterion credit in [0, 1], before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Credits {
    pub education: f64,
    pub required_skills: f64,
    pub desired_skills: f64,
    pub experience: f64,
}

/// Full breakdown of one scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub credits: Credits,
    pub bonus: f64,
    pub score: u32,
    pub reasons: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The profile scorer trait. Implement this to swap scoring backends without
/// touching the ranker or the HTTP handlers.
pub trait ProfileScorer: Send + Sync {
    fn score(&self, profile: &Profile, job: &PreparedJob<'_>) -> ScoredProfile;

    /// Backend label, for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword matching
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive keyword matcher that respects word boundaries.
///
/// A boundary is only asserted on an edge of the keyword that is a word
/// character, so "c++" and ".net" still match while "java" does not match
/// inside "javascript".
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    display: String,
    lowered: String,
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(raw: &str) -> Self {
        let display = raw.trim().to_string();
        let lowered = display.to_lowercase();
        let pattern = if lowered.is_empty() {
            None
        } else {
            RegexBuilder::new(&boundary_pattern(&lowered))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self {
            display,
            lowered,
            pattern,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.display
    }

    pub fn is_match(&self, text: &str) -> bool {
        if self.lowered.is_empty() {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(text),
            // Pattern exceeded the regex size limit; plain containment.
            None => text.to_lowercase().contains(&self.lowered),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn boundary_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 8);
    if keyword.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(keyword));
    if keyword.chars().last().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// A job spec with its keywords compiled once, reused across a whole batch.
#[derive(Debug, Clone)]
pub struct PreparedJob<'a> {
    spec: &'a JobSpec,
    required: Vec<KeywordMatcher>,
    desired: Vec<KeywordMatcher>,
    role: Option<KeywordMatcher>,
    bonus_terms: Vec<KeywordMatcher>,
}

impl<'a> PreparedJob<'a> {
    pub fn new(spec: &'a JobSpec) -> Self {
        let compile = |terms: &[String]| -> Vec<KeywordMatcher> {
            terms.iter().map(|t| KeywordMatcher::new(t)).collect()
        };
        Self {
            spec,
            required: compile(&spec.required_skills),
            desired: compile(&spec.desired_skills),
            role: spec.target_role.as_deref().map(KeywordMatcher::new),
            bonus_terms: compile(&spec.bonus_terms),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Weighted multi-criteria scorer.
///
/// Algorithm:
/// 1. education credit: indifferent → 1; unclassified → 0; below → 0.3; equal → 0.9; above → 1
/// 2. required credit = hits / count (empty list → 1), each miss is a reason
/// 3. desired credit = hits / count (empty list → 0.5)
/// 4. experience credit = min(1, months / (years × 12)) (no minimum → 1)
/// 5. score = round(min(100, Σ credit × points + role bonus + term bonus))
///
/// A job spec that constrains nothing contributes no base points, only bonuses.
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn evaluate(&self, profile: &Profile, job: &PreparedJob<'_>) -> Evaluation {
        let w = &self.weights;
        let text = profile.searchable_text.as_str();
        let mut reasons = Vec::new();

        // 1) Education
        let (education, education_reason) =
            education_credit(job.spec.required_education, &profile.education_text);
        reasons.extend(education_reason);

        // 2) Required skills
        let mut required_hits = 0usize;
        for matcher in &job.required {
            if matcher.is_match(text) {
                required_hits += 1;
            } else {
                reasons.push(format!("missing required: {}", matcher.keyword()));
            }
        }
        let required_skills = coverage(required_hits, job.required.len()).unwrap_or(1.0);

        // 3) Desired skills
        let desired_hits = job.desired.iter().filter(|m| m.is_match(text)).count();
        let desired_skills =
            coverage(desired_hits, job.desired.len()).unwrap_or(DESIRED_NEUTRAL_CREDIT);

        // 4) Experience
        let months = profile.experience_months;
        let min_years = job.spec.min_experience_years;
        let experience = if min_years > 0.0 {
            let min_months = min_years * 12.0;
            let attained = format_months(months);
            let required = format_years(min_years);
            if f64::from(months) >= min_months {
                reasons.push(format!("minimum experience met: {attained} ≥ {required}"));
            } else {
                reasons.push(format!("experience below minimum: {attained} < {required}"));
            }
            (f64::from(months) / min_months).min(1.0)
        } else {
            1.0
        };

        // 5) Role bonus
        let mut bonus = 0.0;
        if let Some(role) = &job.role {
            if role.is_match(text) {
                bonus += w.role_bonus;
                reasons.push(format!("role aligned with profile: {}", role.keyword()));
            }
        }

        // 6) Observation terms
        let mut term_bonus = 0.0;
        for term in job.bonus_terms.iter().filter(|t| t.is_match(text)) {
            term_bonus += w.bonus_term_points;
            reasons.push(format!("bonus term found: {}", term.keyword()));
        }
        bonus += term_bonus.min(w.bonus_terms_cap);

        let credits = Credits {
            education,
            required_skills,
            desired_skills,
            experience,
        };

        let base = if job.spec.is_unconstrained() {
            0.0
        } else {
            credits.education * w.education
                + credits.required_skills * w.required_skills
                + credits.desired_skills * w.desired_skills
                + credits.experience * w.experience
        };

        let score = (base + bonus).clamp(0.0, 100.0).round() as u32;

        Evaluation {
            credits,
            bonus,
            score,
            reasons,
        }
    }
}

impl ProfileScorer for WeightedScorer {
    fn score(&self, profile: &Profile, job: &PreparedJob<'_>) -> ScoredProfile {
        let evaluation = self.evaluate(profile, job);
        ScoredProfile {
            profile: profile.clone(),
            score: evaluation.score,
            reasons: evaluation.reasons,
        }
    }

    fn backend(&self) -> &'static str {
        "weighted"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn education_credit(
    required: EducationRequirement,
    education_text: &str,
) -> (f64, Option<String>) {
    let EducationRequirement::AtLeast(required) = required else {
        return (1.0, None);
    };
    match classify(education_text) {
        None => (0.0, Some("education not identified in profile".to_string())),
        Some(level) if level < required => (
            EDUCATION_BELOW_CREDIT,
            Some(format!("education below requirement: {level} < {required}")),
        ),
        Some(level) if level == required => (
            EDUCATION_EQUAL_CREDIT,
            Some(format!("education meets requirement: {level}")),
        ),
        Some(level) => (
            1.0,
            Some(format!("education above requirement: {level} > {required}")),
        ),
    }
}

/// hits / total, or `None` when there is nothing to cover.
fn coverage(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64)
}

/// 30 → "2a6m".
fn format_months(months: u32) -> String {
    format!("{}a{}m", months / 12, months % 12)
}

/// 2.0 → "2a", 1.5 → "1.5a".
fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}a")
    } else {
        format!("{years}a")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::education::EducationLevel;

    fn make_profile(text: &str, education: &str, months: u32) -> Profile {
        Profile {
            name: "Candidate".to_string(),
            profile_link: String::new(),
            education_text: education.to_string(),
            searchable_text: text.to_lowercase(),
            experience_months: months,
        }
    }

    fn reference_job() -> JobSpec {
        JobSpec {
            required_education: EducationRequirement::AtLeast(EducationLevel::Superior),
            required_skills: vec!["python".to_string(), "sql".to_string()],
            desired_skills: vec!["aws".to_string()],
            min_experience_years: 2.0,
            target_role: None,
            bonus_terms: vec![],
        }
    }

    fn evaluate(profile: &Profile, job: &JobSpec) -> Evaluation {
        WeightedScorer::default().evaluate(profile, &PreparedJob::new(job))
    }

    fn score(profile: &Profile, job: &JobSpec) -> ScoredProfile {
        WeightedScorer::default().score(profile, &PreparedJob::new(job))
    }

    #[test]
    fn test_reference_profile_a_scores_high() {
        let a = make_profile(
            "Data engineer. Python, SQL and AWS pipelines",
            "Bacharelado em Sistemas",
            30,
        );
        let scored = score(&a, &reference_job());

        // 13.5 + 45 + 20 + 20
        assert_eq!(scored.score, 99);
        assert_eq!(
            scored.reasons,
            vec![
                "education meets requirement: superior".to_string(),
                "minimum experience met: 2a6m ≥ 2a".to_string(),
            ]
        );
        assert!(!scored.reasons.iter().any(|r| r.starts_with("missing required")));
    }

    #[test]
    fn test_reference_profile_b_lists_missing_required() {
        let a = make_profile("python sql aws", "Bacharelado", 30);
        let b = make_profile("Sales manager, excel", "Bacharelado", 30);
        let job = reference_job();

        let eval_b = evaluate(&b, &job);
        assert_eq!(eval_b.credits.required_skills, 0.0);
        assert_eq!(
            eval_b.reasons,
            vec![
                "education meets requirement: superior".to_string(),
                "missing required: python".to_string(),
                "missing required: sql".to_string(),
                "minimum experience met: 2a6m ≥ 2a".to_string(),
            ]
        );
        let eval_a = evaluate(&a, &job);
        assert!(eval_a.score >= eval_b.score + 40);
    }

    #[test]
    fn test_empty_required_skills_is_full_credit() {
        let job = JobSpec {
            required_skills: vec![],
            desired_skills: vec!["aws".to_string()],
            ..JobSpec::default()
        };
        for profile in [
            make_profile("", "", 0),
            make_profile("anything at all", "Doutorado", 500),
        ] {
            assert_eq!(evaluate(&profile, &job).credits.required_skills, 1.0);
        }
    }

    #[test]
    fn test_empty_desired_skills_is_neutral() {
        let job = JobSpec {
            required_skills: vec!["rust".to_string()],
            ..JobSpec::default()
        };
        let eval = evaluate(&make_profile("rust", "", 0), &job);
        assert_eq!(eval.credits.desired_skills, DESIRED_NEUTRAL_CREDIT);
        // 15 + 45 + 10 + 20
        assert_eq!(eval.score, 90);
    }

    #[test]
    fn test_unconstrained_job_is_bonus_only() {
        let profile = make_profile("senior data engineer", "Mestrado", 120);
        assert_eq!(evaluate(&profile, &JobSpec::default()).score, 0);

        let job = JobSpec {
            target_role: Some("Data Engineer".to_string()),
            ..JobSpec::default()
        };
        let eval = evaluate(&profile, &job);
        assert_eq!(eval.score, 5);
        assert_eq!(eval.reasons, vec!["role aligned with profile: Data Engineer"]);
    }

    #[test]
    fn test_education_credit_levels() {
        let job = JobSpec {
            required_education: EducationRequirement::AtLeast(EducationLevel::Superior),
            required_skills: vec!["x".to_string()],
            ..JobSpec::default()
        };
        let credit = |education: &str| evaluate(&make_profile("", education, 0), &job).credits.education;

        assert_eq!(credit("Ensino médio"), EDUCATION_BELOW_CREDIT);
        assert_eq!(credit("Graduação em Direito"), EDUCATION_EQUAL_CREDIT);
        assert_eq!(credit("Mestrado em Física"), 1.0);
        assert_eq!(credit("xyz123"), 0.0);
        assert_eq!(credit(""), 0.0);
    }

    #[test]
    fn test_indifferent_education_is_full_credit_without_reason() {
        let job = JobSpec {
            required_skills: vec!["go".to_string()],
            ..JobSpec::default()
        };
        let eval = evaluate(&make_profile("go", "", 0), &job);
        assert_eq!(eval.credits.education, 1.0);
        assert!(eval.reasons.is_empty());
    }

    #[test]
    fn test_experience_reason_below_minimum() {
        let job = JobSpec {
            min_experience_years: 1.5,
            ..JobSpec::default()
        };
        let eval = evaluate(&make_profile("", "", 9), &job);
        assert_eq!(eval.credits.experience, 0.5);
        assert_eq!(eval.reasons, vec!["experience below minimum: 0a9m < 1.5a"]);
    }

    #[test]
    fn test_experience_is_monotonic() {
        let job = reference_job();
        let mut previous = 0;
        for months in 0..=60 {
            let current = evaluate(&make_profile("python", "Bacharelado", months), &job).score;
            assert!(current >= previous, "score dropped at {months} months");
            previous = current;
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let profile = make_profile("python, aws", "tecnólogo", 14);
        let job = reference_job();
        let first = score(&profile, &job);
        let second = score(&profile, &job);
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_capped_at_100() {
        let job = JobSpec {
            required_education: EducationRequirement::AtLeast(EducationLevel::Medio),
            required_skills: vec!["rust".to_string()],
            desired_skills: vec!["tokio".to_string()],
            min_experience_years: 1.0,
            target_role: Some("backend engineer".to_string()),
            bonus_terms: vec!["remote".to_string(), "english".to_string(), "linux".to_string()],
        };
        let profile = make_profile(
            "Backend Engineer: rust, tokio, linux, english, remote",
            "Doutorado",
            240,
        );
        let eval = evaluate(&profile, &job);
        assert_eq!(eval.score, 100);
        // 3 terms × 2 points, capped at 5, plus the role bonus.
        assert_eq!(eval.bonus, 10.0);
    }

    #[test]
    fn test_reason_order_is_fixed() {
        let job = JobSpec {
            required_education: EducationRequirement::AtLeast(EducationLevel::Mestrado),
            required_skills: vec!["kafka".to_string(), "scala".to_string()],
            desired_skills: vec![],
            min_experience_years: 3.0,
            target_role: Some("engenheiro de dados".to_string()),
            bonus_terms: vec!["remoto".to_string()],
        };
        let profile = make_profile("Engenheiro de Dados, scala, remoto", "Bacharelado", 12);
        let eval = evaluate(&profile, &job);
        assert_eq!(
            eval.reasons,
            vec![
                "education below requirement: superior < mestrado",
                "missing required: kafka",
                "experience below minimum: 1a0m < 3a",
                "role aligned with profile: engenheiro de dados",
                "bonus term found: remoto",
            ]
        );
    }

    #[test]
    fn test_keyword_respects_word_boundaries() {
        let java = KeywordMatcher::new("Java");
        assert!(java.is_match("java, spring"));
        assert!(!java.is_match("javascript developer"));

        let cpp = KeywordMatcher::new("C++");
        assert!(cpp.is_match("c++ and python"));
        assert!(!cpp.is_match("c and python"));

        let dotnet = KeywordMatcher::new(".NET");
        assert!(dotnet.is_match("asp.net core"));
    }

    #[test]
    fn test_keyword_metacharacters_are_escaped() {
        let node = KeywordMatcher::new("node.js");
        assert!(node.is_match("react and node.js"));
        assert!(!node.is_match("react and nodexjs"));

        let weird = KeywordMatcher::new("(a|b)*");
        assert!(!weird.is_match("aaaa"));
        assert!(weird.is_match("pattern (a|b)* literal"));
    }

    #[test]
    fn test_blank_keyword_never_matches() {
        assert!(!KeywordMatcher::new("   ").is_match("anything"));
    }

    #[test]
    fn test_duplicate_required_keywords_matched_independently() {
        let job = JobSpec {
            required_skills: vec!["sql".to_string(), "sql".to_string(), "rust".to_string()],
            ..JobSpec::default()
        };
        let eval = evaluate(&make_profile("sql", "", 0), &job);
        assert!((eval.credits.required_skills - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_months(30), "2a6m");
        assert_eq!(format_months(0), "0a0m");
        assert_eq!(format_years(2.0), "2a");
        assert_eq!(format_years(1.5), "1.5a");
    }

    #[test]
    fn test_backend_label() {
        assert_eq!(WeightedScorer::default().backend(), "weighted");
    }
}
