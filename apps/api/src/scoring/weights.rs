use serde::{Deserialize, Serialize};

/// Credit for a classified education below the required level.
pub const EDUCATION_BELOW_CREDIT: f64 = 0.3;
/// Credit for a classified education exactly at the required level.
pub const EDUCATION_EQUAL_CREDIT: f64 = 0.9;
/// Desired-skill credit when the job lists no desired skills.
pub const DESIRED_NEUTRAL_CREDIT: f64 = 0.5;

/// Point allocation out of 100 for each criterion, plus the additive bonuses.
///
/// The four criterion weights should sum to 100; bonuses sit on top and the
/// final score is capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub education: f64,
    pub required_skills: f64,
    pub desired_skills: f64,
    pub experience: f64,
    /// Flat bonus when the target role appears in the profile text.
    pub role_bonus: f64,
    /// Bonus per matched observation term.
    pub bonus_term_points: f64,
    /// Ceiling for the summed observation-term bonus.
    pub bonus_terms_cap: f64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    education: 15.0,
    required_skills: 45.0,
    desired_skills: 20.0,
    experience: 20.0,
    role_bonus: 5.0,
    bonus_term_points: 2.0,
    bonus_terms_cap: 5.0,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    pub fn criteria_sum(&self) -> f64 {
        self.education + self.required_skills + self.desired_skills + self.experience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_criteria_sum_to_100() {
        assert!((DEFAULT_WEIGHTS.criteria_sum() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bonuses_are_small() {
        let w = ScoringWeights::default();
        assert!(w.role_bonus <= 10.0);
        assert!(w.bonus_terms_cap <= 10.0);
    }
}
