//! Education classifier — maps free-text education descriptions onto a fixed ordinal scale.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordinal education scale, lowest first. The derived `Ord` is the scale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Fundamental,
    Medio,
    Tecnologo,
    Superior,
    Pos,
    Mestrado,
    Doutorado,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Fundamental => "fundamental",
            EducationLevel::Medio => "medio",
            EducationLevel::Tecnologo => "tecnologo",
            EducationLevel::Superior => "superior",
            EducationLevel::Pos => "pos",
            EducationLevel::Mestrado => "mestrado",
            EducationLevel::Doutorado => "doutorado",
        }
    }

    /// Parses a level key as sent by job forms ("superior", "pós", "médio", ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "fundamental" => Some(EducationLevel::Fundamental),
            "medio" | "médio" => Some(EducationLevel::Medio),
            "tecnologo" | "tecnólogo" => Some(EducationLevel::Tecnologo),
            "superior" => Some(EducationLevel::Superior),
            "pos" | "pós" => Some(EducationLevel::Pos),
            "mestrado" => Some(EducationLevel::Mestrado),
            "doutorado" => Some(EducationLevel::Doutorado),
            _ => None,
        }
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn rule(level: EducationLevel, pattern: &str) -> (EducationLevel, Regex) {
    (level, Regex::new(pattern).expect("valid education pattern"))
}

/// Dispatch table, highest level first. First match wins.
static RULES: Lazy<Vec<(EducationLevel, Regex)>> = Lazy::new(|| {
    vec![
        rule(EducationLevel::Doutorado, r"doutor|ph\.?d|doctor"),
        rule(EducationLevel::Mestrado, r"mestrad|master|\bm\.?sc\b"),
        rule(EducationLevel::Pos, r"\bp[óo]s\b|especializa|\bmba\b"),
        rule(EducationLevel::Superior, r"bacharel|gradua|licenci|bachelor|\bb\.?sc\b"),
        rule(EducationLevel::Tecnologo, r"tecn[óo]log|t[ée]cnic|technician"),
        rule(EducationLevel::Medio, r"m[ée]dio|high school|secondary school"),
        rule(EducationLevel::Fundamental, r"fundamental|elementary|primary school"),
    ]
});

/// Classifies free text. `None` means unclassified, which is not the same as
/// `Fundamental`.
pub fn classify(text: &str) -> Option<EducationLevel> {
    if text.trim().is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lower))
        .map(|(level, _)| *level)
}
