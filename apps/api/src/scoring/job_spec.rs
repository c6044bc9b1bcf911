//! Job specification — the structured requirements a batch is scored against.
//!
//! Deserialization never rejects a well-formed object: Portuguese form keys and
//! camelCase keys are accepted, skill lists may arrive as one comma/semicolon
//! separated string, and absent, unrecognized or wrongly typed values fall back
//! to defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::profile::education::{classify, EducationLevel};

/// Required education: either indifferent or a minimum ordinal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum EducationRequirement {
    #[default]
    Indifferent,
    AtLeast(EducationLevel),
}

impl From<Option<String>> for EducationRequirement {
    fn from(raw: Option<String>) -> Self {
        let Some(raw) = raw else {
            return EducationRequirement::Indifferent;
        };
        let key = raw.trim().to_lowercase();
        if matches!(key.as_str(), "" | "indiferente" | "indifferent" | "any") {
            return EducationRequirement::Indifferent;
        }
        EducationLevel::from_key(&key)
            .or_else(|| classify(&key))
            .map(EducationRequirement::AtLeast)
            .unwrap_or(EducationRequirement::Indifferent)
    }
}

impl From<Value> for EducationRequirement {
    fn from(raw: Value) -> Self {
        match raw {
            Value::String(text) => Some(text).into(),
            _ => EducationRequirement::Indifferent,
        }
    }
}

impl From<EducationRequirement> for String {
    fn from(requirement: EducationRequirement) -> Self {
        match requirement {
            EducationRequirement::Indifferent => "indiferente".to_string(),
            EducationRequirement::AtLeast(level) => level.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSpec {
    #[serde(
        alias = "requiredEducation",
        alias = "requiredEducationLevel",
        alias = "escolaridade"
    )]
    pub required_education: EducationRequirement,

    #[serde(
        alias = "requiredSkills",
        alias = "conhecimentosObrigatorios",
        deserialize_with = "term_list"
    )]
    pub required_skills: Vec<String>,

    #[serde(
        alias = "desiredSkills",
        alias = "conhecimentosDesejados",
        deserialize_with = "term_list"
    )]
    pub desired_skills: Vec<String>,

    #[serde(
        alias = "minExperienceYears",
        alias = "tempoExperienciaMinAnos",
        deserialize_with = "lenient_years"
    )]
    pub min_experience_years: f64,

    #[serde(alias = "targetRole", alias = "cargo", deserialize_with = "blank_as_none")]
    pub target_role: Option<String>,

    #[serde(alias = "bonusTerms", alias = "observacoes", deserialize_with = "term_list")]
    pub bonus_terms: Vec<String>,
}

impl JobSpec {
    /// True when the spec asks for nothing that could be scored.
    pub fn is_unconstrained(&self) -> bool {
        self.required_skills.is_empty()
            && self.desired_skills.is_empty()
            && self.min_experience_years <= 0.0
            && self.required_education == EducationRequirement::Indifferent
    }
}

/// Splits free text on commas and semicolons, trimming and dropping blanks.
pub fn split_terms(text: &str) -> Vec<String> {
    text.split([',', ';'])
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scalar cell text; arrays and objects have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn term_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let terms = match Value::deserialize(deserializer)? {
        Value::String(text) => split_terms(&text),
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(&other).into_iter().collect(),
    };
    Ok(terms.into_iter().filter(|term| !term.is_empty()).collect())
}

fn lenient_years<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let years = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if years.is_finite() && years > 0.0 { years } else { 0.0 })
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
}
