//! Field extractor — resolves logical fields from variable column schemas.

use std::collections::HashMap;

use crate::profile::duration::months_from;
use crate::profile::{Profile, RawRecord};

const NAME_ALIASES: &[&str] = &["fullName", "name", "firstName", "Profile Name"];

const LINK_ALIASES: &[&str] = &[
    "linkedinProfileUrl",
    "profileUrl",
    "LinkedIn Profile URL",
    "LinkedIn Url",
    "LinkedIn",
    "linkedinProfile",
];

const EDUCATION_ALIASES: &[&str] = &[
    "schoolDegree",
    "degree",
    "Education Degree",
    "education",
    "school",
];

/// Free-text columns that go first into the searchable text, in this order.
const TEXT_ALIASES: &[&str] = &[
    "headline",
    "summary",
    "about",
    "description",
    "bio",
    "jobTitle",
    "jobTitle2",
    "currentJob",
    "Current Job",
    "position",
    "company",
    "Current Company",
    "jobDescription",
    "jobDescription2",
    "experience",
    "education",
    "skills",
    "certifications",
];

const DURATION_ALIASES: &[&str] = &[
    "jobDuration",
    "jobDuration2",
    "experienceDuration",
    "duration",
    "timeInRole",
    "Time in role",
];

/// Case-insensitive view over one record, built once per extraction.
struct FieldLookup<'a> {
    record: &'a RawRecord,
    by_lower: HashMap<String, Vec<&'a str>>,
}

impl<'a> FieldLookup<'a> {
    fn new(record: &'a RawRecord) -> Self {
        let mut by_lower: HashMap<String, Vec<&'a str>> = HashMap::new();
        for (column, value) in record.iter() {
            by_lower
                .entry(column.to_lowercase())
                .or_default()
                .push(value);
        }
        Self { record, by_lower }
    }

    /// Non-blank value for one alias. An exact-case column wins over a
    /// case-insensitive one.
    fn get(&self, alias: &str) -> Option<&'a str> {
        let exact = self
            .record
            .iter()
            .find(|(column, value)| *column == alias && !value.trim().is_empty())
            .map(|(_, value)| value);
        exact.or_else(|| {
            self.by_lower
                .get(&alias.to_lowercase())?
                .iter()
                .copied()
                .find(|value| !value.trim().is_empty())
        })
    }

    /// First non-blank value across aliases, trimmed; empty when none match.
    fn pick(&self, aliases: &[&str]) -> String {
        aliases
            .iter()
            .find_map(|alias| self.get(alias))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }
}

/// Normalizes one raw record. Never fails: missing fields become empty / zero.
pub fn extract(record: &RawRecord) -> Profile {
    let lookup = FieldLookup::new(record);

    Profile {
        name: lookup.pick(NAME_ALIASES),
        profile_link: lookup.pick(LINK_ALIASES),
        education_text: lookup.pick(EDUCATION_ALIASES),
        searchable_text: searchable_text(&lookup),
        experience_months: experience_months(record),
    }
}

fn searchable_text(lookup: &FieldLookup<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for alias in TEXT_ALIASES {
        if let Some(value) = lookup.get(alias) {
            if !parts.contains(&value) {
                parts.push(value);
            }
        }
    }

    // Unknown schemas: every remaining column still counts.
    for (_, value) in lookup.record.iter() {
        if !value.trim().is_empty() && !parts.contains(&value) {
            parts.push(value);
        }
    }

    parts.join("\n").to_lowercase()
}

/// Sums every duration-bearing column. Each physical column counts once.
fn experience_months(record: &RawRecord) -> u32 {
    record
        .iter()
        .filter(|(column, _)| {
            DURATION_ALIASES
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(column.trim()))
        })
        .map(|(_, value)| months_from(value))
        .fold(0u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_extracts_phantom_style_row() {
        let row = record(&[
            ("fullName", "Ana Souza"),
            ("linkedinProfileUrl", "https://www.linkedin.com/in/ana"),
            ("headline", "Engenheira de Dados | Python | SQL"),
            ("schoolDegree", "Bacharelado em Sistemas"),
            ("jobDuration", "1 ano 7 meses"),
            ("jobDuration2", "2 anos"),
        ]);

        let profile = extract(&row);
        assert_eq!(profile.name, "Ana Souza");
        assert_eq!(profile.profile_link, "https://www.linkedin.com/in/ana");
        assert_eq!(profile.education_text, "Bacharelado em Sistemas");
        assert_eq!(profile.experience_months, 43);
        assert!(profile.searchable_text.starts_with("engenheira de dados | python | sql"));
    }

    #[test]
    fn test_alias_lookup_is_case_insensitive() {
        let row = record(&[
            ("FULLNAME", "Bruno Lima"),
            ("profileurl", "https://linkedin.com/in/bruno"),
        ]);
        let profile = extract(&row);
        assert_eq!(profile.name, "Bruno Lima");
        assert_eq!(profile.profile_link, "https://linkedin.com/in/bruno");
    }

    #[test]
    fn test_blank_alias_falls_through_to_next() {
        let row = record(&[("fullName", "   "), ("name", "Carla"), ("Profile Name", "Other")]);
        assert_eq!(extract(&row).name, "Carla");
    }

    #[test]
    fn test_exact_case_column_preferred() {
        let row = record(&[("Education", "Mestrado"), ("education", "Bacharelado")]);
        assert_eq!(extract(&row).education_text, "Bacharelado");
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let profile = extract(&RawRecord::new());
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_searchable_text_includes_unknown_columns_and_dedups() {
        let row = record(&[
            ("headline", "Data Engineer"),
            ("summary", "Airflow pipelines"),
            ("someNewColumn", "Kubernetes"),
            ("copyOfHeadline", "Data Engineer"),
        ]);
        let text = extract(&row).searchable_text;
        assert_eq!(text, "data engineer\nairflow pipelines\nkubernetes");
    }

    #[test]
    fn test_curated_fields_come_before_other_columns() {
        let row = record(&[("zzz", "Trailing"), ("skills", "Rust")]);
        assert_eq!(extract(&row).searchable_text, "rust\ntrailing");
    }

    #[test]
    fn test_duration_column_counted_once_across_aliases() {
        // "duration" and "Duration" aliases both resolve to this one column.
        let row = record(&[("Duration", "3 years 2 months")]);
        assert_eq!(extract(&row).experience_months, 38);
    }

    #[test]
    fn test_duration_sums_all_role_entries() {
        let row = record(&[
            ("jobDuration", "6 months"),
            ("Time in role", "1 year"),
            ("experienceDuration", "garbage"),
        ]);
        assert_eq!(extract(&row).experience_months, 18);
    }

    #[test]
    fn test_non_duration_columns_are_not_summed() {
        let row = record(&[("summary", "10 anos de experiência")]);
        assert_eq!(extract(&row).experience_months, 0);
    }
}
