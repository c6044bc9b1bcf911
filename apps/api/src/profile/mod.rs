//! Profile normalization: turns loosely-schematized scraped rows into typed `Profile`s.
//!
//! Nothing in here fails on missing or odd data. Absent columns degrade to empty
//! strings and zero months; only batch decoding (see `input`) can reject.

pub mod duration;
pub mod education;
pub mod extract;
pub mod input;

use serde::{Deserialize, Serialize};

/// One raw tabular row: column name → cell text, in source column order.
///
/// Column names are not fixed across sources, so this stays an ordered list of
/// pairs instead of a struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    columns: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Normalized candidate profile. Produced once per raw record, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub profile_link: String,
    pub education_text: String,
    /// Lowercased, newline-joined text of every textual column.
    pub searchable_text: String,
    pub experience_months: u32,
}
