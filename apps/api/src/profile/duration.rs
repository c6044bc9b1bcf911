//! Duration phrases ("1 ano 7 meses", "3 years 2 months") → whole months.

use once_cell::sync::Lazy;
use regex::Regex;

static YEARS_PT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:anos|ano)").expect("valid years (pt) pattern"));
static MONTHS_PT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:meses|mês|mes)").expect("valid months (pt) pattern"));
static YEARS_EN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:years|year)").expect("valid years (en) pattern"));
static MONTHS_EN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:months|month)").expect("valid months (en) pattern"));

/// Parses a duration phrase into months.
///
/// Year and month counts are matched independently, so either may be absent.
/// When both locales match the same unit the Portuguese count is used.
/// Unparseable input yields 0; absurdly large counts saturate.
pub fn months_from(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }
    let lower = text.to_lowercase();

    let years = first_count(&YEARS_PT, &lower)
        .or_else(|| first_count(&YEARS_EN, &lower))
        .unwrap_or(0);
    let months = first_count(&MONTHS_PT, &lower)
        .or_else(|| first_count(&MONTHS_EN, &lower))
        .unwrap_or(0);

    years.saturating_mul(12).saturating_add(months)
}

fn first_count(pattern: &Regex, text: &str) -> Option<u32> {
    let caps = pattern.captures(text)?;
    // Digits-only capture: a parse failure can only mean overflow.
    Some(caps[1].parse::<u32>().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portuguese_years_and_months() {
        assert_eq!(months_from("1 ano 7 meses"), 19);
        assert_eq!(months_from("10 anos"), 120);
        assert_eq!(months_from("2 anos 1 mês"), 25);
        assert_eq!(months_from("5 meses"), 5);
    }

    #[test]
    fn test_english_years_and_months() {
        assert_eq!(months_from("3 months"), 3);
        assert_eq!(months_from("1 year"), 12);
        assert_eq!(months_from("4 years 11 months"), 59);
    }

    #[test]
    fn test_case_and_spacing_are_ignored() {
        assert_eq!(months_from("2 Anos 3 Meses"), 27);
        assert_eq!(months_from("6years"), 72);
    }

    #[test]
    fn test_empty_or_unmatched_is_zero() {
        assert_eq!(months_from(""), 0);
        assert_eq!(months_from("   "), 0);
        assert_eq!(months_from("desde sempre"), 0);
        assert_eq!(months_from("Present"), 0);
    }

    #[test]
    fn test_portuguese_wins_over_english_for_same_unit() {
        // Mixed-locale input must not crash; pt count is taken for years.
        assert_eq!(months_from("2 anos / 5 years"), 24);
    }

    #[test]
    fn test_overflowing_count_saturates() {
        assert_eq!(months_from("99999999999999999999 anos"), u32::MAX);
    }
}
