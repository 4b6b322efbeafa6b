//! Lenient value parsing for registry fields
//!
//! Registry fields are decoded as text or floats; anything that cannot be
//! interpreted becomes `None` instead of an error.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parse a registry date
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time part), `YYYYMMDD`
/// and `DD.MM.YYYY`.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() >= 10 {
        if let Some(head) = value.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(date);
            }
            if let Ok(date) = NaiveDate::parse_from_str(head, "%d.%m.%Y") {
                return Some(date);
            }
        }
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }
    None
}

/// Normalise a categorical code
///
/// Keeps the text before the first `.` truncated to two characters;
/// empty, `na` and `nan` are missing.
#[must_use]
pub fn normalize_code(value: &str) -> Option<String> {
    let head = value.trim().split('.').next().unwrap_or_default();
    if head.is_empty() || head.eq_ignore_ascii_case("na") || head.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(head.chars().take(2).collect())
}

/// Integer code of a numeric field, truncating fractions
#[must_use]
pub fn integer_code(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.trunc() as i64)
}

/// Non-missing value of a numeric field, treating NaN as missing
#[must_use]
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Trimmed non-empty text
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Serde helper decoding a text column into an optional date
pub mod lenient_date {
    use super::{Deserialize, Deserializer, NaiveDate, parse_date};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(parse_date))
    }
}
