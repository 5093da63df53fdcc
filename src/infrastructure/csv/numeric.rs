// ============================================================
// NUMERIC NORMALIZATION
// ============================================================
// Rewrite locale-formatted numbers to canonical text

use regex::Regex;

use crate::domain::csv::DialectConfig;
use crate::domain::error::{Result, TapError};

/// Recognizes numeric-looking fields under a dialect's `thousands` and
/// `decimal` characters and renders them with `.` as decimal point and no
/// grouping. Exact string rewriting; values never pass through a float.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    pattern: Regex,
    thousands: Option<char>,
    decimal: char,
}

impl NumberFormat {
    /// Build the format for a dialect, or `None` when the dialect keeps
    /// field text verbatim.
    pub fn for_dialect(dialect: &DialectConfig) -> Result<Option<Self>> {
        if !dialect.normalizes_numbers() {
            return Ok(None);
        }
        Self::new(dialect.thousands.map(char::from), char::from(dialect.decimal)).map(Some)
    }

    pub fn new(thousands: Option<char>, decimal: char) -> Result<Self> {
        let dec = regex::escape(&decimal.to_string());
        let integer = match thousands {
            Some(t) => {
                let sep = regex::escape(&t.to_string());
                format!("(?:[0-9]+|[0-9]{{1,3}}(?:{sep}[0-9]{{3}})+)")
            }
            None => "[0-9]+".to_string(),
        };
        let source = format!("^[+-]?(?:{integer}(?:{dec}[0-9]*)?|{dec}[0-9]+)$");

        let pattern = Regex::new(&source)
            .map_err(|e| TapError::Config(format!("Invalid numeric format: {}", e)))?;

        Ok(Self {
            pattern,
            thousands,
            decimal,
        })
    }

    /// Canonical text for a numeric-looking value, `None` otherwise
    pub fn normalize(&self, value: &str) -> Option<String> {
        if !self.pattern.is_match(value) {
            return None;
        }

        let (negative, unsigned) = match value.as_bytes().first() {
            Some(b'-') => (true, &value[1..]),
            Some(b'+') => (false, &value[1..]),
            _ => (false, value),
        };

        let ungrouped: String = unsigned
            .chars()
            .filter(|c| Some(*c) != self.thousands)
            .collect();

        let (int_part, frac_part) = match ungrouped.split_once(self.decimal) {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (ungrouped.as_str(), ""),
        };

        let int_part = int_part.trim_start_matches('0');
        let frac_part = frac_part.trim_end_matches('0');

        let mut canonical = String::with_capacity(ungrouped.len() + 1);
        if int_part.is_empty() {
            canonical.push('0');
        } else {
            canonical.push_str(int_part);
        }
        if !frac_part.is_empty() {
            canonical.push('.');
            canonical.push_str(frac_part);
        }

        if negative && canonical != "0" {
            canonical.insert(0, '-');
        }

        Some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn european() -> NumberFormat {
        NumberFormat::new(Some('.'), ',').unwrap()
    }

    #[test]
    fn test_european_decimal() {
        let format = european();

        assert_eq!(format.normalize("1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(format.normalize("1.234").as_deref(), Some("1234"));
        assert_eq!(format.normalize("1234,5").as_deref(), Some("1234.5"));
        assert_eq!(format.normalize("-0,50").as_deref(), Some("-0.5"));
        assert_eq!(format.normalize(",25").as_deref(), Some("0.25"));
        assert_eq!(format.normalize("+12.000.000").as_deref(), Some("12000000"));
    }

    #[test]
    fn test_non_numeric_left_alone() {
        let format = european();

        assert_eq!(format.normalize("Alice"), None);
        assert_eq!(format.normalize("12.34.5"), None);
        assert_eq!(format.normalize(""), None);
        assert_eq!(format.normalize("1,2,3"), None);
    }

    #[test]
    fn test_thousands_only() {
        let format = NumberFormat::new(Some(','), '.').unwrap();

        assert_eq!(format.normalize("1,234,567.80").as_deref(), Some("1234567.8"));
        assert_eq!(format.normalize("007").as_deref(), Some("7"));
        assert_eq!(format.normalize("-0").as_deref(), Some("0"));
    }

    #[test]
    fn test_disabled_for_default_dialect() {
        let format = NumberFormat::for_dialect(&DialectConfig::default()).unwrap();
        assert!(format.is_none());
    }
}
