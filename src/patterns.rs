//! Date pattern matching for log lines.

use crate::error::SweepError;
use chrono::NaiveDate;
use regex::Regex;

/// Format paired with every built-in pattern (and with custom patterns).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A (matcher, format) pair: the regular expression captures the date text
/// and the chrono format string parses it.
#[derive(Debug, Clone)]
pub struct DatePattern {
    regex: Regex,
    format: String,
}

impl DatePattern {
    /// Compile a pattern from a regular expression and a chrono date format.
    pub fn new(expr: &str, format: &str) -> Result<Self, SweepError> {
        let regex = Regex::new(expr).map_err(|source| SweepError::InvalidPattern {
            pattern: expr.to_string(),
            source,
        })?;
        Ok(DatePattern {
            regex,
            format: format.to_string(),
        })
    }

    /// Compile a caller-supplied expression, paired with the default format.
    ///
    /// A custom pattern replaces the built-in list entirely rather than being
    /// appended to it.
    pub fn custom(expr: &str) -> Result<Self, SweepError> {
        DatePattern::new(expr, DEFAULT_DATE_FORMAT)
    }

    /// The text the pattern captures from a line, if it matches at all.
    /// Falls back to the whole match when the expression has no capture group.
    fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex.captures(line).map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str())
                .unwrap_or_default()
        })
    }
}

/// The built-in pattern list, tried in order: bracketed date-time
/// (`[2024-01-15 10:30:00]`), bracketed date (`[2024-01-15]`), then a bare
/// date prefix (`2024-01-15 ...`).
pub fn default_patterns() -> Vec<DatePattern> {
    [
        r"^\[(\d{4}-\d{2}-\d{2}) \d{2}:\d{2}:\d{2}",
        r"^\[(\d{4}-\d{2}-\d{2})\]",
        r"^(\d{4}-\d{2}-\d{2})",
    ]
    .iter()
    .map(|expr| {
        DatePattern::new(expr, DEFAULT_DATE_FORMAT).expect("built-in date pattern must compile")
    })
    .collect()
}

/// Extract a calendar date from a raw log line.
///
/// Patterns are tried strictly in list order and the first regex that matches
/// decides: its captured text is parsed with the paired format, and a parse
/// failure yields `None` without falling through to later patterns. A line
/// that matches a pattern but carries an unparseable date is therefore
/// treated the same as a line with no date, which the decision engine always
/// keeps. Time-of-day never participates in the comparison.
pub fn extract_date(line: &str, patterns: &[DatePattern]) -> Option<NaiveDate> {
    for pattern in patterns {
        if let Some(text) = pattern.capture(line) {
            return NaiveDate::parse_from_str(text, &pattern.format).ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bracketed_datetime() {
        let patterns = default_patterns();
        let line = "[2024-01-15 10:30:00] production.ERROR: boom";
        assert_eq!(extract_date(line, &patterns), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_bracketed_date_only() {
        let patterns = default_patterns();
        assert_eq!(
            extract_date("[2024-01-15] something happened", &patterns),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_bare_date_prefix() {
        let patterns = default_patterns();
        assert_eq!(
            extract_date("2024-01-15 10:30:00 INFO start", &patterns),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_no_date() {
        let patterns = default_patterns();
        assert_eq!(extract_date("#0 /app/Http/Kernel.php(42)", &patterns), None);
        assert_eq!(extract_date("", &patterns), None);
    }

    #[test]
    fn test_date_not_at_line_start_is_ignored() {
        let patterns = default_patterns();
        assert_eq!(
            extract_date("retrying job from 2024-01-15", &patterns),
            None
        );
    }

    #[test]
    fn test_matching_but_unparseable_date_yields_none() {
        // Month 13 satisfies the regex but not the date format.
        let patterns = default_patterns();
        assert_eq!(extract_date("[2024-13-01] bad month", &patterns), None);
    }

    #[test]
    fn test_first_match_does_not_fall_through() {
        // The first pattern matches but its capture cannot parse; the second
        // pattern would succeed, yet must never be consulted.
        let patterns = vec![
            DatePattern::new(r"^(\d{4}-\d{2}-\d{2})x", DEFAULT_DATE_FORMAT).unwrap(),
            DatePattern::new(r"^(\d{4}-\d{2}-\d{2})", DEFAULT_DATE_FORMAT).unwrap(),
        ];
        assert_eq!(extract_date("2024-13-01x rest", &patterns), None);
    }

    #[test]
    fn test_custom_pattern_without_capture_group_uses_whole_match() {
        let pattern = DatePattern::custom(r"\d{4}-\d{2}-\d{2}").unwrap();
        assert_eq!(
            extract_date("prefix 2024-01-15 suffix", &[pattern]),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn test_invalid_expression_is_rejected() {
        let result = DatePattern::custom(r"^(\d{4}");
        assert!(matches!(result, Err(SweepError::InvalidPattern { .. })));
    }

    #[test]
    fn test_pattern_order_is_respected() {
        // A bracketed date-time line must be handled by the first pattern;
        // all three produce the same date here, but the list order is the
        // contract.
        let patterns = default_patterns();
        assert_eq!(
            extract_date("[2024-02-29 23:59:59] leap day", &patterns),
            Some(date(2024, 2, 29))
        );
    }
}
