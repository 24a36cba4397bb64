//! Severity detection and the per-line keep/drop decision.

use crate::patterns::{extract_date, DatePattern};
use crate::policy::{Level, RetentionPolicy};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Matches the `.TOKEN:` idiom of structured log lines, e.g.
/// `production.ERROR:`. The first token found on a line wins.
const LEVEL_TOKEN_EXPR: &str = r"\.(EMERGENCY|ALERT|CRITICAL|ERROR|WARNING|NOTICE|INFO|DEBUG):";

/// The detection regex is policy-independent, so it is compiled once per
/// process rather than per filter.
fn level_regex() -> &'static Regex {
    static LEVEL_REGEX: OnceLock<Regex> = OnceLock::new();
    LEVEL_REGEX
        .get_or_init(|| Regex::new(LEVEL_TOKEN_EXPR).expect("level token pattern must compile"))
}

/// The pure decision engine: given a raw line, decide whether it survives.
///
/// Borrows the policy's pattern list, so building one costs nothing and it
/// can be evaluated millions of times with no setup cost per line.
pub struct LineFilter<'a> {
    cutoff: Option<NaiveDate>,
    level: Option<Level>,
    patterns: &'a [DatePattern],
}

impl<'a> LineFilter<'a> {
    pub fn new(policy: &'a RetentionPolicy) -> Self {
        LineFilter {
            cutoff: policy.cutoff(),
            level: policy.level(),
            patterns: policy.patterns(),
        }
    }

    /// Detect the first severity token on a line, if any.
    pub fn detect_level(&self, line: &str) -> Option<Level> {
        level_regex()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|token| token.as_str().parse().ok())
    }

    /// Decide whether a raw line survives the sweep.
    ///
    /// The level gate runs first; either gate alone is sufficient to reject.
    /// Lines with no detectable level are never dropped by the level gate,
    /// so stack-trace continuation lines stay attached to a kept header.
    /// Lines with no extractable date (including lines whose date text
    /// matches a pattern but fails to parse) are never dropped by the date
    /// gate.
    pub fn keep(&self, line: &str) -> bool {
        if let Some(wanted) = self.level {
            if let Some(found) = self.detect_level(line) {
                if found != wanted {
                    return false;
                }
            }
        }

        match self.cutoff {
            // Full-clear mode: the date gate is disabled. With a level filter
            // the gate above is the whole decision; without one, nothing
            // survives.
            None => self.level.is_some(),
            Some(cutoff) => match extract_date(line, self.patterns) {
                Some(date) => date >= cutoff,
                None => true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RetentionOptions;

    fn policy(days: i64, level: Option<&str>) -> RetentionPolicy {
        let options = RetentionOptions {
            days,
            level: level.map(str::to_string),
            ..Default::default()
        };
        let mut policy = RetentionPolicy::from_options(&options).unwrap();
        if days > 0 {
            // Pin the cutoff so tests are independent of the wall clock.
            policy = policy.with_cutoff(NaiveDate::from_ymd_opt(2024, 6, 1));
        }
        policy
    }

    #[test]
    fn test_detect_level() {
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert_eq!(
            f.detect_level("[2024-06-10 10:00:00] production.ERROR: boom"),
            Some(Level::Error)
        );
        assert_eq!(
            f.detect_level("[2024-06-10] local.DEBUG: trace"),
            Some(Level::Debug)
        );
        assert_eq!(f.detect_level("#1 /app/Console/Kernel.php(42)"), None);
    }

    #[test]
    fn test_detect_level_first_token_wins() {
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert_eq!(
            f.detect_level("app.WARNING: retried after app.ERROR: earlier"),
            Some(Level::Warning)
        );
    }

    #[test]
    fn test_bare_token_without_channel_prefix_is_not_detected() {
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert_eq!(f.detect_level("ERROR: not the structured idiom"), None);
    }

    #[test]
    fn test_date_gate_keeps_recent_and_drops_old() {
        let p = policy(30, None); // cutoff pinned to 2024-06-01
        let f = LineFilter::new(&p);
        assert!(f.keep("[2024-06-01 00:00:00] app.INFO: on the cutoff"));
        assert!(f.keep("[2024-07-15 10:00:00] app.INFO: recent"));
        assert!(!f.keep("[2024-05-31 23:59:59] app.INFO: one day too old"));
    }

    #[test]
    fn test_time_of_day_is_ignored() {
        // The cutoff comparison is date-granularity: late on the cutoff day
        // still survives.
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert!(f.keep("[2024-06-01 23:59:59] app.INFO: still in"));
    }

    #[test]
    fn test_undated_lines_are_kept() {
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert!(f.keep("Stack trace:"));
        assert!(f.keep("#0 /app/Jobs/Send.php(17): retry()"));
        assert!(f.keep(""));
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        let p = policy(30, None);
        let f = LineFilter::new(&p);
        assert!(f.keep("[2024-13-01 00:00:00] app.INFO: month 13"));
    }

    #[test]
    fn test_level_gate_rejects_other_levels() {
        let p = policy(30, Some("ERROR"));
        let f = LineFilter::new(&p);
        assert!(!f.keep("[2024-07-15 10:00:00] app.INFO: recent but wrong level"));
        assert!(f.keep("[2024-07-15 10:00:00] app.ERROR: recent and matching"));
    }

    #[test]
    fn test_matching_level_with_old_date_is_removed() {
        // Either gate alone is sufficient to reject.
        let p = policy(30, Some("ERROR"));
        let f = LineFilter::new(&p);
        assert!(!f.keep("[2023-01-01 12:00:00] app.ERROR: matching but old"));
    }

    #[test]
    fn test_undetectable_level_is_never_dropped_by_level_gate() {
        let p = policy(30, Some("ERROR"));
        let f = LineFilter::new(&p);
        assert!(f.keep("#0 {main} thrown in /app/Handler.php"));
    }

    #[test]
    fn test_full_clear_without_level_drops_everything() {
        let p = policy(0, None);
        let f = LineFilter::new(&p);
        assert!(!f.keep("[2024-07-15 10:00:00] app.INFO: recent"));
        assert!(!f.keep("no date at all"));
        assert!(!f.keep(""));
    }

    #[test]
    fn test_full_clear_with_level_keeps_matching_and_undetectable() {
        let p = policy(0, Some("ERROR"));
        let f = LineFilter::new(&p);
        assert!(f.keep("[2020-01-01 00:00:00] app.ERROR: ancient but matching"));
        assert!(!f.keep("[2024-07-15 10:00:00] app.INFO: wrong level"));
        assert!(f.keep("Stack trace:"));
    }
}
