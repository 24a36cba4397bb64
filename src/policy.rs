//! Retention policy construction and option validation.

use crate::error::SweepError;
use crate::patterns::{default_patterns, DatePattern};
use chrono::{Duration, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// The fixed severity vocabulary, ordered most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Level {
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// The uppercase token as it appears in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Emergency => "EMERGENCY",
            Level::Alert => "ALERT",
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Notice => "NOTICE",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == token)
            .ok_or_else(|| SweepError::UnknownLevel {
                token: s.to_string(),
            })
    }
}

/// Caller-supplied options, one field per CLI flag.
#[derive(Debug, Clone, Default)]
pub struct RetentionOptions {
    /// Days of logs to keep; `0` means clear everything (subject to `level`).
    pub days: i64,
    /// Optional severity token; lines of any other detectable severity are
    /// removed.
    pub level: Option<String>,
    /// Optional custom date expression, replacing the built-in pattern list.
    pub pattern: Option<String>,
    pub dry_run: bool,
    pub backup: bool,
    pub compress: bool,
    pub memory_efficient: bool,
}

/// The validated, immutable policy for one invocation.
///
/// Constructed once via [`RetentionPolicy::from_options`]; every validation
/// error is raised here, before any file is touched.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    cutoff: Option<NaiveDate>,
    patterns: Vec<DatePattern>,
    level: Option<Level>,
    pub dry_run: bool,
    pub backup: bool,
    pub compress: bool,
    pub memory_efficient: bool,
}

impl RetentionPolicy {
    pub fn from_options(options: &RetentionOptions) -> Result<Self, SweepError> {
        if options.days < 0 {
            return Err(SweepError::InvalidDays { days: options.days });
        }
        // days == 0 disables the date gate entirely (full-clear mode).
        let cutoff = if options.days == 0 {
            None
        } else {
            Some(Local::now().date_naive() - Duration::days(options.days))
        };

        let level = match options.level.as_deref() {
            Some(token) => Some(token.parse::<Level>()?),
            None => None,
        };

        let patterns = match options.pattern.as_deref() {
            Some(expr) => vec![DatePattern::custom(expr)?],
            None => default_patterns(),
        };

        Ok(RetentionPolicy {
            cutoff,
            patterns,
            level,
            dry_run: options.dry_run,
            backup: options.backup,
            compress: options.compress,
            memory_efficient: options.memory_efficient,
        })
    }

    /// Lines dated strictly before this survive only if undated; `None`
    /// means the date gate is disabled (full-clear mode).
    pub fn cutoff(&self) -> Option<NaiveDate> {
        self.cutoff
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    /// Pin the cutoff to a fixed date. Tests use this to avoid depending on
    /// the wall clock.
    pub fn with_cutoff(mut self, cutoff: Option<NaiveDate>) -> Self {
        self.cutoff = cutoff;
        self
    }
}
