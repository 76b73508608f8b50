//! Typed flag values and duration syntax.
//!
//! Flags arrive from the parser already typed. [`FlagValue`] is the
//! common currency between the parser, the catalog defaults and the merger.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serializer;

use super::ConfigError;

/// The type of value a setting holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A time span such as `15s` or `10h`
    Duration,
    /// A signed integer
    Int,
    /// A boolean toggle
    Bool,
    /// Free-form text
    Str,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Duration => "duration",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Str => "string",
        };
        f.write_str(name)
    }
}

/// A parsed flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Duration value
    Duration(Duration),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
    /// String value
    Str(String),
}

impl FlagValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Duration(_) => ValueKind::Duration,
            Self::Int(_) => ValueKind::Int,
            Self::Bool(_) => ValueKind::Bool,
            Self::Str(_) => ValueKind::Str,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(d) => f.write_str(&format_duration(*d)),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<Duration> for FlagValue {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Ansible event logging level for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogEvents {
    /// Log nothing from ansible runs
    Nothing,
    /// Log task results
    #[default]
    Tasks,
    /// Log every ansible event
    Everything,
}

impl LogEvents {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Tasks => "tasks",
            Self::Everything => "everything",
        }
    }
}

impl fmt::Display for LogEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogEvents {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nothing" => Ok(Self::Nothing),
            "tasks" => Ok(Self::Tasks),
            "everything" => Ok(Self::Everything),
            _ => Err(ConfigError::InvalidLogEvents {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LogEvents {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

static DURATION_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|ms|s|m|h)").expect("duration regex is valid")
});

/// Parses a duration in Go syntax: a sequence of decimal numbers with
/// unit suffixes, e.g. `300ms`, `1.5h` or `2h45m`. A bare `0` is accepted.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] if the input is empty, negative,
/// contains unknown units, or has trailing garbage.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid("empty duration"));
    }
    if s.starts_with('-') {
        return Err(invalid("negative durations are not supported"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let mut consumed = 0;
    let mut total_nanos = 0f64;
    for caps in DURATION_UNIT.captures_iter(s) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole.start != consumed {
            return Err(invalid("unexpected characters"));
        }
        consumed = whole.end;

        let amount: f64 = caps[1].parse().map_err(|_| invalid("bad number"))?;
        let scale = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            _ => 3600e9,
        };
        total_nanos += amount * scale;
    }

    if consumed != s.len() {
        return Err(invalid("missing or unknown unit"));
    }
    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid("duration out of range"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Formats a duration the way Go prints one, e.g. `10h0m0s`, `1m30s`, `500ms`.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let nanos = d.subsec_nanos();

    if secs == 0 {
        return match nanos {
            0 => "0s".to_string(),
            n if n % 1_000_000 == 0 => format!("{}ms", n / 1_000_000),
            n if n % 1_000 == 0 => format!("{}µs", n / 1_000),
            n => format!("{n}ns"),
        };
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = if nanos == 0 {
        format!("{}s", secs % 60)
    } else {
        let frac = format!("{nanos:09}");
        format!("{}.{}s", secs % 60, frac.trim_end_matches('0'))
    };

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}")
    } else {
        seconds
    }
}

/// Serializes a duration in Go syntax.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize_duration<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_duration(*d))
}

/// Serializes an optional duration in Go syntax.
///
/// # Errors
///
/// Propagates serializer errors.
#[allow(clippy::ref_option)]
pub fn serialize_opt_duration<S: Serializer>(
    d: &Option<Duration>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&format_duration(*d)),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn single_units() {
            assert_eq!(parse_duration("15s").unwrap(), Duration::from_secs(15));
            assert_eq!(parse_duration("10h").unwrap(), Duration::from_secs(36_000));
            assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
            assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
            assert_eq!(parse_duration("7us").unwrap(), Duration::from_micros(7));
            assert_eq!(parse_duration("7µs").unwrap(), Duration::from_micros(7));
            assert_eq!(parse_duration("9ns").unwrap(), Duration::from_nanos(9));
        }

        #[test]
        fn compound_and_fractional() {
            assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
            assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
            assert_eq!(parse_duration("2h45m10s").unwrap(), Duration::from_secs(9910));
            assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        }

        #[test]
        fn bare_zero() {
            assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        }

        #[test]
        fn rejects_missing_unit() {
            assert!(matches!(
                parse_duration("15"),
                Err(ConfigError::InvalidDuration { .. })
            ));
        }

        #[test]
        fn rejects_unknown_unit_and_garbage() {
            assert!(parse_duration("3d").is_err());
            assert!(parse_duration("5s extra").is_err());
            assert!(parse_duration("x5s").is_err());
            assert!(parse_duration("").is_err());
        }

        #[test]
        fn rejects_negative() {
            assert!(parse_duration("-5s").is_err());
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn hours_include_all_components() {
            assert_eq!(format_duration(Duration::from_secs(36_000)), "10h0m0s");
        }

        #[test]
        fn minutes_and_seconds() {
            assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
            assert_eq!(format_duration(Duration::from_secs(15)), "15s");
        }

        #[test]
        fn sub_second() {
            assert_eq!(format_duration(Duration::ZERO), "0s");
            assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
            assert_eq!(format_duration(Duration::from_micros(3)), "3µs");
            assert_eq!(format_duration(Duration::from_nanos(42)), "42ns");
        }

        #[test]
        fn fractional_seconds_are_trimmed() {
            assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        }

        #[test]
        fn formatted_value_parses_back() {
            let d = Duration::from_secs(5400) + Duration::from_millis(250);
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }

    mod log_events {
        use super::*;

        #[test]
        fn parses_case_insensitively() {
            assert_eq!("Tasks".parse::<LogEvents>().unwrap(), LogEvents::Tasks);
            assert_eq!("NOTHING".parse::<LogEvents>().unwrap(), LogEvents::Nothing);
            assert_eq!(
                "everything".parse::<LogEvents>().unwrap(),
                LogEvents::Everything
            );
        }

        #[test]
        fn rejects_unknown_level() {
            assert!(matches!(
                "verbose".parse::<LogEvents>(),
                Err(ConfigError::InvalidLogEvents { .. })
            ));
        }

        #[test]
        fn default_is_tasks() {
            assert_eq!(LogEvents::default(), LogEvents::Tasks);
        }

        #[test]
        fn serializes_lowercase() {
            let json = serde_json::to_string(&LogEvents::Everything).unwrap();
            assert_eq!(json, r#""everything""#);

            let parsed: LogEvents = serde_json::from_str(r#""Tasks""#).unwrap();
            assert_eq!(parsed, LogEvents::Tasks);
        }
    }

    #[test]
    fn flag_value_reports_kind() {
        assert_eq!(FlagValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(FlagValue::from(3_i64).kind(), ValueKind::Int);
        assert_eq!(FlagValue::from("x").kind(), ValueKind::Str);
        assert_eq!(
            FlagValue::from(Duration::from_secs(1)).kind(),
            ValueKind::Duration
        );
    }
}
