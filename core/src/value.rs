//! Flag value kinds and their native representations.
//!
//! Every flag declares a [`FlagKind`]. Parsed values are held as a
//! [`FlagValue`], a tagged variant carrying the kind's native Rust type.
//! Typed accessors on [`Context`](crate::Context) read through these and
//! fall back to the kind's zero value on a mismatch instead of failing.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Kind of value a flag accepts.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagKind, FlagValue};
///
/// assert_eq!(FlagKind::Int.parse_value("0x10").unwrap(), FlagValue::Int(16));
/// assert!(FlagKind::Bool.parse_value("maybe").is_err());
/// assert!(!FlagKind::Bool.takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Boolean switch (no value token).
    Bool,
    /// Free-form string.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Time span such as `1h30m` or `250ms`.
    Duration,
    /// Repeatable string; each occurrence appends one element.
    StringList,
}

impl FlagKind {
    /// Returns `true` when the flag consumes a value token.
    pub fn takes_value(self) -> bool {
        !matches!(self, FlagKind::Bool)
    }

    /// Short placeholder used in help output (e.g. `--port value`).
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            FlagKind::Bool => None,
            FlagKind::Duration => Some("duration"),
            FlagKind::String | FlagKind::Int | FlagKind::StringList => Some("value"),
        }
    }

    /// Converts raw text into a value of this kind.
    ///
    /// For [`FlagKind::StringList`] the result is a one-element list; the
    /// flag table appends it to earlier occurrences.
    pub fn parse_value(self, raw: &str) -> Result<FlagValue, String> {
        match self {
            FlagKind::Bool => parse_bool(raw).map(FlagValue::Bool),
            FlagKind::String => Ok(FlagValue::String(raw.to_string())),
            FlagKind::Int => parse_int(raw).map(FlagValue::Int),
            FlagKind::Duration => parse_duration(raw).map(FlagValue::Duration),
            FlagKind::StringList => Ok(FlagValue::StringList(vec![raw.to_string()])),
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlagKind::Bool => "bool",
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Duration => "duration",
            FlagKind::StringList => "string list",
        };
        f.write_str(label)
    }
}

/// A bound flag value.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagKind, FlagValue};
///
/// let zero = FlagValue::zero(FlagKind::StringList);
/// assert_eq!(zero, FlagValue::StringList(Vec::new()));
/// assert!(zero.is_zero());
/// assert_eq!(FlagValue::from("x").kind(), FlagKind::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Int(i64),
    Duration(Duration),
    StringList(Vec<String>),
}

impl FlagValue {
    /// Returns the zero value of a kind.
    pub fn zero(kind: FlagKind) -> Self {
        match kind {
            FlagKind::Bool => FlagValue::Bool(false),
            FlagKind::String => FlagValue::String(String::new()),
            FlagKind::Int => FlagValue::Int(0),
            FlagKind::Duration => FlagValue::Duration(Duration::ZERO),
            FlagKind::StringList => FlagValue::StringList(Vec::new()),
        }
    }

    /// Returns the kind this value belongs to.
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Int(_) => FlagKind::Int,
            FlagValue::Duration(_) => FlagKind::Duration,
            FlagValue::StringList(_) => FlagKind::StringList,
        }
    }

    /// Returns `true` if this is the zero value of its kind.
    pub fn is_zero(&self) -> bool {
        *self == FlagValue::zero(self.kind())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FlagValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FlagValue::StringList(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::String(s) => write!(f, "{s:?}"),
            FlagValue::Int(n) => write!(f, "{n}"),
            FlagValue::Duration(d) => write!(f, "{d:?}"),
            FlagValue::StringList(items) => write!(f, "{items:?}"),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::String(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<Duration> for FlagValue {
    fn from(value: Duration) -> Self {
        FlagValue::Duration(value)
    }
}

impl From<Vec<String>> for FlagValue {
    fn from(value: Vec<String>) -> Self {
        FlagValue::StringList(value)
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}

fn parse_int(raw: &str) -> Result<i64, String> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() || body.starts_with(['+', '-']) {
        return Err(format!("invalid integer {raw:?}"));
    }
    let magnitude =
        i128::from_str_radix(body, radix).map_err(|_| format!("invalid integer {raw:?}"))?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| format!("integer out of range {raw:?}"))
}

const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parses a Go-style duration string such as `1h30m`, `1.5s` or `250ms`.
///
/// A bare `0` is accepted as the zero duration. Negative spans are rejected.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cmdtree_core::parse_duration;
///
/// assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration {raw:?}");
    let text = raw.strip_prefix('+').unwrap_or(raw);
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() || text.starts_with('-') {
        return Err(invalid());
    }

    let mut total_nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let amount: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|ch: char| ch.is_ascii_digit() || ch == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit {unit:?} in duration {raw:?}"))?;
        rest = &rest[unit_len..];

        total_nanos += amount * scale;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration out of range {raw:?}"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_forms() {
        assert_eq!(FlagKind::Bool.parse_value("T"), Ok(FlagValue::Bool(true)));
        assert_eq!(FlagKind::Bool.parse_value("0"), Ok(FlagValue::Bool(false)));
        assert!(FlagKind::Bool.parse_value("yes").is_err());
    }

    #[test]
    fn test_parse_int_radix_and_sign() {
        assert_eq!(parse_int("-42"), Ok(-42));
        assert_eq!(parse_int("0b101"), Ok(5));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert!(parse_int("--1").is_err());
        assert!(parse_int("99999999999999999999").is_err());
        assert!(parse_int("").is_err());
    }

    #[test]
    fn test_parse_duration_compound() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("3us").unwrap(), Duration::from_micros(3));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("s").is_err());
    }

    #[test]
    fn test_string_list_parse_is_single_element() {
        assert_eq!(
            FlagKind::StringList.parse_value("a,b"),
            Ok(FlagValue::StringList(vec!["a,b".to_string()]))
        );
    }
}
