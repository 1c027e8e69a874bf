//! Flag declarations.
//!
//! A [`FlagSpec`] names one flag (a primary name plus aliases, all bound to
//! the same value), its [`FlagKind`], an optional default, and a usage line.
//! Names are declared without leading dashes; both `-name` and `--name`
//! are accepted on the command line.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{FlagKind, FlagValue};

/// Declaration of a single flag.
///
/// Use the per-kind constructors and chain builder methods.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagKind, FlagSpec, FlagValue};
///
/// let name = FlagSpec::string("name")
///     .alias("n")
///     .with_default("world")
///     .with_usage("who to greet");
///
/// assert_eq!(name.kind, FlagKind::String);
/// assert!(name.matches("n"));
/// assert_eq!(name.default_value(), FlagValue::String("world".into()));
/// assert_eq!(name.names().collect::<Vec<_>>(), vec!["name", "n"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Primary name (e.g. "name")
    pub name: String,
    /// Alternate names bound to the same value (e.g. "n")
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Kind of value this flag accepts
    pub kind: FlagKind,
    /// Value used when the flag is not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FlagValue>,
    /// Description shown in help output
    #[serde(default)]
    pub usage: String,
    /// Omit from help output
    #[serde(default)]
    pub hidden: bool,
}

impl FlagSpec {
    /// Creates a flag of the given kind with no aliases or default.
    pub fn new(name: &str, kind: FlagKind) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            kind,
            default: None,
            usage: String::new(),
            hidden: false,
        }
    }

    /// Creates a boolean switch.
    pub fn bool(name: &str) -> Self {
        Self::new(name, FlagKind::Bool)
    }

    /// Creates a string flag.
    pub fn string(name: &str) -> Self {
        Self::new(name, FlagKind::String)
    }

    /// Creates an integer flag.
    pub fn int(name: &str) -> Self {
        Self::new(name, FlagKind::Int)
    }

    /// Creates a duration flag.
    pub fn duration(name: &str) -> Self {
        Self::new(name, FlagKind::Duration)
    }

    /// Creates a repeatable string flag.
    pub fn string_list(name: &str) -> Self {
        Self::new(name, FlagKind::StringList)
    }

    /// The built-in `--help` / `-h` switch.
    pub fn help() -> Self {
        Self::bool("help").alias("h").with_usage("show help")
    }

    /// The built-in `--version` / `-v` switch.
    pub fn version() -> Self {
        Self::bool("version")
            .alias("v")
            .with_usage("print the version")
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the default value.
    ///
    /// A default whose kind differs from the declared kind is reported by
    /// [`validate_app`](crate::validate_app).
    pub fn with_default(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the usage description.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Hides the flag from help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Primary name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Checks if `name` is the primary name or one of the aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// The declared default, or the kind's zero value.
    pub fn default_value(&self) -> FlagValue {
        match &self.default {
            Some(value) if value.kind() == self.kind => value.clone(),
            _ => FlagValue::zero(self.kind),
        }
    }
}

/// Renders the help line, e.g. `--name value, -n value\twho to greet (default: "world")`.
impl fmt::Display for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placeholder = self.kind.placeholder();
        let forms: Vec<String> = self
            .names()
            .map(|name| {
                let dashes = if name.chars().count() == 1 { "-" } else { "--" };
                match placeholder {
                    Some(p) => format!("{dashes}{name} {p}"),
                    None => format!("{dashes}{name}"),
                }
            })
            .collect();
        write!(f, "{}\t{}", forms.join(", "), self.usage)?;

        let default = self.default_value();
        if !default.is_zero() {
            write!(f, " (default: {default})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_default_falls_back_to_zero_on_kind_mismatch() {
        let flag = FlagSpec::int("port").with_default("eighty");
        assert_eq!(flag.default_value(), FlagValue::Int(0));
    }

    #[test]
    fn test_display_help_line() {
        let flag = FlagSpec::string("name")
            .alias("n")
            .with_usage("who to greet")
            .with_default("world");
        assert_eq!(
            flag.to_string(),
            "--name value, -n value\twho to greet (default: \"world\")"
        );
    }

    #[test]
    fn test_display_bool_has_no_placeholder() {
        assert_eq!(FlagSpec::help().to_string(), "--help, -h\tshow help");
    }

    #[test]
    fn test_display_duration_default() {
        let flag = FlagSpec::duration("timeout").with_default(Duration::from_secs(5));
        assert_eq!(flag.to_string(), "--timeout duration\t (default: 5s)");
    }

    #[test]
    fn test_deserialize_from_json() {
        let flag: FlagSpec = serde_json::from_str(
            r#"{"name": "tag", "aliases": ["t"], "kind": "string_list", "usage": "tags"}"#,
        )
        .unwrap();
        assert_eq!(flag.kind, FlagKind::StringList);
        assert!(flag.matches("t"));
        assert_eq!(flag.default_value(), FlagValue::StringList(Vec::new()));
    }
}
