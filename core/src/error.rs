//! Error types for command resolution.
//!
//! Flag parsing failures, configuration problems, user callback errors and
//! composite hook failures all surface as the crate-wide [`Error`].

use std::fmt;

use thiserror::Error;

use crate::validate::ValidationError;

/// Errors produced while binding tokens against a flag table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A flag-shaped token names no declared flag.
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),
    /// A value-taking flag appeared last with no `=value` suffix.
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    /// The value could not be converted to the flag's kind.
    #[error("invalid value {value:?} for flag -{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
    /// The same flag was supplied through two of its names.
    #[error("cannot use two forms of the same flag: {0} {1}")]
    ConflictingForms(String, String),
    /// Two declarations in one table share a name.
    #[error("flag redefined: {0}")]
    DuplicateName(String),
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Command-line tokens did not match the level's flags.
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// The command tree is misconfigured.
    #[error("invalid command tree: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    /// Failure raised by an action or hook.
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    /// A help template could not be compiled or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration file could not be decoded.
    #[error("config error: {0}")]
    Config(String),

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Several errors raised by one level (e.g. action and After hook).
    #[error("{}", MultiDisplay(.0))]
    Multiple(Vec<Error>),
}

impl Error {
    /// Wraps an arbitrary message or error for returning from a callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::Error;
    ///
    /// let err = Error::custom("deploy target unreachable");
    /// assert_eq!(err.to_string(), "deploy target unreachable");
    /// ```
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Custom(err.into())
    }

    /// Merges two errors into a composite, flattening nested composites.
    pub fn combine(first: Error, second: Error) -> Error {
        let mut errors = Vec::new();
        for err in [first, second] {
            match err {
                Error::Multiple(inner) => errors.extend(inner),
                other => errors.push(other),
            }
        }
        Error::Multiple(errors)
    }

    /// Members of a composite, or a single-element slice otherwise.
    pub fn errors(&self) -> &[Error] {
        match self {
            Error::Multiple(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }
}

struct MultiDisplay<'a>(&'a [Error]);

impl fmt::Display for MultiDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_flattens_and_keeps_order() {
        let nested = Error::combine(Error::custom("a"), Error::custom("b"));
        let err = Error::combine(nested, Error::custom("c"));

        assert_eq!(err.errors().len(), 3);
        assert_eq!(err.to_string(), "a\nb\nc");
    }

    #[test]
    fn test_flag_error_is_transparent() {
        let err = Error::from(FlagError::UnknownFlag("x".into()));
        assert_eq!(err.to_string(), "flag provided but not defined: -x");
    }
}
