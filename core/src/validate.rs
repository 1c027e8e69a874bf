//! Command tree validation.
//!
//! Catches structural mistakes in an [`App`]'s declarations before any
//! token is parsed: empty or malformed names, flags or commands sharing a
//! name within one scope, and defaults of the wrong kind.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let app = App::new("deploy").flag(FlagSpec::bool("verbose").alias("V"));
//! assert!(validate_app(&app).is_empty());
//!
//! // Invalid: two flags claim "-V"
//! let bad = App::new("deploy")
//!     .flag(FlagSpec::bool("verbose").alias("V"))
//!     .flag(FlagSpec::string("version-file").alias("V"));
//! assert!(!validate_app(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{App, Command, FlagSpec};

/// Command tree validation errors.
///
/// Each variant describes one structural problem. The `Display` impl
/// names the offending item together with the command path it lives under.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// App or command name is empty or whitespace-only.
    #[error("command name cannot be empty (under {0:?})")]
    EmptyCommandName(String),
    /// A flag name or alias is empty.
    #[error("flag name cannot be empty (in {0:?})")]
    EmptyFlagName(String),
    /// A flag name carries a leading dash or an `=`.
    #[error("invalid flag name {name:?} in {scope:?}: names are declared without dashes or '='")]
    InvalidFlagName { scope: String, name: String },
    /// Two flags in the same scope share a name or alias.
    #[error("duplicate flag {name:?} in {scope:?}")]
    DuplicateFlag { scope: String, name: String },
    /// Two sibling commands share a name or alias.
    #[error("duplicate command {name:?} under {scope:?}")]
    DuplicateCommand { scope: String, name: String },
    /// A declared default does not match the flag's kind.
    #[error("default for flag {name:?} in {scope:?} is a {found}, expected {expected}")]
    DefaultKindMismatch {
        scope: String,
        name: String,
        expected: String,
        found: String,
    },
}

/// Validates an app and every command beneath it.
///
/// Reports the first problem found in each scope, walking the tree depth
/// first.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let app = App::new("git")
///     .command(Command::new("remote").subcommand(Command::new("add")))
///     .command(Command::new("commit").alias("ci"));
/// assert!(validate_app(&app).is_empty());
///
/// let app = App::new("git")
///     .command(Command::new("commit").alias("ci"))
///     .command(Command::new("ci"));
/// let errors = validate_app(&app);
/// assert!(matches!(errors[0], ValidationError::DuplicateCommand { .. }));
/// ```
pub fn validate_app(app: &App) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if app.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName(String::new()));
        return errors;
    }

    errors.extend(validate_flags(&app.name, &app.flags));

    let mut path = vec![app.name.clone()];
    errors.extend(validate_commands(&app.commands, &mut path));

    errors
}

fn validate_commands(commands: &[Command], path: &mut Vec<String>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let scope = path.join(" ");

    for command in commands {
        if command.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCommandName(scope));
            return errors;
        }

        for name in command.names() {
            if name.trim().is_empty() {
                errors.push(ValidationError::EmptyCommandName(scope));
                return errors;
            }
            if !seen.insert(name) {
                errors.push(ValidationError::DuplicateCommand {
                    scope,
                    name: name.to_string(),
                });
                return errors;
            }
        }

        path.push(command.name.clone());
        errors.extend(validate_flags(&path.join(" "), &command.flags));
        errors.extend(validate_commands(&command.subcommands, path));
        path.pop();
    }

    errors
}

fn validate_flags(scope: &str, flags: &[FlagSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for flag in flags {
        for name in flag.names() {
            if name.trim().is_empty() {
                errors.push(ValidationError::EmptyFlagName(scope.to_string()));
                return errors;
            }
            if name.starts_with('-') || name.contains('=') {
                errors.push(ValidationError::InvalidFlagName {
                    scope: scope.to_string(),
                    name: name.to_string(),
                });
                return errors;
            }
            if !seen.insert(name) {
                errors.push(ValidationError::DuplicateFlag {
                    scope: scope.to_string(),
                    name: name.to_string(),
                });
                return errors;
            }
        }

        if let Some(default) = &flag.default {
            if default.kind() != flag.kind {
                errors.push(ValidationError::DefaultKindMismatch {
                    scope: scope.to_string(),
                    name: flag.name.clone(),
                    expected: flag.kind.to_string(),
                    found: default.kind().to_string(),
                });
                return errors;
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_alias_across_flags() {
        let app = App::new("tool")
            .flag(FlagSpec::string("name").alias("n"))
            .flag(FlagSpec::int("num").alias("n"));

        assert_eq!(
            validate_app(&app),
            vec![ValidationError::DuplicateFlag {
                scope: "tool".to_string(),
                name: "n".to_string(),
            }]
        );
    }

    #[test]
    fn test_rejects_dashed_flag_name() {
        let app = App::new("tool").flag(FlagSpec::bool("--verbose"));

        assert!(matches!(
            validate_app(&app)[0],
            ValidationError::InvalidFlagName { .. }
        ));
    }

    #[test]
    fn test_rejects_sibling_short_name_clash() {
        let app = App::new("tool")
            .command(Command::new("status").short_name("s"))
            .command(Command::new("stash").alias("s"));

        assert_eq!(
            validate_app(&app),
            vec![ValidationError::DuplicateCommand {
                scope: "tool".to_string(),
                name: "s".to_string(),
            }]
        );
    }

    #[test]
    fn test_nested_scope_is_reported_with_path() {
        let app = App::new("tool").command(
            Command::new("db").subcommand(
                Command::new("migrate")
                    .flag(FlagSpec::bool("dry-run"))
                    .flag(FlagSpec::bool("dry-run")),
            ),
        );

        assert_eq!(
            validate_app(&app),
            vec![ValidationError::DuplicateFlag {
                scope: "tool db migrate".to_string(),
                name: "dry-run".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_name_in_different_scopes_is_fine() {
        let app = App::new("tool")
            .flag(FlagSpec::bool("verbose"))
            .command(Command::new("run").flag(FlagSpec::bool("verbose")))
            .command(Command::new("build").subcommand(Command::new("run")));

        assert!(validate_app(&app).is_empty());
    }

    #[test]
    fn test_rejects_default_of_wrong_kind() {
        let app = App::new("tool").flag(FlagSpec::int("port").with_default("80"));

        assert!(matches!(
            validate_app(&app)[0],
            ValidationError::DefaultKindMismatch { .. }
        ));
    }
}
