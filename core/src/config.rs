//! Help template configuration.
//!
//! Templates are plain configuration handed to a
//! [`TemplateRenderer`](crate::TemplateRenderer) when it is built. They can be
//! constructed in code or loaded from a YAML or JSON file.
//!
//! # Example YAML
//!
//! ```yaml
//! app_help: |
//!   {{name}} {{version}}
//!   {{commands}}
//! command_help: |
//!   {{name}}{{#options}}
//!   {{options}}{{/options}}
//! ```
//!
//! Omitted keys keep their defaults.

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default template for the application's help page.
pub const APP_HELP_TEMPLATE: &str = "\
{{name}} {{version}}{{#usage}}

{{usage}}{{/usage}}

Usage:
  {{name}}{{#options}} [<options>]{{/options}} <command> [<arguments>]
{{#options}}
Options:
{{options}}{{/options}}
Commands:
{{commands}}";

/// Default template for a single command's help page.
pub const COMMAND_HELP_TEMPLATE: &str = "\
{{name}}{{#usage}}

{{usage}}{{/usage}}

Usage:
  {{name}}{{#options}} [<options>]{{/options}} [<arguments>]
{{#options}}
Options:
{{options}}{{/options}}{{#description}}
Description:
  {{description}}
{{/description}}";

/// Default template for a command that has its own subcommands.
pub const SUBCOMMAND_HELP_TEMPLATE: &str = "\
{{name}}{{#usage}}

{{usage}}{{/usage}}

Usage:
  {{name}} <command>{{#options}} [<options>]{{/options}} [<arguments>]
{{#options}}
Options:
{{options}}{{/options}}
Commands:
{{commands}}";

/// The three help templates.
///
/// # Examples
///
/// ```
/// use cmdtree_core::HelpTemplates;
///
/// let templates: HelpTemplates =
///     serde_json::from_str(r#"{"app_help": "{{name}}\n"}"#).unwrap();
/// assert_eq!(templates.app_help, "{{name}}\n");
/// assert_eq!(templates.command_help, HelpTemplates::default().command_help);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpTemplates {
    pub app_help: String,
    pub command_help: String,
    pub subcommand_help: String,
}

impl Default for HelpTemplates {
    fn default() -> Self {
        Self {
            app_help: APP_HELP_TEMPLATE.to_string(),
            command_help: COMMAND_HELP_TEMPLATE.to_string(),
            subcommand_help: SUBCOMMAND_HELP_TEMPLATE.to_string(),
        }
    }
}

impl HelpTemplates {
    /// Loads templates from a `.json`, `.yml` or `.yaml` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Config`] if it cannot be decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_reader(reader)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
        } else {
            serde_yaml::from_reader(reader)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_yaml_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "subcommand_help: \"{{{{name}}}} only\\n\"").unwrap();

        let templates = HelpTemplates::load(file.path()).unwrap();
        assert_eq!(templates.subcommand_help, "{{name}} only\n");
        assert_eq!(templates.app_help, APP_HELP_TEMPLATE);
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"command_help": "{{{{name}}}}"}}"#).unwrap();

        let templates = HelpTemplates::load(file.path()).unwrap();
        assert_eq!(templates.command_help, "{{name}}");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();

        let err = HelpTemplates::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = HelpTemplates::load("/nonexistent/templates.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
