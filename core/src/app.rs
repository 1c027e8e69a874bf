//! The root of a command tree.
//!
//! An [`App`] is the top-level command: it carries process-wide identity
//! (name, version, compile time), the output sink, the help renderer and the
//! command-not-found handler, and is the entry point for resolution.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::command::{Action, Command, NotFoundHandler, find_command};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::flag::FlagSpec;
use crate::help::{HelpRenderer, TemplateRenderer};
use crate::output::Output;
use crate::resolve;
use crate::validate::validate_app;

/// Someone who has contributed to an application.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Author;
///
/// let author = Author::new("Ada", "ada@example.com");
/// assert_eq!(author.to_string(), "Ada <ada@example.com> ");
/// assert_eq!(Author::new("Bob", "").to_string(), "Bob ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{} ", self.name)
        } else {
            write!(f, "{} <{}> ", self.name, self.email)
        }
    }
}

/// A command-line application.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{App, Command, FlagSpec, Output};
///
/// let (output, captured) = Output::capture();
/// let app = App::new("greet")
///     .version("1.2.0")
///     .flag(FlagSpec::bool("loud"))
///     .command(
///         Command::new("hello")
///             .flag(FlagSpec::string("name").alias("n").with_default("world"))
///             .action(|ctx| {
///                 let greeting = format!("Hello {}", ctx.string("name"));
///                 if ctx.global_bool("loud") {
///                     writeln!(ctx.output(), "{}!", greeting.to_uppercase())?;
///                 } else {
///                     writeln!(ctx.output(), "{greeting}")?;
///                 }
///                 Ok(())
///             }),
///     )
///     .with_output(output);
///
/// app.run(["greet", "--loud", "hello", "-n", "Jeremy"]).unwrap();
/// assert_eq!(captured.contents(), "HELLO JEREMY!\n");
/// ```
pub struct App {
    /// Program name; defaults to the executable's file name
    pub name: String,
    /// One-line description
    pub usage: String,
    /// Version string printed by `--version`
    pub version: String,
    /// Short informational blurb
    pub short_info: String,
    pub authors: Vec<Author>,
    /// Top-level commands
    pub commands: Vec<Command>,
    /// Top-level flags
    pub flags: Vec<FlagSpec>,
    /// Suppress the built-in help flag and help command
    pub hide_help: bool,
    /// Suppress the built-in version flag
    pub hide_version: bool,
    /// Runs after flag parsing and before dispatch; an error aborts the run
    pub before: Option<Action>,
    /// Runs once the top level finishes, on every exit path
    pub after: Option<Action>,
    /// Runs when no command is named; shows help when unset
    pub action: Option<Action>,
    /// Invoked with the unmatched name when no command matches
    pub command_not_found: Option<NotFoundHandler>,
    /// Approximate build time of the running binary
    pub compiled: DateTime<Local>,
    output: Output,
    renderer: Box<dyn HelpRenderer>,
}

impl App {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: String::new(),
            version: "0.0.0".to_string(),
            short_info: String::new(),
            authors: Vec::new(),
            commands: Vec::new(),
            flags: Vec::new(),
            hide_help: false,
            hide_version: false,
            before: None,
            after: None,
            action: None,
            command_not_found: None,
            compiled: compile_time(),
            output: Output::stdout(),
            renderer: Box::new(TemplateRenderer::default()),
        }
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn short_info(mut self, info: &str) -> Self {
        self.short_info = info.to_string();
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn hide_help(mut self) -> Self {
        self.hide_help = true;
        self
    }

    pub fn hide_version(mut self) -> Self {
        self.hide_version = true;
        self
    }

    pub fn action(mut self, action: impl Fn(&Context<'_>) -> Result<()> + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn before(mut self, hook: impl Fn(&Context<'_>) -> Result<()> + 'static) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after(mut self, hook: impl Fn(&Context<'_>) -> Result<()> + 'static) -> Self {
        self.after = Some(Box::new(hook));
        self
    }

    pub fn on_command_not_found(
        mut self,
        handler: impl Fn(&Context<'_>, &str) + 'static,
    ) -> Self {
        self.command_not_found = Some(Box::new(handler));
        self
    }

    /// Replaces the output sink.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Replaces the help and version renderer.
    pub fn with_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub(crate) fn renderer(&self) -> &dyn HelpRenderer {
        self.renderer.as_ref()
    }

    /// Finds a top-level command by name or alias.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        find_command(&self.commands, name)
    }

    /// Resolves `args` against the command tree and runs the matched action.
    ///
    /// The first element is the program path and is discarded. Returns the
    /// single terminal error of the run, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the tree is misconfigured, and
    /// otherwise whatever the flag parser, hooks or actions produced.
    pub fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let errors = validate_app(self);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let tokens: Vec<String> = args.into_iter().skip(1).map(Into::into).collect();
        let outcome = resolve::run(self, &tokens);
        let flushed = self.output.flush();
        outcome?;
        flushed.map_err(Error::from)
    }

    /// Runs with the process arguments, exiting with status 1 on failure.
    pub fn run_and_exit(&self) {
        if let Err(err) = self.run(std::env::args()) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

impl Default for App {
    /// An app named after the running executable.
    fn default() -> Self {
        let name = std::env::args()
            .next()
            .as_deref()
            .and_then(|arg0| Path::new(arg0).file_name())
            .and_then(|file| file.to_str())
            .map(String::from)
            .unwrap_or_else(|| "app".to_string());
        Self::new(&name)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("commands", &self.commands)
            .field("flags", &self.flags)
            .field("hide_help", &self.hide_help)
            .field("hide_version", &self.hide_version)
            .field("compiled", &self.compiled)
            .finish_non_exhaustive()
    }
}

/// Modification time of the running executable, or now if unavailable.
fn compile_time() -> DateTime<Local> {
    std::env::current_exe()
        .and_then(std::fs::metadata)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_app_defaults() {
        let app = App::new("tool");
        assert_eq!(app.version, "0.0.0");
        assert!(app.action.is_none());
        assert!(app.compiled <= Local::now());
    }

    #[test]
    fn test_run_rejects_invalid_tree_before_parsing() {
        let app = App::new("tool")
            .command(Command::new("a"))
            .command(Command::new("a"))
            .with_output(Output::capture().0);

        let err = app.run(["tool", "--bogus"]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_find_command_by_alias() {
        let app = App::new("tool").command(Command::new("install").alias("i"));
        assert_eq!(app.find_command("i").map(|c| c.name.as_str()), Some("install"));
        assert!(app.find_command("x").is_none());
    }
}
