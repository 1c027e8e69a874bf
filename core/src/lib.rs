//! Nested-subcommand command-line applications.
//!
//! This crate resolves a command line against a tree of commands:
//!
//! - [`App`]: the root of the tree, with top-level flags, hooks, version and
//!   output sink.
//! - [`Command`]: a named node with aliases, flags, Before/After hooks, an
//!   action and optional subcommands.
//! - [`FlagSpec`] / [`FlagTable`]: typed flag declarations and the parsed
//!   values for one level.
//! - [`Context`]: what an action sees: its own flags and positionals, plus
//!   `global_*` lookups that walk outward to enclosing levels.
//!
//! Help flags, the version flag and the `help` command are provided
//! automatically and rendered through a [`HelpRenderer`], by default the
//! template-driven [`TemplateRenderer`].
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let (output, captured) = Output::capture();
//! let app = App::new("git")
//!     .flag(FlagSpec::bool("verbose"))
//!     .command(
//!         Command::new("remote").subcommand(
//!             Command::new("add")
//!                 .flag(FlagSpec::bool("fetch").alias("f"))
//!                 .action(|ctx| {
//!                     writeln!(
//!                         ctx.output(),
//!                         "{} {:?} fetch={} verbose={}",
//!                         ctx.full_name(),
//!                         ctx.args().as_slice(),
//!                         ctx.bool("fetch"),
//!                         ctx.global_bool("verbose"),
//!                     )?;
//!                     Ok(())
//!                 }),
//!         ),
//!     )
//!     .with_output(output);
//!
//! app.run(["git", "--verbose", "remote", "add", "origin", "-f"]).unwrap();
//! assert_eq!(
//!     captured.contents(),
//!     "git remote add [\"origin\"] fetch=true verbose=true\n"
//! );
//! ```

mod app;
mod command;
mod config;
mod context;
mod error;
mod flag;
mod help;
mod output;
mod peek;
mod prompt;
mod resolve;
mod table;
mod validate;
mod value;

pub use app::{App, Author};
pub use command::{Action, Command, NotFoundHandler};
pub use config::{
    APP_HELP_TEMPLATE, COMMAND_HELP_TEMPLATE, HelpTemplates, SUBCOMMAND_HELP_TEMPLATE,
};
pub use context::{Args, Context};
pub use error::{Error, FlagError, Result};
pub use flag::FlagSpec;
pub use help::{
    CommandEntry, HelpData, HelpRenderer, HelpTemplate, TemplateRenderer, show_app_help,
    show_command_help, show_help, show_version, write_command_names,
};
pub use output::{Captured, Output};
pub use peek::{get_bool_flag_value, get_string_flag_value};
pub use prompt::Question;
pub use table::{FlagTable, ParseMode, Split, TERMINATOR, split_tokens};
pub use validate::{ValidationError, validate_app};
pub use value::{FlagKind, FlagValue, parse_duration};
