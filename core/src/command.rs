//! Command tree nodes.
//!
//! A [`Command`] is a named unit of behavior with its own flags, optional
//! nested subcommands, lifecycle hooks and an action. Commands own their
//! children outright; the resolver walks the tree by reference.

use std::fmt;

use crate::context::Context;
use crate::error::Result;
use crate::flag::FlagSpec;

/// Callback run as a command's action or as a Before/After hook.
pub type Action = Box<dyn Fn(&Context<'_>) -> Result<()>>;

/// Callback invoked with the unmatched name when no child command matches.
pub type NotFoundHandler = Box<dyn Fn(&Context<'_>, &str)>;

/// A subcommand.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, FlagSpec};
///
/// let remote = Command::new("remote")
///     .usage("Manage tracked repositories")
///     .subcommand(
///         Command::new("add")
///             .flag(FlagSpec::bool("fetch").alias("f"))
///             .action(|ctx| {
///                 println!("adding {}", ctx.args().first().unwrap_or_default());
///                 Ok(())
///             }),
///     )
///     .subcommand(Command::new("remove").alias("rm"));
///
/// assert!(remote.find_subcommand("rm").is_some());
/// assert!(remote.has_subcommands());
/// ```
#[derive(Default)]
pub struct Command {
    /// Name used to invoke the command
    pub name: String,
    /// Single short name (e.g. "s" for "status")
    pub short_name: Option<String>,
    /// Additional names
    pub aliases: Vec<String>,
    /// One-line summary shown in command lists
    pub usage: String,
    /// Longer explanation shown in the command's own help
    pub description: String,
    /// Runs after flag parsing and before dispatch; an error aborts the level
    pub before: Option<Action>,
    /// Runs once the level finishes, on every exit path
    pub after: Option<Action>,
    /// The command's behavior
    pub action: Option<Action>,
    /// Nested commands
    pub subcommands: Vec<Command>,
    /// Flags scoped to this command
    pub flags: Vec<FlagSpec>,
    /// Treat every token after the name as a positional argument
    pub skip_flag_parsing: bool,
    /// Suppress the built-in help flag and help subcommand
    pub hide_help: bool,
    /// Template overriding the default command help
    pub help_template: Option<String>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn short_name(mut self, short: &str) -> Self {
        self.short_name = Some(short.to_string());
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
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

    pub fn skip_flag_parsing(mut self) -> Self {
        self.skip_flag_parsing = true;
        self
    }

    pub fn hide_help(mut self) -> Self {
        self.hide_help = true;
        self
    }

    pub fn help_template(mut self, template: &str) -> Self {
        self.help_template = Some(template.to_string());
        self
    }

    /// Primary name, then the short name, then aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.short_name.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
    }

    /// Checks if `name` exactly matches the name, short name or an alias.
    pub fn has_name(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Finds a direct child by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        find_command(&self.subcommands, name)
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// A command with children or hooks is resolved as a nested app level;
    /// anything else is a leaf.
    pub(crate) fn is_nested(&self) -> bool {
        self.has_subcommands() || self.before.is_some() || self.after.is_some()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("aliases", &self.aliases)
            .field("usage", &self.usage)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands)
            .field("skip_flag_parsing", &self.skip_flag_parsing)
            .field("hide_help", &self.hide_help)
            .finish_non_exhaustive()
    }
}

pub(crate) fn find_command<'a>(commands: &'a [Command], name: &str) -> Option<&'a Command> {
    commands.iter().find(|c| c.has_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_order() {
        let cmd = Command::new("status").short_name("s").alias("st");
        assert_eq!(cmd.names().collect::<Vec<_>>(), vec!["status", "s", "st"]);
    }

    #[test]
    fn test_has_name_is_exact() {
        let cmd = Command::new("status").alias("st");
        assert!(cmd.has_name("st"));
        assert!(!cmd.has_name("stat"));
        assert!(!cmd.has_name("STATUS"));
    }

    #[test]
    fn test_hooks_make_command_nested() {
        assert!(!Command::new("leaf").is_nested());
        assert!(Command::new("hooked").after(|_| Ok(())).is_nested());
        assert!(
            Command::new("parent")
                .subcommand(Command::new("child"))
                .is_nested()
        );
    }
}
