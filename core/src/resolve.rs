//! Recursive command resolution.
//!
//! Each depth of the command tree is one [`Level`]: a lightweight frame of
//! borrowed references into the tree plus the accumulated name path. The
//! resolver parses the level's flags, builds its [`Context`] chained to the
//! parent, then either descends into a matched child or runs the level's
//! action.
//!
//! - The app root and any command with subcommands or hooks are resolved as
//!   app levels: flags are taken from the front of the tokens
//!   ([`ParseMode::Leading`]), the built-in help command is available, and
//!   Before/After hooks wrap dispatch.
//! - Any other command is a leaf: its flags may follow positionals
//!   ([`ParseMode::Split`]) and its action runs directly.
//!
//! Built-in help flags and commands are never written into the tree; each
//! level derives its effective flag list when it is entered.

use scopeguard::ScopeGuard;
use tracing::{debug, warn};

use crate::app::App;
use crate::command::{Action, Command, find_command};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::flag::FlagSpec;
use crate::help;
use crate::table::{FlagTable, ParseMode, TERMINATOR};

/// Names of the built-in help command.
pub(crate) const HELP_COMMAND_NAMES: [&str; 2] = ["help", "h"];

/// Summary of the built-in help command.
pub(crate) const HELP_COMMAND_USAGE: &str = "Shows a list of commands or help for one command";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LevelKind {
    Root,
    Nested,
    Leaf,
}

/// One frame of resolution.
pub(crate) struct Level<'a> {
    pub(crate) kind: LevelKind,
    pub(crate) path: String,
    pub(crate) usage: &'a str,
    pub(crate) description: &'a str,
    pub(crate) commands: &'a [Command],
    pub(crate) flags: &'a [FlagSpec],
    pub(crate) before: Option<&'a Action>,
    pub(crate) after: Option<&'a Action>,
    pub(crate) action: Option<&'a Action>,
    pub(crate) command: Option<&'a Command>,
    pub(crate) hide_help: bool,
    pub(crate) skip_flag_parsing: bool,
    pub(crate) show_version: bool,
}

impl<'a> Level<'a> {
    fn root(app: &'a App) -> Self {
        Self {
            kind: LevelKind::Root,
            path: app.name.clone(),
            usage: &app.usage,
            description: "",
            commands: &app.commands,
            flags: &app.flags,
            before: app.before.as_ref(),
            after: app.after.as_ref(),
            action: app.action.as_ref(),
            command: None,
            hide_help: app.hide_help,
            skip_flag_parsing: false,
            show_version: !app.hide_version,
        }
    }

    pub(crate) fn for_command(command: &'a Command, path: String) -> Self {
        let kind = if command.is_nested() {
            LevelKind::Nested
        } else {
            LevelKind::Leaf
        };
        Self {
            kind,
            path,
            usage: &command.usage,
            description: &command.description,
            commands: &command.subcommands,
            flags: &command.flags,
            before: command.before.as_ref(),
            after: command.after.as_ref(),
            action: command.action.as_ref(),
            command: Some(command),
            hide_help: command.hide_help,
            skip_flag_parsing: command.skip_flag_parsing,
            show_version: false,
        }
    }

    /// Frame for the built-in help command invoked under `parent`.
    fn builtin_help(parent: &Level<'a>) -> Self {
        Self {
            kind: LevelKind::Leaf,
            path: format!("{} {}", parent.path, HELP_COMMAND_NAMES[0]),
            usage: HELP_COMMAND_USAGE,
            description: "",
            commands: &[],
            flags: &[],
            before: None,
            after: None,
            action: None,
            command: None,
            hide_help: false,
            skip_flag_parsing: false,
            show_version: false,
        }
    }

    /// Returns `true` if this level lists its children in help output.
    pub(crate) fn lists_commands(&self) -> bool {
        self.kind == LevelKind::Root || !self.commands.is_empty()
    }

    /// Names under which the built-in help command answers at this level.
    pub(crate) fn help_command_names(&self) -> Vec<&'static str> {
        if self.hide_help || self.kind == LevelKind::Leaf || !self.lists_commands() {
            return Vec::new();
        }
        HELP_COMMAND_NAMES
            .into_iter()
            .filter(|name| find_command(self.commands, name).is_none())
            .collect()
    }

    fn effective_flags(&self) -> Vec<FlagSpec> {
        with_builtin_flags(self.flags, !self.hide_help, self.show_version)
    }

    fn parse_mode(&self) -> ParseMode {
        match (self.skip_flag_parsing, self.kind) {
            (true, _) => ParseMode::Skip,
            (false, LevelKind::Leaf) => ParseMode::Split,
            (false, _) => ParseMode::Leading,
        }
    }
}

/// Appends the built-in help and version switches to `flags`.
///
/// A built-in is skipped when its primary name is already declared, and
/// contributes only those aliases that are still free.
pub(crate) fn with_builtin_flags(flags: &[FlagSpec], help: bool, version: bool) -> Vec<FlagSpec> {
    let mut specs = flags.to_vec();
    let builtins = [(help, FlagSpec::help()), (version, FlagSpec::version())];
    for (enabled, mut builtin) in builtins {
        if !enabled || specs.iter().any(|spec| spec.matches(&builtin.name)) {
            continue;
        }
        builtin
            .aliases
            .retain(|alias| !specs.iter().any(|spec| spec.matches(alias)));
        specs.push(builtin);
    }
    specs
}

/// Resolves `tokens` (program name already removed) against `app`.
pub(crate) fn run(app: &App, tokens: &[String]) -> Result<()> {
    run_level(app, Level::root(app), tokens, None)
}

fn run_level<'a>(
    app: &'a App,
    level: Level<'a>,
    tokens: &[String],
    parent: Option<&'a Context<'a>>,
) -> Result<()> {
    debug!(level = %level.path, kind = ?level.kind, tokens = ?tokens, "Resolving level");

    let ctx = bind_level(app, level, tokens, parent)?;

    if ctx.bool("help") && !ctx.level().hide_help {
        return help::show_help(&ctx);
    }
    if ctx.level().show_version && ctx.bool("version") {
        return help::show_version(&ctx);
    }

    if ctx.level().kind == LevelKind::Leaf {
        return run_leaf_action(&ctx);
    }

    with_hooks(&ctx, || dispatch(&ctx))
}

/// Parses the level's flags and builds its context.
///
/// On a flag error the usage failure and the level's help are written
/// before the error is returned.
fn bind_level<'a>(
    app: &'a App,
    level: Level<'a>,
    tokens: &[String],
    parent: Option<&'a Context<'a>>,
) -> Result<Context<'a>> {
    let specs = level.effective_flags();
    let mode = level.parse_mode();

    match FlagTable::parse(specs.clone(), tokens, mode) {
        Ok((table, positional)) => Ok(Context::new(app, level, table, positional, parent)),
        Err(err) => {
            debug!(level = %level.path, error = %err, "Flag parsing failed");
            let table = FlagTable::new(specs)?;
            let ctx = Context::new(app, level, table, tokens.to_vec(), parent);
            let reported =
                help::write_usage_error(&ctx, &err).and_then(|()| help::show_help(&ctx));
            match reported {
                Ok(()) => Err(err.into()),
                Err(write_err) => Err(Error::combine(err.into(), write_err)),
            }
        }
    }
}

/// Runs the Before hook and `body`, then the After hook on every exit path.
///
/// An After failure is combined with any pending error instead of replacing
/// it. If `body` unwinds, the After hook still runs during the unwind.
fn with_hooks(ctx: &Context<'_>, body: impl FnOnce() -> Result<()>) -> Result<()> {
    let level = ctx.level();
    let Some(after) = level.after else {
        return run_before(ctx).and_then(|()| body());
    };

    let unwind_guard = scopeguard::guard_on_unwind((), |()| {
        if let Err(err) = after(ctx) {
            warn!(level = %level.path, error = %err, "After hook failed during unwind");
        }
    });
    let outcome = run_before(ctx).and_then(|()| body());
    ScopeGuard::into_inner(unwind_guard);

    let after_outcome = after(ctx);
    match (outcome, after_outcome) {
        (Ok(()), after_outcome) => after_outcome,
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(after_err)) => {
            debug!(level = %level.path, "Action and After hook both failed");
            Err(Error::combine(err, after_err))
        }
    }
}

fn run_before(ctx: &Context<'_>) -> Result<()> {
    let Some(before) = ctx.level().before else {
        return Ok(());
    };
    before(ctx).inspect_err(|err| {
        debug!(level = %ctx.full_name(), error = %err, "Before hook aborted level");
    })
}

fn dispatch(ctx: &Context<'_>) -> Result<()> {
    let level = ctx.level();

    if ctx.args().first() == Some(TERMINATOR) {
        debug!(level = %level.path, "Terminator reached; running default action");
    } else if let Some(name) = ctx.args().first() {
        if let Some(child) = find_command(level.commands, name) {
            return run_command(ctx, child);
        }
        if level.help_command_names().iter().any(|help| *help == name) {
            return run_builtin_help(ctx);
        }
        if let Some(not_found) = &ctx.app().command_not_found {
            debug!(level = %level.path, name, "Command not found");
            not_found(ctx, name);
            return Ok(());
        }
        debug!(level = %level.path, name, "No command matched; running default action");
    }

    match level.action {
        Some(action) => action(ctx),
        None => help::show_help(ctx),
    }
}

fn run_command(parent: &Context<'_>, command: &Command) -> Result<()> {
    let path = format!("{} {}", parent.full_name(), command.name);
    if command.is_nested() {
        debug!(command = %path, "Descending into nested command");
    } else {
        debug!(command = %path, "Running leaf command");
    }
    let level = Level::for_command(command, path);
    run_level(parent.app(), level, parent.args().tail(), Some(parent))
}

fn run_leaf_action(ctx: &Context<'_>) -> Result<()> {
    match ctx.level().action {
        Some(action) => action(ctx),
        None => help::show_help(ctx),
    }
}

/// `help [command]` at an app level.
fn run_builtin_help(parent: &Context<'_>) -> Result<()> {
    let level = Level::builtin_help(parent.level());
    let ctx = bind_level(parent.app(), level, parent.args().tail(), Some(parent))?;

    match ctx.args().first() {
        Some(topic) if !ctx.bool("help") => help::show_command_help(parent, topic),
        _ => help::show_help(parent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_flags_respect_declared_names() {
        let declared = [FlagSpec::string("host").alias("h")];
        let specs = with_builtin_flags(&declared, true, true);

        let help = specs.iter().find(|s| s.name == "help").unwrap();
        assert!(help.aliases.is_empty());
        let version = specs.iter().find(|s| s.name == "version").unwrap();
        assert_eq!(version.aliases, vec!["v".to_string()]);
    }

    #[test]
    fn test_builtin_flags_skipped_when_user_declares_help() {
        let declared = [FlagSpec::string("help")];
        let specs = with_builtin_flags(&declared, true, false);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0], declared[0]);
    }

    #[test]
    fn test_help_command_names_yield_to_user_commands() {
        let commands = vec![Command::new("hello").alias("h")];
        let app = App::new("tool");
        let mut level = Level::root(&app);
        level.commands = &commands;

        assert_eq!(level.help_command_names(), vec!["help"]);
    }

    #[test]
    fn test_leaf_and_hidden_levels_have_no_help_command() {
        let leaf = Command::new("leaf");
        let level = Level::for_command(&leaf, "tool leaf".into());
        assert!(level.help_command_names().is_empty());

        let app = App::new("tool").hide_help();
        assert!(Level::root(&app).help_command_names().is_empty());
    }
}
