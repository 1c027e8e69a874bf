//! Help and version rendering.
//!
//! The resolver never formats help text itself. It collects a [`HelpData`]
//! snapshot of the level being described and hands it, together with a
//! [`HelpTemplate`] identifier, to the app's [`HelpRenderer`]. The default
//! [`TemplateRenderer`] fills `{{placeholder}}` templates taken from a
//! [`HelpTemplates`] configuration.
//!
//! Template syntax:
//!
//! - `{{name}}`, `{{version}}`, `{{usage}}`, `{{description}}`: plain text.
//! - `{{options}}`, `{{commands}}`: one indented row per visible flag or
//!   command, columns aligned on tab stops.
//! - `{{#field}}...{{/field}}`: emitted only when `field` is non-empty.

use std::io::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::command::{Command, find_command};
use crate::config::HelpTemplates;
use crate::context::Context;
use crate::error::{Error, FlagError, Result};
use crate::flag::FlagSpec;
use crate::resolve::{HELP_COMMAND_USAGE, Level, LevelKind, with_builtin_flags};

/// Identifies which help page is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTemplate {
    /// The application's top-level help.
    AppHelp,
    /// Help for a single command.
    CommandHelp,
    /// Help for a command that has subcommands of its own.
    SubcommandHelp,
}

/// A row in a command listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub names: Vec<String>,
    pub usage: String,
}

impl CommandEntry {
    fn from_command(command: &Command) -> Self {
        Self {
            names: command.names().map(String::from).collect(),
            usage: command.usage.clone(),
        }
    }
}

/// Everything a renderer may show about one app or command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelpData {
    /// Full command path (e.g. `git remote add`)
    pub name: String,
    pub version: String,
    pub usage: String,
    pub description: String,
    /// Visible flags, built-ins included
    pub flags: Vec<FlagSpec>,
    pub commands: Vec<CommandEntry>,
}

/// Renders help pages and version lines.
///
/// Implementations receive an opaque writer; the resolver only cares
/// whether rendering succeeded.
pub trait HelpRenderer {
    /// Renders one of the standard help pages.
    fn render(&self, out: &mut dyn Write, template: HelpTemplate, data: &HelpData) -> Result<()>;

    /// Renders a command's own template override.
    ///
    /// Renderers without template support fall back to the standard command
    /// help page.
    fn render_custom(&self, out: &mut dyn Write, template: &str, data: &HelpData) -> Result<()> {
        let _ = template;
        self.render(out, HelpTemplate::CommandHelp, data)
    }

    /// Writes the version line.
    fn render_version(&self, out: &mut dyn Write, data: &HelpData) -> Result<()> {
        writeln!(out, "{} version {}", data.name, data.version)?;
        Ok(())
    }
}

/// Renderer driven by [`HelpTemplates`].
///
/// # Examples
///
/// ```
/// use cmdtree_core::{HelpData, HelpRenderer, HelpTemplate, HelpTemplates, TemplateRenderer};
///
/// let templates = HelpTemplates {
///     app_help: "{{name}}{{#usage}}: {{usage}}{{/usage}}\n".into(),
///     ..HelpTemplates::default()
/// };
/// let renderer = TemplateRenderer::new(templates).unwrap();
///
/// let data = HelpData { name: "tool".into(), ..HelpData::default() };
/// let mut out = Vec::new();
/// renderer.render(&mut out, HelpTemplate::AppHelp, &data).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "tool\n");
///
/// let bad = HelpTemplates { app_help: "{{nmae}}".into(), ..HelpTemplates::default() };
/// assert!(TemplateRenderer::new(bad).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    templates: HelpTemplates,
}

impl TemplateRenderer {
    /// Builds a renderer, rejecting templates that do not compile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for unknown placeholders or unbalanced
    /// sections.
    pub fn new(templates: HelpTemplates) -> Result<Self> {
        for source in [
            &templates.app_help,
            &templates.command_help,
            &templates.subcommand_help,
        ] {
            compile(source)?;
        }
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &HelpTemplates {
        &self.templates
    }

    fn source(&self, template: HelpTemplate) -> &str {
        match template {
            HelpTemplate::AppHelp => &self.templates.app_help,
            HelpTemplate::CommandHelp => &self.templates.command_help,
            HelpTemplate::SubcommandHelp => &self.templates.subcommand_help,
        }
    }
}

impl HelpRenderer for TemplateRenderer {
    fn render(&self, out: &mut dyn Write, template: HelpTemplate, data: &HelpData) -> Result<()> {
        self.render_custom(out, self.source(template), data)
    }

    fn render_custom(&self, out: &mut dyn Write, template: &str, data: &HelpData) -> Result<()> {
        let segments = compile(template)?;
        let mut text = String::new();
        render_segments(&segments, data, &mut text);
        out.write_all(align_columns(&text).as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Version,
    Usage,
    Description,
    Options,
    Commands,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Field::Name),
            "version" => Some(Field::Version),
            "usage" => Some(Field::Usage),
            "description" => Some(Field::Description),
            "options" => Some(Field::Options),
            "commands" => Some(Field::Commands),
            _ => None,
        }
    }

    fn text(self, data: &HelpData) -> String {
        match self {
            Field::Name => data.name.clone(),
            Field::Version => data.version.clone(),
            Field::Usage => data.usage.clone(),
            Field::Description => data.description.clone(),
            Field::Options => data
                .flags
                .iter()
                .map(|flag| format!("  {flag}\n"))
                .collect(),
            Field::Commands => data
                .commands
                .iter()
                .map(|entry| format!("  {}\t{}\n", entry.names.join(", "), entry.usage))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
    Section(Field, Vec<Segment>),
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([#/]?)\s*([A-Za-z_]+)\s*\}\}").expect("static regex must compile")
});

fn compile(source: &str) -> Result<Vec<Segment>> {
    let mut open: Vec<(Field, Vec<Segment>)> = Vec::new();
    let mut current = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(source) {
        let (Some(tag), Some(sigil), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if tag.start() > last {
            current.push(Segment::Text(source[last..tag.start()].to_string()));
        }
        last = tag.end();

        let field = Field::parse(name.as_str())
            .ok_or_else(|| Error::Template(format!("unknown placeholder {:?}", name.as_str())))?;
        match sigil.as_str() {
            "#" => open.push((field, std::mem::take(&mut current))),
            "/" => {
                let (opened, outer) = open.pop().ok_or_else(|| {
                    Error::Template(format!("section {:?} closed but never opened", name.as_str()))
                })?;
                if opened != field {
                    return Err(Error::Template(format!(
                        "section {opened:?} closed by {:?}",
                        name.as_str()
                    )));
                }
                let body = std::mem::replace(&mut current, outer);
                current.push(Segment::Section(field, body));
            }
            _ => current.push(Segment::Field(field)),
        }
    }

    if let Some((field, _)) = open.last() {
        return Err(Error::Template(format!("section {field:?} is never closed")));
    }
    if last < source.len() {
        current.push(Segment::Text(source[last..].to_string()));
    }
    Ok(current)
}

fn render_segments(segments: &[Segment], data: &HelpData, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(field) => out.push_str(&field.text(data)),
            Segment::Section(field, body) => {
                if !field.text(data).is_empty() {
                    render_segments(body, data, out);
                }
            }
        }
    }
}

/// Aligns tab-separated cells within each run of consecutive tabbed lines,
/// padding every column to its widest cell plus one space.
fn align_columns(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        if !lines[i].contains('\t') {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let end = lines[i..]
            .iter()
            .position(|line| !line.contains('\t'))
            .map_or(lines.len(), |offset| i + offset);
        let rows: Vec<Vec<&str>> = lines[i..end]
            .iter()
            .map(|line| line.split('\t').collect())
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &rows {
            for (column, cell) in row.iter().enumerate().take(row.len() - 1) {
                widths[column] = widths[column].max(cell.chars().count());
            }
        }

        for row in &rows {
            let mut line = String::new();
            for (column, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if column + 1 < row.len() {
                    let pad = widths[column] - cell.chars().count() + 1;
                    line.push_str(&" ".repeat(pad));
                }
            }
            out.push(line.trim_end().to_string());
        }
        i = end;
    }

    out.join("\n")
}

/// Shows the help page for the level `ctx` belongs to.
///
/// The app root gets the app page, commands with subcommands the
/// subcommand page, and everything else the command page (or the
/// command's own template override).
pub fn show_help(ctx: &Context<'_>) -> Result<()> {
    let level = ctx.level();
    let renderer = ctx.app().renderer();
    let data = level_data(ctx);

    ctx.output().with_writer(|out| match level.kind {
        LevelKind::Root => renderer.render(out, HelpTemplate::AppHelp, &data),
        LevelKind::Nested if level.lists_commands() => {
            renderer.render(out, HelpTemplate::SubcommandHelp, &data)
        }
        _ => match level.command.and_then(|c| c.help_template.as_deref()) {
            Some(custom) => renderer.render_custom(out, custom, &data),
            None => renderer.render(out, HelpTemplate::CommandHelp, &data),
        },
    })
}

/// Shows the app's top-level help regardless of how deep `ctx` is.
pub fn show_app_help(ctx: &Context<'_>) -> Result<()> {
    match ctx.lineage().last() {
        Some(root) => show_help(root),
        None => show_help(ctx),
    }
}

/// Shows help for the child `name` of the level `ctx` belongs to.
///
/// An empty name shows the level's own help. A child with subcommands gets
/// the subcommand page, so its command table matches `<child> --help`. An
/// unknown name goes to the app's command-not-found handler, or prints a
/// short notice.
pub fn show_command_help(ctx: &Context<'_>, name: &str) -> Result<()> {
    if name.is_empty() {
        return show_help(ctx);
    }

    let level = ctx.level();
    let renderer = ctx.app().renderer();

    if let Some(command) = find_command(level.commands, name) {
        let data = command_data(ctx, command);
        let template = if command.has_subcommands() {
            HelpTemplate::SubcommandHelp
        } else {
            HelpTemplate::CommandHelp
        };
        return ctx
            .output()
            .with_writer(|out| match command.help_template.as_deref() {
                Some(custom) => renderer.render_custom(out, custom, &data),
                None => renderer.render(out, template, &data),
            });
    }

    if level.help_command_names().iter().any(|help| *help == name) {
        let data = HelpData {
            name: format!("{} {name}", ctx.full_name()),
            version: ctx.app().version.clone(),
            usage: HELP_COMMAND_USAGE.to_string(),
            flags: vec![FlagSpec::help()],
            ..HelpData::default()
        };
        return ctx
            .output()
            .with_writer(|out| renderer.render(out, HelpTemplate::CommandHelp, &data));
    }

    match &ctx.app().command_not_found {
        Some(not_found) => not_found(ctx, name),
        None => writeln!(ctx.output(), "Command '{name}' is not defined.")?,
    }
    Ok(())
}

/// Prints `<name> version <version>` for the app.
pub fn show_version(ctx: &Context<'_>) -> Result<()> {
    let app = ctx.app();
    let data = HelpData {
        name: app.name.clone(),
        version: app.version.clone(),
        ..HelpData::default()
    };
    ctx.output()
        .with_writer(|out| app.renderer().render_version(out, &data))
}

/// Writes every name and alias of the level's commands, one per line.
///
/// This is the flat list shells can use for completion.
pub fn write_command_names(ctx: &Context<'_>) -> Result<()> {
    let level = ctx.level();
    let output = ctx.output();
    for command in level.commands {
        for name in command.names() {
            writeln!(output, "{name}")?;
        }
    }
    for name in level.help_command_names() {
        writeln!(output, "{name}")?;
    }
    Ok(())
}

/// Reports a flag parse failure ahead of the level's help.
pub(crate) fn write_usage_error(ctx: &Context<'_>, err: &FlagError) -> Result<()> {
    write!(ctx.output(), "Incorrect Usage.\n{err}\n\n")?;
    Ok(())
}

fn level_data(ctx: &Context<'_>) -> HelpData {
    let level = ctx.level();
    let usage = if level.kind == LevelKind::Nested && !level.description.is_empty() {
        level.description
    } else {
        level.usage
    };

    let commands = command_entries(level);

    HelpData {
        name: ctx.full_name().to_string(),
        version: ctx.app().version.clone(),
        usage: usage.to_string(),
        description: level.description.to_string(),
        flags: visible(ctx.flag_specs()),
        commands,
    }
}

fn command_data(ctx: &Context<'_>, command: &Command) -> HelpData {
    let name = format!("{} {}", ctx.full_name(), command.name);
    let flags = with_builtin_flags(&command.flags, !command.hide_help, false);
    let level = Level::for_command(command, name.clone());
    let usage = if level.kind == LevelKind::Nested && !command.description.is_empty() {
        &command.description
    } else {
        &command.usage
    };

    HelpData {
        name,
        version: ctx.app().version.clone(),
        usage: usage.clone(),
        description: command.description.clone(),
        flags: visible(&flags),
        commands: command_entries(&level),
    }
}

/// The level's children followed by the built-in help command, if offered.
fn command_entries(level: &Level<'_>) -> Vec<CommandEntry> {
    let mut commands: Vec<CommandEntry> =
        level.commands.iter().map(CommandEntry::from_command).collect();
    let help_names = level.help_command_names();
    if !help_names.is_empty() {
        commands.push(CommandEntry {
            names: help_names.into_iter().map(String::from).collect(),
            usage: HELP_COMMAND_USAGE.to_string(),
        });
    }
    commands
}

fn visible(flags: &[FlagSpec]) -> Vec<FlagSpec> {
    flags.iter().filter(|f| !f.hidden).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HelpData {
        HelpData {
            name: "tool".into(),
            version: "1.0.0".into(),
            usage: "does things".into(),
            description: String::new(),
            flags: vec![
                FlagSpec::bool("verbose").with_usage("talk more"),
                FlagSpec::help(),
            ],
            commands: vec![
                CommandEntry {
                    names: vec!["install".into(), "i".into()],
                    usage: "install a package".into(),
                },
                CommandEntry {
                    names: vec!["help".into(), "h".into()],
                    usage: HELP_COMMAND_USAGE.into(),
                },
            ],
        }
    }

    fn render(template: HelpTemplate, data: &HelpData) -> String {
        let mut out = Vec::new();
        TemplateRenderer::default()
            .render(&mut out, template, data)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_default_templates_compile() {
        assert!(TemplateRenderer::new(HelpTemplates::default()).is_ok());
    }

    #[test]
    fn test_app_help_layout() {
        let text = render(HelpTemplate::AppHelp, &sample());
        assert_eq!(
            text,
            "tool 1.0.0\n\
             \n\
             does things\n\
             \n\
             Usage:\n  tool [<options>] <command> [<arguments>]\n\
             \n\
             Options:\n\
             \x20 --verbose  talk more\n\
             \x20 --help, -h show help\n\
             \n\
             Commands:\n\
             \x20 install, i install a package\n\
             \x20 help, h    Shows a list of commands or help for one command\n"
        );
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let data = HelpData {
            name: "tool leaf".into(),
            ..HelpData::default()
        };
        let text = render(HelpTemplate::CommandHelp, &data);
        assert_eq!(text, "tool leaf\n\nUsage:\n  tool leaf [<arguments>]\n");
    }

    #[test]
    fn test_compile_rejects_unbalanced_sections() {
        assert!(matches!(compile("{{#usage}}x"), Err(Error::Template(_))));
        assert!(matches!(compile("x{{/usage}}"), Err(Error::Template(_))));
        assert!(matches!(
            compile("{{#usage}}{{/options}}"),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_align_columns_only_within_blocks() {
        let text = "a\tone\nlonger\ttwo\nplain\nx\tthree";
        assert_eq!(
            align_columns(text),
            "a      one\nlonger two\nplain\nx three"
        );
    }

    #[test]
    fn test_custom_template_renders_fields() {
        let mut out = Vec::new();
        TemplateRenderer::default()
            .render_custom(&mut out, "[{{ name }}|{{version}}]", &sample())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[tool|1.0.0]");
    }
}
