//! Per-level read scope.
//!
//! A [`Context`] is created for every resolution level. It owns the level's
//! bound flags and positional remainder and links to the parent level's
//! context, so `global_*` lookups can fall back outward through the chain.
//! Contexts are read-only once built and never outlive the resolution call
//! that created them.

use std::time::Duration;

use crate::app::App;
use crate::command::Command;
use crate::flag::FlagSpec;
use crate::output::Output;
use crate::resolve::Level;
use crate::table::FlagTable;
use crate::value::FlagValue;

/// Non-destructive view over a level's positional arguments.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Args;
///
/// let tokens = vec!["add".to_string(), "origin".to_string(), "url".to_string()];
/// let args = Args::new(&tokens);
/// assert!(args.present());
/// assert_eq!(args.first(), Some("add"));
/// assert_eq!(args.tail(), &tokens[1..]);
/// assert_eq!(args.get(2), Some("url"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Args<'a> {
    items: &'a [String],
}

impl<'a> Args<'a> {
    pub fn new(items: &'a [String]) -> Self {
        Self { items }
    }

    /// Returns `true` if at least one argument remains.
    pub fn present(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn first(&self) -> Option<&'a str> {
        self.get(0)
    }

    /// Every argument but the first.
    pub fn tail(&self) -> &'a [String] {
        self.items.get(1..).unwrap_or_default()
    }

    pub fn get(&self, n: usize) -> Option<&'a str> {
        self.items.get(n).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(self) -> impl Iterator<Item = &'a str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &'a [String] {
        self.items
    }
}

impl<'a> IntoIterator for Args<'a> {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// One level of command resolution.
///
/// Typed accessors read this level's bindings and return the kind's zero
/// value when the flag is unknown or has a different kind. The `global_*`
/// variants walk outward to the nearest level that declares the flag.
pub struct Context<'a> {
    app: &'a App,
    level: Level<'a>,
    flags: FlagTable,
    args: Vec<String>,
    parent: Option<&'a Context<'a>>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        app: &'a App,
        level: Level<'a>,
        flags: FlagTable,
        args: Vec<String>,
        parent: Option<&'a Context<'a>>,
    ) -> Self {
        Self {
            app,
            level,
            flags,
            args,
            parent,
        }
    }

    /// The application being run.
    pub fn app(&self) -> &'a App {
        self.app
    }

    /// The command executing at this level, or `None` at the app root.
    pub fn command(&self) -> Option<&'a Command> {
        self.level.command
    }

    /// The enclosing level's context.
    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    /// This context followed by each ancestor, innermost first.
    pub fn lineage(&self) -> impl Iterator<Item = &Context<'a>> {
        std::iter::successors(Some(self), |ctx| ctx.parent)
    }

    /// Positional arguments left after flag parsing.
    pub fn args(&self) -> Args<'_> {
        Args::new(&self.args)
    }

    /// Space-joined command path of this level (e.g. `git remote add`).
    pub fn full_name(&self) -> &str {
        &self.level.path
    }

    /// The app's output sink.
    pub fn output(&self) -> &'a Output {
        self.app.output()
    }

    /// This level's flag table.
    pub fn flag_table(&self) -> &FlagTable {
        &self.flags
    }

    /// Declarations of this level's flags, including injected built-ins.
    pub fn flag_specs(&self) -> &[FlagSpec] {
        self.flags.specs()
    }

    /// Every flag name and alias declared at this level.
    pub fn flag_names(&self) -> Vec<&str> {
        self.flags.names().collect()
    }

    /// Number of flags explicitly supplied at this level.
    pub fn num_flags(&self) -> usize {
        self.flags
            .specs()
            .iter()
            .filter(|spec| self.flags.is_set(&spec.name))
            .count()
    }

    pub(crate) fn level(&self) -> &Level<'a> {
        &self.level
    }

    /// Raw value bound at this level.
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Raw value from the nearest level declaring `name`.
    pub fn global_value(&self, name: &str) -> Option<&FlagValue> {
        self.lineage().find_map(|ctx| ctx.flags.get(name))
    }

    /// Returns `true` if the flag was supplied at this level.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.is_set(name)
    }

    /// Returns `true` if the nearest level declaring `name` had it supplied.
    pub fn global_is_set(&self, name: &str) -> bool {
        self.lineage()
            .find(|ctx| ctx.flags.contains(name))
            .is_some_and(|ctx| ctx.flags.is_set(name))
    }

    pub fn bool(&self, name: &str) -> bool {
        self.value(name).and_then(FlagValue::as_bool).unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> &str {
        self.value(name).and_then(FlagValue::as_str).unwrap_or("")
    }

    pub fn int(&self, name: &str) -> i64 {
        self.value(name).and_then(FlagValue::as_int).unwrap_or(0)
    }

    pub fn duration(&self, name: &str) -> Duration {
        self.value(name)
            .and_then(FlagValue::as_duration)
            .unwrap_or(Duration::ZERO)
    }

    pub fn string_list(&self, name: &str) -> &[String] {
        self.value(name).and_then(FlagValue::as_list).unwrap_or(&[])
    }

    pub fn global_bool(&self, name: &str) -> bool {
        self.global_value(name)
            .and_then(FlagValue::as_bool)
            .unwrap_or(false)
    }

    pub fn global_string(&self, name: &str) -> &str {
        self.global_value(name)
            .and_then(FlagValue::as_str)
            .unwrap_or("")
    }

    pub fn global_int(&self, name: &str) -> i64 {
        self.global_value(name)
            .and_then(FlagValue::as_int)
            .unwrap_or(0)
    }

    pub fn global_duration(&self, name: &str) -> Duration {
        self.global_value(name)
            .and_then(FlagValue::as_duration)
            .unwrap_or(Duration::ZERO)
    }

    pub fn global_string_list(&self, name: &str) -> &[String] {
        self.global_value(name)
            .and_then(FlagValue::as_list)
            .unwrap_or(&[])
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("path", &self.level.path)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}
