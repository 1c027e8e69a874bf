//! Per-level flag binding.
//!
//! A [`FlagTable`] is built for one resolution level from that level's
//! [`FlagSpec`]s, binds the flag-shaped tokens it is handed, and reports the
//! positional remainder. Every declared flag ends up with a value: the
//! supplied one or its default. Aliases share one binding.
//!
//! Tokens are split according to a [`ParseMode`]:
//!
//! - [`ParseMode::Leading`]: flags must come first; the first non-flag token
//!   or a `--` ends flag parsing. Used at app levels so that command names
//!   and their flags pass through untouched. A terminator stays at the head
//!   of the positionals so later levels know not to read past it.
//! - [`ParseMode::Split`]: positionals may precede the flags. The span from
//!   the first dash-prefixed token up to a `--` terminator is parsed as
//!   flags; everything else, terminator included, is positional.
//! - [`ParseMode::Skip`]: no flag parsing at all.

use std::collections::HashMap;

use tracing::trace;

use crate::error::FlagError;
use crate::flag::FlagSpec;
use crate::value::{FlagKind, FlagValue};

/// The literal token that ends flag interpretation.
pub const TERMINATOR: &str = "--";

/// How a level's tokens are divided between flags and positionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Leading,
    /// Positionals come back as the pre-span tokens, then whatever the span
    /// left unparsed, then the terminator and everything after it.
    Split,
    Skip,
}

/// Bound flag values for a single resolution level.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagSpec, FlagTable, FlagValue, ParseMode};
///
/// let tokens: Vec<String> = ["file.txt", "-n", "Jeremy", "--", "-x"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let (table, positional) = FlagTable::parse(
///     vec![FlagSpec::string("name").alias("n")],
///     &tokens,
///     ParseMode::Split,
/// )
/// .unwrap();
///
/// assert_eq!(table.get("name"), Some(&FlagValue::String("Jeremy".into())));
/// assert_eq!(table.get("n"), table.get("name"));
/// assert_eq!(positional, vec!["file.txt", "--", "-x"]);
/// ```
#[derive(Debug, Clone)]
pub struct FlagTable {
    specs: Vec<FlagSpec>,
    values: Vec<FlagValue>,
    /// Name each flag was supplied under, if it was supplied at all.
    supplied: Vec<Option<String>>,
    index: HashMap<String, usize>,
}

impl FlagTable {
    /// Builds a table holding every flag's default value.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::DuplicateName`] if two specs share a name or
    /// alias.
    pub fn new(specs: Vec<FlagSpec>) -> Result<Self, FlagError> {
        let mut index = HashMap::new();
        for (position, spec) in specs.iter().enumerate() {
            for name in spec.names() {
                if index.insert(name.to_string(), position).is_some() {
                    return Err(FlagError::DuplicateName(name.to_string()));
                }
            }
        }

        let values = specs.iter().map(FlagSpec::default_value).collect();
        let supplied = vec![None; specs.len()];
        Ok(Self {
            specs,
            values,
            supplied,
            index,
        })
    }

    /// Builds a table for `specs` and binds `tokens` according to `mode`.
    ///
    /// Returns the table and the positional remainder. On failure nothing
    /// outlives the attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`FlagError`] for unknown flags, missing or malformed
    /// values, a flag given under two of its names, or duplicate
    /// declarations.
    pub fn parse(
        specs: Vec<FlagSpec>,
        tokens: &[String],
        mode: ParseMode,
    ) -> Result<(Self, Vec<String>), FlagError> {
        let mut table = Self::new(specs)?;

        let positional = match mode {
            ParseMode::Skip => tokens.to_vec(),
            ParseMode::Leading => {
                let consumed = table.bind(tokens)?;
                tokens[consumed..].to_vec()
            }
            ParseMode::Split => match split_tokens(tokens) {
                None => tokens.to_vec(),
                Some(split) => {
                    let consumed = table.bind(split.span)?;
                    let mut positional = split.before.to_vec();
                    positional.extend_from_slice(&split.span[consumed..]);
                    positional.extend_from_slice(split.after);
                    positional
                }
            },
        };

        trace!(
            mode = ?mode,
            supplied = ?table.supplied.iter().flatten().collect::<Vec<_>>(),
            positional = ?positional,
            "Bound flags"
        );
        Ok((table, positional))
    }

    /// Binds flag tokens from the front of `tokens`, returning how many were
    /// consumed. A terminator is never consumed.
    fn bind(&mut self, tokens: &[String]) -> Result<usize, FlagError> {
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            if token.len() < 2 || !token.starts_with('-') {
                break;
            }
            if token == TERMINATOR {
                break;
            }

            let body = token
                .strip_prefix("--")
                .unwrap_or_else(|| &token[1..]);
            if body.is_empty() || body.starts_with(['-', '=']) {
                return Err(FlagError::UnknownFlag(body.to_string()));
            }
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };

            let position = *self
                .index
                .get(name)
                .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?;
            let kind = self.specs[position].kind;

            let raw = match (kind, inline) {
                (_, Some(value)) => value,
                (FlagKind::Bool, None) => "true",
                (_, None) => {
                    i += 1;
                    tokens
                        .get(i)
                        .map(String::as_str)
                        .ok_or_else(|| FlagError::MissingValue(name.to_string()))?
                }
            };

            let value = kind
                .parse_value(raw)
                .map_err(|reason| FlagError::InvalidValue {
                    flag: name.to_string(),
                    value: raw.to_string(),
                    reason,
                })?;
            self.store(position, name, value)?;
            i += 1;
        }
        Ok(i)
    }

    fn store(&mut self, position: usize, name: &str, value: FlagValue) -> Result<(), FlagError> {
        match &self.supplied[position] {
            Some(previous) if previous != name => {
                return Err(FlagError::ConflictingForms(
                    previous.clone(),
                    name.to_string(),
                ));
            }
            Some(_) => {
                if let (FlagValue::StringList(items), FlagValue::StringList(more)) =
                    (&mut self.values[position], &value)
                {
                    items.extend(more.iter().cloned());
                    return Ok(());
                }
            }
            None => {}
        }

        self.values[position] = value;
        self.supplied[position] = Some(name.to_string());
        Ok(())
    }

    /// Value bound to `name` (any alias), or `None` if no such flag is declared.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.index.get(name).map(|&position| &self.values[position])
    }

    /// Returns `true` if the flag was supplied explicitly rather than defaulted.
    pub fn is_set(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|&position| self.supplied[position].is_some())
    }

    /// Returns `true` if `name` is a declared name or alias.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declarations backing this table, in declaration order.
    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    /// Every declared name and alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().flat_map(FlagSpec::names)
    }

    /// Number of declared flags (aliases are not counted separately).
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Token ranges produced by the leaf splitting heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Positionals preceding the first dash-prefixed token.
    pub before: &'a [String],
    /// Candidate flag tokens.
    pub span: &'a [String],
    /// The terminator and everything after it.
    pub after: &'a [String],
}

/// Locates the flag span in `tokens`.
///
/// Returns `None` when no dash-prefixed token precedes the terminator, in
/// which case every token is positional.
pub fn split_tokens(tokens: &[String]) -> Option<Split<'_>> {
    let mut first_flag = None;
    let mut terminator = None;
    for (position, token) in tokens.iter().enumerate() {
        if token == TERMINATOR {
            terminator = Some(position);
            break;
        }
        if first_flag.is_none() && token.starts_with('-') {
            first_flag = Some(position);
        }
    }

    let start = first_flag?;
    let end = terminator.unwrap_or(tokens.len());
    Some(Split {
        before: &tokens[..start],
        span: &tokens[start..end],
        after: &tokens[end..],
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn name_flag() -> FlagSpec {
        FlagSpec::string("name").alias("n")
    }

    #[test]
    fn test_name_value_forms_bind_same_value() {
        for raw in [
            &["--name", "Jeremy"][..],
            &["--name=Jeremy"],
            &["-n", "Jeremy"],
            &["-name", "Jeremy"],
            &["--n=Jeremy"],
        ] {
            let (table, positional) =
                FlagTable::parse(vec![name_flag()], &tokens(raw), ParseMode::Split).unwrap();
            assert_eq!(table.get("name").and_then(FlagValue::as_str), Some("Jeremy"));
            assert_eq!(table.get("n").and_then(FlagValue::as_str), Some("Jeremy"));
            assert!(positional.is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn test_defaults_fill_unsupplied_flags() {
        let specs = vec![
            FlagSpec::int("count").with_default(3i64),
            FlagSpec::bool("force"),
        ];
        let (table, _) = FlagTable::parse(specs, &[], ParseMode::Leading).unwrap();

        assert_eq!(table.get("count"), Some(&FlagValue::Int(3)));
        assert_eq!(table.get("force"), Some(&FlagValue::Bool(false)));
        assert!(!table.is_set("count"));
    }

    #[test]
    fn test_split_keeps_pre_flag_positionals_and_terminator() {
        let (table, positional) = FlagTable::parse(
            vec![FlagSpec::bool("force")],
            &tokens(&["a", "b", "--force", "--", "--force", "c"]),
            ParseMode::Split,
        )
        .unwrap();

        assert!(table.is_set("force"));
        assert_eq!(positional, tokens(&["a", "b", "--", "--force", "c"]));
    }

    #[test]
    fn test_split_without_flags_before_terminator_is_all_positional() {
        let input = tokens(&["a", "--", "--unknown"]);
        let (table, positional) =
            FlagTable::parse(vec![FlagSpec::bool("force")], &input, ParseMode::Split).unwrap();

        assert!(!table.is_set("force"));
        assert_eq!(positional, input);
    }

    #[test]
    fn test_split_non_flag_inside_span_ends_parsing() {
        let (table, positional) = FlagTable::parse(
            vec![FlagSpec::int("x"), FlagSpec::bool("y")],
            &tokens(&["pre", "--x", "1", "mid", "-y"]),
            ParseMode::Split,
        )
        .unwrap();

        assert_eq!(table.get("x"), Some(&FlagValue::Int(1)));
        assert!(!table.is_set("y"));
        assert_eq!(positional, tokens(&["pre", "mid", "-y"]));
    }

    #[test]
    fn test_split_treats_negative_number_as_flag_span_start() {
        let err = FlagTable::parse(
            vec![FlagSpec::bool("force")],
            &tokens(&["-5"]),
            ParseMode::Split,
        )
        .unwrap_err();

        assert_eq!(err, FlagError::UnknownFlag("5".to_string()));
    }

    #[test]
    fn test_leading_stops_at_first_positional() {
        let (table, positional) = FlagTable::parse(
            vec![FlagSpec::bool("verbose")],
            &tokens(&["--verbose", "deploy", "--x", "1"]),
            ParseMode::Leading,
        )
        .unwrap();

        assert!(table.is_set("verbose"));
        assert_eq!(positional, tokens(&["deploy", "--x", "1"]));
    }

    #[test]
    fn test_leading_keeps_terminator_at_head_of_positionals() {
        let (table, positional) = FlagTable::parse(
            vec![FlagSpec::bool("verbose")],
            &tokens(&["--", "--verbose"]),
            ParseMode::Leading,
        )
        .unwrap();

        assert!(!table.is_set("verbose"));
        assert_eq!(positional, tokens(&["--", "--verbose"]));
    }

    #[test]
    fn test_skip_mode_binds_nothing() {
        let input = tokens(&["--anything", "goes"]);
        let (table, positional) =
            FlagTable::parse(vec![FlagSpec::bool("anything")], &input, ParseMode::Skip).unwrap();

        assert!(!table.is_set("anything"));
        assert_eq!(positional, input);
    }

    #[test]
    fn test_bool_accepts_inline_value_only() {
        let (table, positional) = FlagTable::parse(
            vec![FlagSpec::bool("color").with_default(true)],
            &tokens(&["--color=false", "false"]),
            ParseMode::Leading,
        )
        .unwrap();

        assert_eq!(table.get("color"), Some(&FlagValue::Bool(false)));
        assert_eq!(positional, tokens(&["false"]));
    }

    #[test]
    fn test_missing_value_is_error() {
        let err = FlagTable::parse(
            vec![name_flag()],
            &tokens(&["--name"]),
            ParseMode::Split,
        )
        .unwrap_err();

        assert_eq!(err, FlagError::MissingValue("name".to_string()));
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let err = FlagTable::parse(
            vec![name_flag()],
            &tokens(&["--nope"]),
            ParseMode::Leading,
        )
        .unwrap_err();

        assert_eq!(err, FlagError::UnknownFlag("nope".to_string()));
    }

    #[test]
    fn test_invalid_typed_values() {
        let err = FlagTable::parse(
            vec![FlagSpec::duration("timeout")],
            &tokens(&["--timeout", "soon"]),
            ParseMode::Leading,
        )
        .unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { .. }));

        let (table, _) = FlagTable::parse(
            vec![FlagSpec::duration("timeout")],
            &tokens(&["--timeout", "2m"]),
            ParseMode::Leading,
        )
        .unwrap();
        assert_eq!(
            table.get("timeout"),
            Some(&FlagValue::Duration(Duration::from_secs(120)))
        );
    }

    #[test]
    fn test_two_forms_of_same_flag_conflict() {
        let err = FlagTable::parse(
            vec![name_flag()],
            &tokens(&["--name", "a", "-n", "b"]),
            ParseMode::Leading,
        )
        .unwrap_err();

        assert_eq!(
            err,
            FlagError::ConflictingForms("name".to_string(), "n".to_string())
        );
    }

    #[test]
    fn test_string_list_accumulates_and_replaces_default() {
        let (table, _) = FlagTable::parse(
            vec![FlagSpec::string_list("tag").with_default(vec!["base".to_string()])],
            &tokens(&["--tag", "a", "--tag=b"]),
            ParseMode::Leading,
        )
        .unwrap();

        assert_eq!(
            table.get("tag").and_then(FlagValue::as_list),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn test_value_may_start_with_dash() {
        let (table, _) = FlagTable::parse(
            vec![FlagSpec::int("offset")],
            &tokens(&["--offset", "-5"]),
            ParseMode::Leading,
        )
        .unwrap();

        assert_eq!(table.get("offset"), Some(&FlagValue::Int(-5)));
    }

    #[test]
    fn test_duplicate_declaration_is_rejected() {
        let err = FlagTable::new(vec![name_flag(), FlagSpec::bool("n")]).unwrap_err();
        assert_eq!(err, FlagError::DuplicateName("n".to_string()));
    }
}
