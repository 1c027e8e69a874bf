//! Reading flag values straight off raw arguments.
//!
//! These helpers look at the unparsed command line, before any command tree
//! is resolved. They are handy for settings that must be known early, such
//! as a config path or a verbosity switch used to set up logging.

use crate::table::TERMINATOR;

/// Returns the value of the first of `flags` found in `args`.
///
/// A token equal to a flag takes the following token as its value; a token
/// starting with `flag=` carries the value after the first `=`. Scanning
/// stops at `--`. Returns an empty string when nothing matches.
///
/// # Examples
///
/// ```
/// use cmdtree_core::get_string_flag_value;
///
/// let args = ["greet", "-n=Jeremy"];
/// assert_eq!(get_string_flag_value(&args, &["--name", "-n"]), "Jeremy");
///
/// let args = ["greet", "--", "--name=Jeremy"];
/// assert_eq!(get_string_flag_value(&args, &["--name"]), "");
/// ```
pub fn get_string_flag_value<S: AsRef<str>>(args: &[S], flags: &[&str]) -> String {
    for (i, arg) in args.iter().map(AsRef::as_ref).enumerate() {
        if arg == TERMINATOR {
            break;
        }
        for flag in flags {
            if arg == *flag {
                return args
                    .get(i + 1)
                    .map(|next| next.as_ref().to_string())
                    .unwrap_or_default();
            }
            if let Some((name, value)) = arg.split_once('=') {
                if name == *flag {
                    return value.to_string();
                }
            }
        }
    }
    String::new()
}

/// Returns `true` if any of `flags` appears in `args` before `--`.
pub fn get_bool_flag_value<S: AsRef<str>>(args: &[S], flags: &[&str]) -> bool {
    args.iter()
        .map(AsRef::as_ref)
        .take_while(|arg| *arg != TERMINATOR)
        .any(|arg| flags.contains(&arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_value_forms() {
        assert_eq!(
            get_string_flag_value(&["greet", "--name", "Jeremy"], &["--name"]),
            "Jeremy"
        );
        assert_eq!(
            get_string_flag_value(&["greet", "--name=Jeremy"], &["--name"]),
            "Jeremy"
        );
        assert_eq!(
            get_string_flag_value(&["greet", "-n=Jeremy"], &["-n"]),
            "Jeremy"
        );
        assert_eq!(
            get_string_flag_value(&["greet", "--name=Jeremy"], &["--name", "-n"]),
            "Jeremy"
        );
    }

    #[test]
    fn test_string_value_stops_at_terminator() {
        assert_eq!(
            get_string_flag_value(&["greet", "--", "--name=Jeremy"], &["--name", "-n"]),
            ""
        );
    }

    #[test]
    fn test_string_value_edge_cases() {
        // Trailing flag with nothing after it
        assert_eq!(get_string_flag_value(&["greet", "--name"], &["--name"]), "");
        // Prefix of a longer flag is not a match
        assert_eq!(
            get_string_flag_value(&["greet", "--names=a"], &["--name"]),
            ""
        );
        assert_eq!(
            get_string_flag_value(&["run", "--env=A=B"], &["--env"]),
            "A=B"
        );
        let owned = vec!["x".to_string(), "-c".to_string(), "cfg.yaml".to_string()];
        assert_eq!(get_string_flag_value(&owned, &["-c"]), "cfg.yaml");
    }

    #[test]
    fn test_bool_value() {
        assert!(get_bool_flag_value(&["greet", "--abc", "Jeremy"], &["--abc"]));
        assert!(get_bool_flag_value(&["greet", "-a", "Jeremy"], &["--abc", "-a"]));
        assert!(!get_bool_flag_value(&["greet", "--", "-a"], &["-a"]));
        assert!(!get_bool_flag_value::<&str>(&[], &["-a"]));
    }
}
