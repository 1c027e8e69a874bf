//! Interactive single-line prompts.

use std::io::{self, BufRead, Write};

/// A question asked on a terminal.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use cmdtree_core::Question;
///
/// let mut shown = Vec::new();
/// let answer = Question::new("Name? ")
///     .ask_with(Cursor::new("Jeremy\r\n"), &mut shown)
///     .unwrap();
/// assert_eq!(answer, "Jeremy");
/// assert_eq!(shown, b"Name? ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub msg: String,
}

impl Question {
    pub fn new(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }

    /// Writes the message to `writer` and reads one line from `reader`.
    ///
    /// The trailing line ending is stripped. End of input yields an empty
    /// answer.
    pub fn ask_with(&self, mut reader: impl BufRead, mut writer: impl Write) -> io::Result<String> {
        write!(writer, "{}", self.msg)?;
        writer.flush()?;

        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Asks on stdout and reads the answer from stdin.
    pub fn ask(&self) -> io::Result<String> {
        self.ask_with(io::stdin().lock(), io::stdout().lock())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_reads_only_first_line() {
        let mut out = Vec::new();
        let answer = Question::new("? ")
            .ask_with(Cursor::new("yes\nno\n"), &mut out)
            .unwrap();
        assert_eq!(answer, "yes");
    }

    #[test]
    fn test_end_of_input_is_empty_answer() {
        let answer = Question::new("")
            .ask_with(Cursor::new(""), io::sink())
            .unwrap();
        assert_eq!(answer, "");
    }
}
