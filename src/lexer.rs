//! Splitting of input lines into argument vectors.
//!
//! There is no quoting, escaping or operator syntax: a line is cut on runs of
//! the space character and every other character, including tabs and `&&`,
//! belongs to some token.

use std::ffi::{CString, NulError};
use std::ops::Index;
use tracing::warn;

/// Ordered arguments of one command line, `args[0]` being the command name.
///
/// The end of the vector plays the role of the terminating sentinel:
/// [`ArgumentVector::get`] returns `None` at index `len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    args: Vec<String>,
}

impl ArgumentVector {
    /// The command name, if the line had any token at all.
    pub fn command(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Arguments after the command name.
    pub fn rest(&self) -> Vec<&str> {
        self.iter().skip(1).collect()
    }

    /// The vector in the form `execvp` expects.
    pub fn to_exec_args(&self) -> Result<Vec<CString>, NulError> {
        self.args.iter().map(|a| CString::new(a.as_bytes())).collect()
    }
}

impl Index<usize> for ArgumentVector {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.args[index]
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

impl<'a> FromIterator<&'a str> for ArgumentVector {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().map(str::to_owned).collect(),
        }
    }
}

/// Strip leading and trailing whitespace.
pub fn trim_white(line: &str) -> &str {
    line.trim()
}

/// Split `line` into at most `max_args` tokens separated by runs of spaces.
///
/// Tokens beyond the cap are dropped with a warning.
pub fn parse(line: &str, max_args: usize) -> ArgumentVector {
    let mut args = Vec::new();
    for token in line.split(' ').filter(|t| !t.is_empty()) {
        if args.len() == max_args {
            warn!(max_args, "too many arguments, dropping the rest of the line");
            break;
        }
        args.push(token.to_owned());
    }
    ArgumentVector { args }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_ARGS;

    fn tokens(line: &str) -> Vec<String> {
        parse(line, DEFAULT_MAX_ARGS).iter().map(str::to_owned).collect()
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(tokens("ls -a -l"), vec!["ls", "-a", "-l"]);
    }

    #[test]
    fn test_sentinel_after_last_token() {
        let args = parse("foo -v", DEFAULT_MAX_ARGS);
        assert_eq!(args.len(), 2);
        assert_eq!(&args[0], "foo");
        assert_eq!(&args[1], "-v");
        assert_eq!(args.get(2), None);
    }

    #[test]
    fn test_special_chars_are_plain_tokens() {
        assert_eq!(
            tokens("ls -l && echo test"),
            vec!["ls", "-l", "&&", "echo", "test"]
        );
    }

    #[test]
    fn test_extra_spaces() {
        assert_eq!(tokens("   ls    -l   -a  "), vec!["ls", "-l", "-a"]);
    }

    #[test]
    fn test_tabs_are_not_separators() {
        assert_eq!(tokens("echo a\tb"), vec!["echo", "a\tb"]);
    }

    #[test]
    fn test_empty_line() {
        let args = parse("", DEFAULT_MAX_ARGS);
        assert!(args.is_empty());
        assert_eq!(args.command(), None);
    }

    #[test]
    fn test_cap_drops_extra_tokens() {
        let args = parse("a b c d e", 3);
        assert_eq!(args.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_join_round_trip() {
        for line in ["ls", "foo -v", "git commit -m msg", "ls -l && echo test"] {
            assert_eq!(tokens(line).join(" "), line);
        }
    }

    #[test]
    fn test_trim_white() {
        assert_eq!(trim_white("ls -a"), "ls -a");
        assert_eq!(trim_white("  ls -a"), "ls -a");
        assert_eq!(trim_white("ls -a  "), "ls -a");
        assert_eq!(trim_white(" ls -a "), "ls -a");
        assert_eq!(trim_white("  "), "");
        assert_eq!(trim_white("    a    "), "a");
    }

    #[test]
    fn test_trim_white_idempotent() {
        for s in ["", "  ", " \t a b \n", "x", "  ls -a  "] {
            assert_eq!(trim_white(trim_white(s)), trim_white(s));
        }
    }

    #[test]
    fn test_exec_args_reject_nul() {
        let args: ArgumentVector = ["echo", "a\0b"].into_iter().collect();
        assert!(args.to_exec_args().is_err());
    }
}
