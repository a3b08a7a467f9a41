//! Invocation normalization.
//!
//! An invocation arrives as the real process arguments, a single command
//! line string, or a pre-split token list. All three normalize to the same
//! token sequence; nothing is interpreted here.

use std::ffi::OsString;

use crate::error::ProgramError;

/// Source of the raw command line.
///
/// The first token of every form is the program path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Argv {
    /// Read the process's argument vector.
    #[default]
    Process,
    /// Split a command line on whitespace.
    Line(String),
    /// Use the tokens verbatim.
    Tokens(Vec<String>),
    /// Raw OS tokens, checked for valid UTF-8.
    OsTokens(Vec<OsString>),
}

impl From<&str> for Argv {
    fn from(line: &str) -> Self {
        Argv::Line(line.to_string())
    }
}

impl From<String> for Argv {
    fn from(line: String) -> Self {
        Argv::Line(line)
    }
}

impl From<Vec<String>> for Argv {
    fn from(tokens: Vec<String>) -> Self {
        Argv::Tokens(tokens)
    }
}

impl From<&[&str]> for Argv {
    fn from(tokens: &[&str]) -> Self {
        Argv::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl From<Vec<OsString>> for Argv {
    fn from(tokens: Vec<OsString>) -> Self {
        Argv::OsTokens(tokens)
    }
}

impl<const N: usize> From<[&str; N]> for Argv {
    fn from(tokens: [&str; N]) -> Self {
        Argv::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// Normalizes an [`Argv`] into its token sequence.
///
/// # Errors
///
/// Returns [`ProgramError::Parse`] when a process or OS token is not valid
/// UTF-8.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::{Argv, normalize};
///
/// assert_eq!(normalize(Argv::from("foo bar")).unwrap(), vec!["foo", "bar"]);
/// assert_eq!(normalize(Argv::from(["foo", "bar"])).unwrap(), vec!["foo", "bar"]);
/// ```
pub fn normalize(argv: Argv) -> Result<Vec<String>, ProgramError> {
    match argv {
        Argv::Process => from_os_tokens(std::env::args_os()),
        Argv::Line(line) => Ok(line.split_whitespace().map(String::from).collect()),
        Argv::Tokens(tokens) => Ok(tokens),
        Argv::OsTokens(tokens) => from_os_tokens(tokens),
    }
}

fn from_os_tokens(tokens: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, ProgramError> {
    tokens
        .into_iter()
        .map(|token| {
            token.into_string().map_err(|raw| {
                ProgramError::Parse(format!(
                    "invalid UTF-8 in argument '{}'",
                    raw.to_string_lossy()
                ))
            })
        })
        .collect()
}

/// A normalized invocation split into program path and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    /// Path the program was invoked as.
    pub program: String,
    /// Everything after the program path.
    pub args: Vec<String>,
}

impl Invocation {
    /// Splits normalized tokens; an empty sequence yields an empty program path.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let mut tokens = tokens.into_iter();
        let program = tokens.next().unwrap_or_default();
        Self {
            program,
            args: tokens.collect(),
        }
    }
}
