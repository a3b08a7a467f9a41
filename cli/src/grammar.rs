//! Option grammars.
//!
//! An [`OptionGrammar`] describes a set of flags (short and long forms,
//! value arity, help text) and parses token sequences against them. The
//! low-level tokenization (`-x`, `-xVALUE`, `--flag=value`, clustering) is
//! delegated to clap's builder API; the grammar keeps its own flag metadata
//! so help rendering and task-boundary detection never depend on clap.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command, value_parser};
use rinvoke_core::{Task, ValueKind};
use thiserror::Error;

const REMAINDER_ID: &str = "__remainder";

/// How many values a flag consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value; presence sets the flag.
    Switch,
    /// Exactly one value.
    Required,
    /// Zero or one value (`--help[=STRING]`).
    Optional,
}

/// A single flag of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Key the parsed value is stored under.
    pub id: String,
    /// Short form character.
    pub short: Option<char>,
    /// Long form without the leading dashes.
    pub long: String,
    /// Value arity.
    pub arity: Arity,
    /// Kind of value, used for parsing and the help placeholder.
    pub kind: ValueKind,
    /// Help text.
    pub help: Option<String>,
}

impl FlagSpec {
    /// A boolean flag.
    pub fn switch(long: &str, short: Option<char>, help: &str) -> Self {
        Self {
            id: long.to_string(),
            short,
            long: long.to_string(),
            arity: Arity::Switch,
            kind: ValueKind::Bool,
            help: Some(help.to_string()),
        }
    }

    /// A flag requiring a string value.
    pub fn value(long: &str, short: Option<char>, help: &str) -> Self {
        Self {
            arity: Arity::Required,
            kind: ValueKind::String,
            ..Self::switch(long, short, help)
        }
    }

    /// A flag taking an optional string value.
    pub fn optional_value(long: &str, short: Option<char>, help: &str) -> Self {
        Self {
            arity: Arity::Optional,
            kind: ValueKind::String,
            ..Self::switch(long, short, help)
        }
    }

    /// Whether the flag can consume the following token as its value.
    pub fn takes_value(&self) -> bool {
        self.arity != Arity::Switch
    }

    /// Help column signature, e.g. `-c STRING, --collection=STRING`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rinvoke_cli::FlagSpec;
    ///
    /// assert_eq!(FlagSpec::switch("debug", Some('d'), "").signature(), "-d, --debug");
    /// assert_eq!(
    ///     FlagSpec::value("config", Some('f'), "").signature(),
    ///     "-f STRING, --config=STRING"
    /// );
    /// assert_eq!(
    ///     FlagSpec::optional_value("help", Some('h'), "").signature(),
    ///     "-h [STRING], --help[=STRING]"
    /// );
    /// assert_eq!(FlagSpec::switch("complete", None, "").signature(), "--complete");
    /// ```
    pub fn signature(&self) -> String {
        let placeholder = self.kind.placeholder().unwrap_or("STRING");
        let (short_suffix, long_suffix) = match self.arity {
            Arity::Switch => (String::new(), String::new()),
            Arity::Required => (format!(" {placeholder}"), format!("={placeholder}")),
            Arity::Optional => (format!(" [{placeholder}]"), format!("[={placeholder}]")),
        };
        let long = format!("--{}{long_suffix}", self.long);
        match self.short {
            Some(short) => format!("-{short}{short_suffix}, {long}"),
            None => long,
        }
    }

    /// Display ordering: long-only flags first, then by short flag with
    /// lowercase before uppercase.
    fn display_key(&self) -> (bool, char, bool, &str) {
        match self.short {
            Some(c) => (true, c.to_ascii_lowercase(), c.is_ascii_uppercase(), &self.long),
            None => (false, '\0', false, &self.long),
        }
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone()).long(self.long.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        match self.arity {
            Arity::Switch => arg.action(ArgAction::SetTrue),
            Arity::Required => {
                let arg = arg.action(ArgAction::Set).num_args(1);
                match self.kind {
                    ValueKind::Int => arg
                        .value_parser(value_parser!(i64))
                        .allow_negative_numbers(true),
                    _ => arg.value_parser(value_parser!(String)),
                }
            }
            Arity::Optional => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .default_missing_value("")
                .value_parser(value_parser!(String)),
        }
    }
}

/// A bound flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Boolean switch.
    Switch(bool),
    /// String value.
    Text(String),
    /// Integer value.
    Int(i64),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Switch(b) => write!(f, "{b}"),
            FlagValue::Text(s) => write!(f, "{s}"),
            FlagValue::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Result of parsing tokens against a grammar.
///
/// Only flags given on the command line have values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Bound values keyed by flag id.
    pub values: BTreeMap<String, FlagValue>,
    /// Tokens from the first non-flag token onward (trailing grammars only).
    pub remainder: Vec<String>,
}

impl ParsedArgs {
    /// Value bound to `id`.
    pub fn get(&self, id: &str) -> Option<&FlagValue> {
        self.values.get(id)
    }

    /// Returns `true` if the switch `id` was given.
    pub fn flag(&self, id: &str) -> bool {
        matches!(self.values.get(id), Some(FlagValue::Switch(true)))
    }

    /// String value bound to `id`.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.values.get(id) {
            Some(FlagValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// A parse failure, worded for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GrammarError {
    /// First line of the tokenizer's diagnostic.
    pub message: String,
}

impl From<clap::Error> for GrammarError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.render().to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        Self { message }
    }
}

/// A set of flags plus the rules for parsing against them.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::{FlagSpec, FlagValue, OptionGrammar};
///
/// let grammar = OptionGrammar::new("core")
///     .with_flag(FlagSpec::value("collection", Some('c'), "Collection name"))
///     .with_flag(FlagSpec::switch("list", Some('l'), "List tasks"))
///     .trailing();
///
/// let tokens: Vec<String> = ["-c", "integration", "build", "--fast"]
///     .iter()
///     .map(|t| t.to_string())
///     .collect();
/// let parsed = grammar.parse(&tokens).unwrap();
/// assert_eq!(parsed.text("collection"), Some("integration"));
/// assert!(!parsed.flag("list"));
/// assert_eq!(parsed.remainder, vec!["build", "--fast"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGrammar {
    name: String,
    flags: Vec<FlagSpec>,
    trailing: bool,
}

impl OptionGrammar {
    /// Creates an empty grammar.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: Vec::new(),
            trailing: false,
        }
    }

    /// Builds the grammar for a task's parameters.
    ///
    /// Parameters without a declared short flag get the first character of
    /// their name not already taken within the task, in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rinvoke_cli::OptionGrammar;
    /// use rinvoke_core::{Parameter, Task};
    ///
    /// let punch = Task::new("punch")
    ///     .with_param(Parameter::string("who"))
    ///     .with_param(Parameter::string("why"));
    /// let grammar = OptionGrammar::for_task(&punch);
    ///
    /// assert_eq!(grammar.find_long("who").unwrap().short, Some('w'));
    /// assert_eq!(grammar.find_long("why").unwrap().short, Some('h'));
    /// ```
    pub fn for_task(task: &Task) -> Self {
        let mut taken: HashSet<char> = task.parameters.iter().filter_map(|p| p.short).collect();
        let mut grammar = Self::new(&task.name);

        for param in &task.parameters {
            let short = param.short.or_else(|| {
                let c = param
                    .name
                    .chars()
                    .find(|c| c.is_ascii_alphanumeric() && !taken.contains(c))?;
                taken.insert(c);
                Some(c)
            });
            grammar.flags.push(FlagSpec {
                id: param.name.clone(),
                short,
                long: param.long_name(),
                arity: if param.takes_value() {
                    Arity::Required
                } else {
                    Arity::Switch
                },
                kind: param.kind,
                help: param.help.clone(),
            });
        }

        grammar
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds several flags.
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = FlagSpec>) -> Self {
        self.flags.extend(flags);
        self
    }

    /// Stops parsing at the first non-flag token and keeps the rest as the
    /// remainder instead of rejecting it.
    pub fn trailing(mut self) -> Self {
        self.trailing = true;
        self
    }

    /// Grammar name (the task name for task grammars).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flags in declaration order.
    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    /// Flags in display order.
    pub fn sorted_flags(&self) -> Vec<&FlagSpec> {
        let mut flags: Vec<&FlagSpec> = self.flags.iter().collect();
        flags.sort_by(|a, b| a.display_key().cmp(&b.display_key()));
        flags
    }

    /// Returns `true` if the grammar has no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Finds a flag by long form.
    pub fn find_long(&self, long: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.long == long)
    }

    /// Finds a flag by short form.
    pub fn find_short(&self, short: char) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.short == Some(short))
    }

    /// Returns `true` if `token` is a flag of this grammar whose value is the
    /// next token (as opposed to attached with `=` or inline).
    ///
    /// # Examples
    ///
    /// ```
    /// use rinvoke_cli::{FlagSpec, OptionGrammar};
    ///
    /// let grammar = OptionGrammar::new("t")
    ///     .with_flag(FlagSpec::value("name", Some('n'), ""))
    ///     .with_flag(FlagSpec::switch("loud", Some('l'), ""));
    ///
    /// assert!(grammar.expects_value("--name"));
    /// assert!(grammar.expects_value("-n"));
    /// assert!(grammar.expects_value("-ln"));
    /// assert!(!grammar.expects_value("--name=x"));
    /// assert!(!grammar.expects_value("-nx"));
    /// assert!(!grammar.expects_value("--loud"));
    /// assert!(!grammar.expects_value("name"));
    /// ```
    pub fn expects_value(&self, token: &str) -> bool {
        if token == "--" {
            return false;
        }
        if let Some(long) = token.strip_prefix("--") {
            return !long.contains('=') && self.find_long(long).is_some_and(FlagSpec::takes_value);
        }
        let Some(shorts) = token.strip_prefix('-') else {
            return false;
        };
        for (i, c) in shorts.char_indices() {
            match self.find_short(c) {
                Some(flag) if flag.takes_value() => return i + c.len_utf8() == shorts.len(),
                Some(_) => continue,
                None => return false,
            }
        }
        false
    }

    /// Parses `tokens` against the grammar.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for unknown flags, missing or invalid
    /// values, and (for non-trailing grammars) stray positional tokens.
    pub fn parse(&self, tokens: &[String]) -> Result<ParsedArgs, GrammarError> {
        let matches = self.command().try_get_matches_from(tokens)?;

        let mut parsed = ParsedArgs::default();
        for flag in &self.flags {
            if matches.value_source(&flag.id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let value = match (flag.arity, flag.kind) {
                (Arity::Switch, _) => FlagValue::Switch(matches.get_flag(&flag.id)),
                (_, ValueKind::Int) => match matches.get_one::<i64>(&flag.id) {
                    Some(i) => FlagValue::Int(*i),
                    None => continue,
                },
                _ => FlagValue::Text(
                    matches
                        .get_one::<String>(&flag.id)
                        .cloned()
                        .unwrap_or_default(),
                ),
            };
            parsed.values.insert(flag.id.clone(), value);
        }

        if self.trailing {
            parsed.remainder = matches
                .get_many::<String>(REMAINDER_ID)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
        }

        Ok(parsed)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true);
        for flag in &self.flags {
            cmd = cmd.arg(flag.to_arg());
        }
        if self.trailing {
            cmd = cmd.arg(
                Arg::new(REMAINDER_ID)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .value_parser(value_parser!(String)),
            );
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use rinvoke_core::Parameter;

    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn print_name() -> Task {
        Task::new("print_name")
            .with_param(Parameter::string("name").with_help("Name to print"))
            .with_param(Parameter::boolean("loud"))
            .with_param(Parameter::int("times"))
    }

    #[test]
    fn test_task_grammar_parses_values() {
        let grammar = OptionGrammar::for_task(&print_name());
        let parsed = grammar.parse(&tokens("--name inigo -l --times=3")).unwrap();

        assert_eq!(parsed.text("name"), Some("inigo"));
        assert!(parsed.flag("loud"));
        assert_eq!(parsed.get("times"), Some(&FlagValue::Int(3)));
    }

    #[test]
    fn test_absent_flags_have_no_value() {
        let grammar = OptionGrammar::for_task(&print_name());
        let parsed = grammar.parse(&[]).unwrap();
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn test_task_grammar_rejects_unknown_flag() {
        let grammar = OptionGrammar::for_task(&print_name());
        let err = grammar.parse(&tokens("--bogus")).unwrap_err();
        assert!(err.message.contains("--bogus"), "{}", err.message);
    }

    #[test]
    fn test_task_grammar_rejects_stray_positional() {
        let grammar = OptionGrammar::for_task(&print_name());
        assert!(grammar.parse(&tokens("--name inigo montoya")).is_err());
    }

    #[test]
    fn test_task_grammar_rejects_missing_value() {
        let grammar = OptionGrammar::for_task(&print_name());
        assert!(grammar.parse(&tokens("--name")).is_err());
    }

    #[test]
    fn test_int_parameter_rejects_text() {
        let grammar = OptionGrammar::for_task(&print_name());
        assert!(grammar.parse(&tokens("--times many")).is_err());
    }

    #[test]
    fn test_short_flag_assignment_respects_declared_shorts() {
        let task = Task::new("deploy")
            .with_param(Parameter::string("env"))
            .with_param(Parameter::boolean("echo").with_short('e'));
        let grammar = OptionGrammar::for_task(&task);

        assert_eq!(grammar.find_long("echo").unwrap().short, Some('e'));
        assert_eq!(grammar.find_long("env").unwrap().short, Some('n'));
    }

    #[test]
    fn test_short_flag_assignment_exhausted() {
        let task = Task::new("t")
            .with_param(Parameter::string("a"))
            .with_param(Parameter::string("a_"));
        let grammar = OptionGrammar::for_task(&task);

        assert_eq!(grammar.find_long("a").unwrap().short, Some('a'));
        assert_eq!(grammar.find_long("a-").unwrap().short, None);
    }

    #[test]
    fn test_trailing_grammar_keeps_flags_after_first_positional() {
        let grammar = OptionGrammar::new("core")
            .with_flag(FlagSpec::switch("debug", Some('d'), ""))
            .trailing();
        let parsed = grammar.parse(&tokens("-d build --debug -x")).unwrap();

        assert!(parsed.flag("debug"));
        assert_eq!(parsed.remainder, tokens("build --debug -x"));
    }

    #[test]
    fn test_optional_value() {
        let grammar = OptionGrammar::new("core")
            .with_flag(FlagSpec::optional_value("help", Some('h'), ""))
            .trailing();

        let bare = grammar.parse(&tokens("-h")).unwrap();
        assert_eq!(bare.text("help"), Some(""));

        let named = grammar.parse(&tokens("-h punch")).unwrap();
        assert_eq!(named.text("help"), Some("punch"));
        assert!(named.remainder.is_empty());
    }

    #[test]
    fn test_sorted_flags_display_order() {
        let grammar = OptionGrammar::new("core")
            .with_flag(FlagSpec::switch("hide", Some('H'), ""))
            .with_flag(FlagSpec::switch("version", Some('V'), ""))
            .with_flag(FlagSpec::switch("help", Some('h'), ""))
            .with_flag(FlagSpec::switch("no-dedupe", None, ""))
            .with_flag(FlagSpec::switch("complete", None, ""))
            .with_flag(FlagSpec::switch("warn-only", Some('w'), ""));

        let order: Vec<&str> = grammar
            .sorted_flags()
            .iter()
            .map(|f| f.long.as_str())
            .collect();
        assert_eq!(
            order,
            vec!["complete", "no-dedupe", "help", "hide", "version", "warn-only"]
        );
    }
}
