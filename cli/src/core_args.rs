//! The program-level flag set.
//!
//! The core flags are fixed. The task-discovery flags (`--collection`,
//! `--root`) only exist when tasks are discovered on disk; with an injected
//! collection they are not offered at all.

use rinvoke_core::Namespace;

use crate::grammar::{FlagSpec, GrammarError, OptionGrammar};

pub const COMPLETE: &str = "complete";
pub const NO_DEDUPE: &str = "no-dedupe";
pub const COLLECTION: &str = "collection";
pub const DEBUG: &str = "debug";
pub const ECHO: &str = "echo";
pub const CONFIG: &str = "config";
pub const HELP: &str = "help";
pub const HIDE: &str = "hide";
pub const LIST: &str = "list";
pub const PTY: &str = "pty";
pub const ROOT: &str = "root";
pub const VERSION: &str = "version";
pub const WARN_ONLY: &str = "warn-only";

/// Flags available regardless of how tasks are found.
pub fn core_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::switch(
            COMPLETE,
            None,
            "Print tab-completion candidates for given parse remainder.",
        ),
        FlagSpec::switch(NO_DEDUPE, None, "Disable task deduplication."),
        FlagSpec::switch(DEBUG, Some('d'), "Enable debug output."),
        FlagSpec::switch(ECHO, Some('e'), "Echo executed commands before running."),
        FlagSpec::value(CONFIG, Some('f'), "Runtime configuration file to use."),
        FlagSpec::optional_value(HELP, Some('h'), "Show core or per-task help and exit."),
        FlagSpec::value(
            HIDE,
            Some('H'),
            "Set default output hiding for shell commands (out, err or both).",
        ),
        FlagSpec::switch(LIST, Some('l'), "List available tasks."),
        FlagSpec::switch(PTY, Some('p'), "Use a pty when executing shell commands."),
        FlagSpec::switch(VERSION, Some('V'), "Show version and exit."),
        FlagSpec::switch(
            WARN_ONLY,
            Some('w'),
            "Warn, instead of failing, when shell commands fail.",
        ),
    ]
}

/// Flags only offered when tasks are discovered on disk.
pub fn task_discovery_flags() -> Vec<FlagSpec> {
    vec![
        FlagSpec::value(COLLECTION, Some('c'), "Specify collection name to load."),
        FlagSpec::value(
            ROOT,
            Some('r'),
            "Change root directory used for finding task collections.",
        ),
    ]
}

/// Builds the core grammar for a namespace.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::core_grammar;
/// use rinvoke_core::{Collection, Namespace};
///
/// assert!(core_grammar(&Namespace::AutoDiscover).find_long("collection").is_some());
/// assert!(core_grammar(&Namespace::Fixed(Collection::new("blank"))).find_long("collection").is_none());
/// ```
pub fn core_grammar(namespace: &Namespace) -> OptionGrammar {
    let grammar = OptionGrammar::new("core").with_flags(core_flags());
    let grammar = match namespace {
        Namespace::AutoDiscover => grammar.with_flags(task_discovery_flags()),
        Namespace::Fixed(_) => grammar,
    };
    grammar.trailing()
}

/// What `--help` asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpRequest {
    /// Core help.
    Core,
    /// Help for the named task.
    Task(String),
}

/// Core flags matched against the start of an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCore {
    args: crate::grammar::ParsedArgs,
}

impl ParsedCore {
    /// Parses `tokens` against `grammar`; parsing stops at the first token
    /// that is neither a core flag nor a core flag's value.
    pub fn parse(grammar: &OptionGrammar, tokens: &[String]) -> Result<Self, GrammarError> {
        Ok(Self {
            args: grammar.parse(tokens)?,
        })
    }

    /// Tokens following the core flags.
    pub fn remainder(&self) -> &[String] {
        &self.args.remainder
    }

    pub fn help(&self) -> Option<HelpRequest> {
        let value = self.args.text(HELP)?;
        if value.is_empty() {
            Some(HelpRequest::Core)
        } else {
            Some(HelpRequest::Task(value.to_string()))
        }
    }

    pub fn version(&self) -> bool {
        self.args.flag(VERSION)
    }

    pub fn list(&self) -> bool {
        self.args.flag(LIST)
    }

    pub fn complete(&self) -> bool {
        self.args.flag(COMPLETE)
    }

    pub fn debug(&self) -> bool {
        self.args.flag(DEBUG)
    }

    pub fn echo(&self) -> bool {
        self.args.flag(ECHO)
    }

    pub fn pty(&self) -> bool {
        self.args.flag(PTY)
    }

    pub fn warn_only(&self) -> bool {
        self.args.flag(WARN_ONLY)
    }

    pub fn no_dedupe(&self) -> bool {
        self.args.flag(NO_DEDUPE)
    }

    pub fn hide(&self) -> Option<&str> {
        self.args.text(HIDE)
    }

    pub fn config(&self) -> Option<&str> {
        self.args.text(CONFIG)
    }

    pub fn collection(&self) -> Option<&str> {
        self.args.text(COLLECTION)
    }

    pub fn root(&self) -> Option<&str> {
        self.args.text(ROOT)
    }
}
