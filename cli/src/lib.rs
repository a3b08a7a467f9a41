//! Command-line resolution and dispatch for rinvoke task collections.
//!
//! A [`Program`] takes a raw invocation (process arguments, a command line
//! string or a token list), matches the core flags, resolves a task
//! collection, splits the remaining tokens into per-task spans, parses each
//! span against that task's [`OptionGrammar`] and hands the resulting calls
//! to a [`TaskExecutor`].
//!
//! # Example
//!
//! ```
//! use rinvoke_cli::Program;
//! use rinvoke_core::{Collection, Parameter, Task};
//!
//! let tasks = Collection::new("tasks").with_task(
//!     Task::new("punch")
//!         .with_param(Parameter::string("who").with_help("Who to punch"))
//!         .with_param(Parameter::string("why").with_help("Motive")),
//! );
//! let program = Program::new().with_namespace(tasks).with_width(80);
//!
//! let mut out = Vec::new();
//! program.run_with_output("myapp --help punch", &mut out).unwrap();
//! let help = String::from_utf8(out).unwrap();
//! assert!(help.starts_with("Usage: myapp [--core-opts] punch [--options]"));
//! assert!(help.contains("  -w STRING, --who=STRING   Who to punch\n"));
//! ```

mod argv;
mod core_args;
mod error;
mod exec;
mod grammar;
pub mod help;
mod identity;
mod logging;
mod program;
mod split;

pub use argv::{Argv, Invocation, normalize};
pub use core_args::{HelpRequest, ParsedCore, core_flags, core_grammar, task_discovery_flags};
pub use error::ProgramError;
pub use exec::{ExecError, Hide, RunOptions, ShellExecutor, TaskArgs, TaskExecutor, render_command};
pub use grammar::{Arity, FlagSpec, FlagValue, GrammarError, OptionGrammar, ParsedArgs};
pub use identity::{DEFAULT_VERSION, ProgramIdentity};
pub use logging::LOG_ENV;
pub use program::{Program, TaskCall, completions, dedupe, expand_pre_tasks};
pub use split::{TaskSpan, split_task_spans};

/// The bundled program behind the `rinvoke` and `rinv` binaries.
pub fn program() -> Program {
    Program::new()
        .with_name("Rinvoke")
        .with_binary("rinv[oke]")
        .with_version(env!("CARGO_PKG_VERSION"))
}
