//! Task execution.
//!
//! Dispatch ends in a [`TaskExecutor`]. The bundled [`ShellExecutor`] runs a
//! task's `run` lines through a shell with `{param}` placeholders replaced
//! by the bound (shell-quoted) values. Embedders and tests supply their own
//! executor to record or redirect calls.

use std::collections::BTreeMap;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rinvoke_core::{Task, ValueKind};
use rinvoke_loader::DEFAULT_SHELL;
use thiserror::Error;
use tracing::{debug, warn};

use crate::grammar::FlagValue;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_-]*)\}").expect("static regex must compile")
});

/// Arguments bound for one task call, keyed by parameter name.
pub type TaskArgs = BTreeMap<String, FlagValue>;

/// Which output streams of executed commands are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hide {
    /// Show everything.
    #[default]
    None,
    /// Discard stdout.
    Out,
    /// Discard stderr.
    Err,
    /// Discard both.
    Both,
}

impl Hide {
    fn hides_out(self) -> bool {
        matches!(self, Hide::Out | Hide::Both)
    }

    fn hides_err(self) -> bool {
        matches!(self, Hide::Err | Hide::Both)
    }
}

impl FromStr for Hide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" | "false" => Ok(Hide::None),
            "out" | "stdout" => Ok(Hide::Out),
            "err" | "stderr" => Ok(Hide::Err),
            "both" | "true" => Ok(Hide::Both),
            other => Err(format!("invalid hide value '{other}'")),
        }
    }
}

/// How commands are run, after layering flags over the runtime config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Print each command before running it.
    pub echo: bool,
    /// Requested pseudo-terminal (unsupported, logged).
    pub pty: bool,
    /// Warn and continue when a command fails.
    pub warn_only: bool,
    /// Streams to discard.
    pub hide: Hide,
    /// Shell passed each command with `-c`.
    pub shell: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            echo: false,
            pty: false,
            warn_only: false,
            hide: Hide::None,
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

/// Errors raised while running a task.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The shell could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited unsuccessfully.
    #[error("command '{command}' exited with status {code}")]
    CommandFailed { command: String, code: i32 },

    /// A bound value contains a NUL byte.
    #[error("value of '{param}' cannot be shell-quoted")]
    Quote { param: String },
}

/// Runs a single task call.
pub trait TaskExecutor {
    /// Executes `task` with its bound arguments.
    fn execute(&self, task: &Task, args: &TaskArgs, options: &RunOptions) -> Result<(), ExecError>;
}

/// Runs `run` lines through a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    /// A shell executor.
    pub fn new() -> Self {
        Self
    }
}

impl TaskExecutor for ShellExecutor {
    fn execute(&self, task: &Task, args: &TaskArgs, options: &RunOptions) -> Result<(), ExecError> {
        if options.pty {
            warn!(task = %task.name, "pty execution is not supported, running without one");
        }

        for template in &task.run {
            let command = render_command(task, template, args)?;
            if options.echo {
                println!("{command}");
            }
            debug!(task = %task.name, command = %command, shell = %options.shell, "Running command");

            let mut process = Command::new(&options.shell);
            process.arg("-c").arg(&command).stdin(Stdio::inherit());
            if options.hide.hides_out() {
                process.stdout(Stdio::null());
            }
            if options.hide.hides_err() {
                process.stderr(Stdio::null());
            }

            let status = process.status().map_err(|source| ExecError::Spawn {
                command: command.clone(),
                source,
            })?;
            if status.success() {
                continue;
            }

            // Killed by a signal has no code.
            let code = status.code().unwrap_or(1);
            if options.warn_only {
                warn!(task = %task.name, command = %command, code, "Command failed");
            } else {
                return Err(ExecError::CommandFailed { command, code });
            }
        }
        Ok(())
    }
}

/// Substitutes `{param}` placeholders in `template`.
///
/// Placeholders are matched against parameter names (or their dashed long
/// forms); unknown placeholders are left as written. Values are shell-quoted
/// only when needed.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::{FlagValue, TaskArgs, render_command};
/// use rinvoke_core::{Parameter, Task};
///
/// let task = Task::new("greet")
///     .with_param(Parameter::string("name").with_default("world"))
///     .with_param(Parameter::boolean("loud"));
///
/// let mut args = TaskArgs::new();
/// assert_eq!(
///     render_command(&task, "echo {name} {loud}", &args).unwrap(),
///     "echo world false"
/// );
///
/// args.insert("name".into(), FlagValue::Text("dread pirate".into()));
/// assert_eq!(
///     render_command(&task, "echo {name} {other}", &args).unwrap(),
///     "echo 'dread pirate' {other}"
/// );
/// ```
pub fn render_command(task: &Task, template: &str, args: &TaskArgs) -> Result<String, ExecError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(param) = task
            .parameters
            .iter()
            .find(|p| p.name == key.as_str() || p.long_name() == key.as_str())
        else {
            continue;
        };

        let value = match args.get(&param.name) {
            Some(value) => value.to_string(),
            None => match (&param.default, param.kind) {
                (Some(default), _) => default.clone(),
                (None, ValueKind::Bool) => "false".to_string(),
                (None, _) => String::new(),
            },
        };
        let quoted = shlex::try_quote(&value).map_err(|_| ExecError::Quote {
            param: param.name.clone(),
        })?;

        out.push_str(&template[last..whole.start()]);
        out.push_str(&quoted);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use rinvoke_core::Parameter;

    use super::*;

    fn greet() -> Task {
        Task::new("greet")
            .with_param(Parameter::string("name"))
            .with_param(Parameter::int("times").with_default("1"))
            .with_param(Parameter::string("dry_run"))
    }

    #[test]
    fn test_render_substitutes_bound_values() {
        let mut args = TaskArgs::new();
        args.insert("name".into(), FlagValue::Text("inigo".into()));
        args.insert("times".into(), FlagValue::Int(3));

        assert_eq!(
            render_command(&greet(), "echo {name} x{times}", &args).unwrap(),
            "echo inigo x3"
        );
    }

    #[test]
    fn test_render_unset_without_default_is_empty() {
        assert_eq!(
            render_command(&greet(), "echo [{name}] {times}", &TaskArgs::new()).unwrap(),
            "echo [''] 1"
        );
    }

    #[test]
    fn test_render_accepts_long_form_placeholder() {
        let mut args = TaskArgs::new();
        args.insert("dry_run".into(), FlagValue::Text("yes".into()));
        assert_eq!(
            render_command(&greet(), "{dry-run} {dry_run}", &args).unwrap(),
            "yes yes"
        );
    }

    #[test]
    fn test_render_quotes_shell_metacharacters() {
        let mut args = TaskArgs::new();
        args.insert("name".into(), FlagValue::Text("a; rm -rf /".into()));
        assert_eq!(
            render_command(&greet(), "echo {name}", &args).unwrap(),
            "echo 'a; rm -rf /'"
        );
    }

    #[test]
    fn test_render_rejects_nul() {
        let mut args = TaskArgs::new();
        args.insert("name".into(), FlagValue::Text("a\0b".into()));
        assert!(matches!(
            render_command(&greet(), "echo {name}", &args),
            Err(ExecError::Quote { .. })
        ));
    }

    #[test]
    fn test_hide_from_str() {
        assert_eq!("out".parse::<Hide>().unwrap(), Hide::Out);
        assert_eq!("stderr".parse::<Hide>().unwrap(), Hide::Err);
        assert_eq!("BOTH".parse::<Hide>().unwrap(), Hide::Both);
        assert_eq!("none".parse::<Hide>().unwrap(), Hide::None);
        assert!("sideways".parse::<Hide>().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_reports_exit_code() {
        let task = Task::new("fail").with_run("exit 3");
        let err = ShellExecutor::new()
            .execute(&task, &TaskArgs::new(), &RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExecError::CommandFailed { code: 3, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_warn_only_continues() {
        let task = Task::new("fail").with_run("exit 3").with_run("true");
        let options = RunOptions {
            warn_only: true,
            hide: Hide::Both,
            ..RunOptions::default()
        };
        assert!(ShellExecutor::new().execute(&task, &TaskArgs::new(), &options).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_executor_missing_shell() {
        let task = Task::new("t").with_run("true");
        let options = RunOptions {
            shell: "/nonexistent/shell".into(),
            ..RunOptions::default()
        };
        let err = ShellExecutor::new()
            .execute(&task, &TaskArgs::new(), &options)
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
