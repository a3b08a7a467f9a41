//! Task-boundary splitting.
//!
//! After the core flags are consumed, the remaining tokens hold one or more
//! task invocations back to back (`build --release test -k unit`). A token
//! starts a new task when it names a task or alias and is not the value of
//! the preceding flag. Splitting is a small state machine so that the
//! "task name or flag value?" decision is made in exactly one place.

use rinvoke_core::{Collection, Task};
use tracing::debug;

use crate::error::ProgramError;
use crate::grammar::OptionGrammar;

/// One task's slice of the command line.
#[derive(Debug, Clone)]
pub struct TaskSpan<'a> {
    /// The resolved task.
    pub task: &'a Task,
    /// Name the task was invoked by (may be an alias).
    pub invoked_as: String,
    /// Grammar built from the task's parameters.
    pub grammar: OptionGrammar,
    /// Tokens belonging to this task, flags and values.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a task name.
    TaskName,
    /// Inside a task's arguments.
    TaskArgs,
    /// The previous token was a flag whose value comes next.
    FlagValue,
}

/// Splits `tokens` into per-task spans.
///
/// Only tasks that actually appear get a grammar built. Tasks take no
/// positional arguments, so any bare word that is not a flag value starts a
/// new span. Unknown flags stay in the current span and are rejected when
/// that span is parsed.
///
/// # Errors
///
/// Returns [`ProgramError::UnknownTask`] when a bare word is not a known task
/// name or alias.
pub fn split_task_spans<'a>(
    tokens: &[String],
    collection: &'a Collection,
) -> Result<Vec<TaskSpan<'a>>, ProgramError> {
    let mut spans: Vec<TaskSpan<'a>> = Vec::new();
    let mut state = State::TaskName;

    for token in tokens {
        state = match state {
            State::TaskName => {
                spans.push(start_span(collection, token)?);
                State::TaskArgs
            }
            State::FlagValue => {
                push_arg(&mut spans, token);
                State::TaskArgs
            }
            State::TaskArgs => {
                let expects_value = spans
                    .last()
                    .is_some_and(|span| span.grammar.expects_value(token));
                if expects_value {
                    push_arg(&mut spans, token);
                    State::FlagValue
                } else if !token.starts_with('-') {
                    spans.push(start_span(collection, token)?);
                    State::TaskArgs
                } else {
                    push_arg(&mut spans, token);
                    State::TaskArgs
                }
            }
        };
    }

    debug!(
        tasks = ?spans.iter().map(|s| s.task.name.as_str()).collect::<Vec<_>>(),
        "Split task invocations"
    );
    Ok(spans)
}

fn start_span<'a>(collection: &'a Collection, token: &str) -> Result<TaskSpan<'a>, ProgramError> {
    let task = collection
        .find_task(token)
        .ok_or_else(|| ProgramError::UnknownTask(token.to_string()))?;
    Ok(TaskSpan {
        task,
        invoked_as: token.to_string(),
        grammar: OptionGrammar::for_task(task),
        args: Vec::new(),
    })
}

fn push_arg(spans: &mut [TaskSpan<'_>], token: &str) {
    if let Some(span) = spans.last_mut() {
        span.args.push(token.to_string());
    }
}
