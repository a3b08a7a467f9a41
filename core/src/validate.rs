//! Collection validation.
//!
//! Validates the structural invariants a collection must hold before the
//! dispatcher can build parsers from it: unique task names and aliases,
//! unique parameters and short flags per task, resolvable default and
//! pre-tasks, and no cycles through pre-tasks.
//!
//! # Examples
//!
//! ```
//! use rinvoke_core::*;
//!
//! let collection = Collection::new("tasks")
//!     .with_task(Task::new("build").with_param(Parameter::boolean("release")));
//! assert!(validate_collection(&collection).is_empty());
//!
//! // Invalid: alias shadows another task's name
//! let bad = Collection::new("tasks")
//!     .with_task(Task::new("build"))
//!     .with_task(Task::new("test").with_alias("build"));
//! assert!(!validate_collection(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Collection, Task};

/// Collection validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Task name is empty or whitespace-only.
    #[error("task name cannot be empty")]
    EmptyTaskName,
    /// Two tasks share a name or alias.
    #[error("duplicate task name or alias: {0}")]
    DuplicateTask(String),
    /// Parameter name is empty or whitespace-only.
    #[error("task '{task}' has a parameter with an empty name")]
    EmptyParameterName { task: String },
    /// Two parameters of one task map to the same long flag.
    #[error("task '{task}' declares parameter '{param}' more than once")]
    DuplicateParameter { task: String, param: String },
    /// Declared short flag is not alphanumeric.
    #[error("task '{task}' declares invalid short flag '{flag}'")]
    InvalidShortFlag { task: String, flag: char },
    /// Two parameters of one task declare the same short flag.
    #[error("task '{task}' declares short flag '-{flag}' more than once")]
    DuplicateShortFlag { task: String, flag: char },
    /// The collection's default task does not exist.
    #[error("default task '{0}' does not exist")]
    UnknownDefaultTask(String),
    /// A pre-task does not exist.
    #[error("task '{task}' runs unknown pre-task '{pre}'")]
    UnknownPreTask { task: String, pre: String },
    /// Pre-tasks form a cycle.
    #[error("pre-task cycle detected at path: {0}")]
    PreTaskCycle(String),
}

/// Validates a collection.
///
/// Returns the first problem found, or an empty vector if the collection is
/// valid.
///
/// # Examples
///
/// ```
/// use rinvoke_core::*;
///
/// // Pre-task cycle: a → b → a
/// let collection = Collection::new("tasks")
///     .with_task(Task::new("a").with_pre("b"))
///     .with_task(Task::new("b").with_pre("a"));
/// let errors = validate_collection(&collection);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::PreTaskCycle(_))));
/// ```
pub fn validate_collection(collection: &Collection) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for task in &collection.tasks {
        let name = task.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyTaskName);
            return errors;
        }
        for invocable in std::iter::once(name).chain(task.aliases.iter().map(|a| a.trim())) {
            if !seen.insert(invocable) {
                errors.push(ValidationError::DuplicateTask(invocable.to_string()));
                return errors;
            }
        }

        errors.extend(validate_parameters(task));
        if !errors.is_empty() {
            return errors;
        }
    }

    if let Some(default) = &collection.default {
        if !collection.contains(default) {
            errors.push(ValidationError::UnknownDefaultTask(default.clone()));
            return errors;
        }
    }

    for task in &collection.tasks {
        let mut path = vec![task.name.clone()];
        errors.extend(validate_pre_tasks(collection, task, &mut path));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_parameters(task: &Task) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut longs = HashSet::new();
    let mut shorts = HashSet::new();

    for param in &task.parameters {
        if param.name.trim().is_empty() {
            errors.push(ValidationError::EmptyParameterName {
                task: task.name.clone(),
            });
            return errors;
        }

        if !longs.insert(param.long_name()) {
            errors.push(ValidationError::DuplicateParameter {
                task: task.name.clone(),
                param: param.name.clone(),
            });
            return errors;
        }

        if let Some(short) = param.short {
            if !short.is_ascii_alphanumeric() {
                errors.push(ValidationError::InvalidShortFlag {
                    task: task.name.clone(),
                    flag: short,
                });
                return errors;
            }
            if !shorts.insert(short) {
                errors.push(ValidationError::DuplicateShortFlag {
                    task: task.name.clone(),
                    flag: short,
                });
                return errors;
            }
        }
    }

    errors
}

fn validate_pre_tasks(
    collection: &Collection,
    task: &Task,
    path: &mut Vec<String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for pre in &task.pre {
        let Some(pre_task) = collection.find_task(pre) else {
            errors.push(ValidationError::UnknownPreTask {
                task: task.name.clone(),
                pre: pre.clone(),
            });
            return errors;
        };

        if path.iter().any(|segment| *segment == pre_task.name) {
            let cycle_path = path
                .iter()
                .cloned()
                .chain(std::iter::once(pre_task.name.clone()))
                .collect::<Vec<_>>()
                .join(" -> ");
            errors.push(ValidationError::PreTaskCycle(cycle_path));
            return errors;
        }

        path.push(pre_task.name.clone());
        errors.extend(validate_pre_tasks(collection, pre_task, path));
        path.pop();
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}
