//! Core task collection types for rinvoke.
//!
//! This crate defines the model the dispatcher resolves command lines
//! against:
//!
//! - [`Collection`] — a named, ordered registry of tasks with an optional
//!   default task.
//! - [`Task`] — an invocable unit with aliases, parameters, a docstring,
//!   pre-tasks and shell command templates.
//! - [`Parameter`] — a task option with a long flag derived from its name,
//!   an optional short flag and a [`ValueKind`].
//! - [`Namespace`] — whether tasks are discovered on disk or injected.
//!
//! Validation ([`validate_collection`]) catches structural errors such as
//! duplicate task names, clashing short flags and pre-task cycles.
//!
//! Docstrings are dedented for display with [`clean_docstring`].
//!
//! # Example
//!
//! ```
//! use rinvoke_core::*;
//!
//! let collection = Collection::new("tasks")
//!     .with_task(
//!         Task::new("print_name")
//!             .with_param(Parameter::string("name").with_help("Name to print"))
//!             .with_run("echo {name}"),
//!     )
//!     .with_default("print_name");
//!
//! assert_eq!(collection.find_task("print_name").unwrap().parameters.len(), 1);
//! assert!(validate_collection(&collection).is_empty());
//! ```

mod docstring;
mod types;
mod validate;

pub use docstring::{clean_docstring, docstring_summary};
pub use types::*;
pub use validate::{ValidationError, validate_collection};
