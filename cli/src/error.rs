//! Error types for command-line dispatch.
//!
//! Every failure is terminal for the current invocation. In exiting mode the
//! `Display` text is written to stderr and the process exits with
//! [`ProgramError::exit_code`].

use rinvoke_loader::LoaderError;
use thiserror::Error;

use crate::exec::ExecError;

/// Errors surfaced by [`Program`](crate::Program).
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Core flags could not be parsed (unknown flag, missing value, ...).
    #[error("{0}")]
    Parse(String),

    /// The requested collection does not exist.
    #[error("Can't find any collection named '{0}'!")]
    CollectionNotFound(String),

    /// The collection exists but could not be loaded.
    #[error("{0}")]
    Collection(LoaderError),

    /// A task name or alias does not resolve.
    #[error("No idea what '{0}' is!")]
    UnknownTask(String),

    /// A task's own flags could not be parsed.
    #[error("'{task}' {message}")]
    TaskParse { task: String, message: String },

    /// The runtime configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(LoaderError),

    /// A task command could not be run or failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Writing help or listing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ProgramError {
    /// Process exit status for this error.
    ///
    /// Failed commands propagate their own exit code; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProgramError::Exec(ExecError::CommandFailed { code, .. }) => *code,
            _ => 1,
        }
    }
}

impl From<LoaderError> for ProgramError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::NotFound(name) => ProgramError::CollectionNotFound(name),
            other => ProgramError::Collection(other),
        }
    }
}
