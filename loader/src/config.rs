//! Runtime configuration file.
//!
//! Selected with `-f/--config`, the file supplies defaults for how task
//! commands are run. Command-line flags take precedence; the dispatcher does
//! the layering.
//!
//! # Example YAML
//!
//! ```yaml
//! run:
//!   echo: true
//!   warn: false
//!   hide: out
//!   shell: /bin/bash
//! tasks:
//!   dedupe: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};
use crate::locator::extension;

/// Shell used to run task commands when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Settings for running shell commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Echo commands before running them.
    pub echo: bool,
    /// Request a pseudo-terminal.
    pub pty: bool,
    /// Warn instead of failing when a command exits non-zero.
    pub warn: bool,
    /// Which output streams to hide (`out`, `err`, `both`).
    pub hide: Option<String>,
    /// Shell program commands are passed to with `-c`.
    pub shell: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            echo: false,
            pty: false,
            warn: false,
            hide: None,
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

/// Settings for task scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Drop repeated identical task calls.
    pub dedupe: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self { dedupe: true }
    }
}

/// Top-level runtime configuration.
///
/// # Examples
///
/// ```
/// use rinvoke_loader::RuntimeConfig;
///
/// let config = RuntimeConfig::default();
/// assert!(config.tasks.dedupe);
/// assert_eq!(config.run.shell, "/bin/sh");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Command execution settings.
    pub run: RunConfig,
    /// Task scheduling settings.
    pub tasks: TaskConfig,
}

impl RuntimeConfig {
    /// Loads configuration from a YAML or JSON file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoaderError::IoError) if the file cannot
    /// be read, [`YamlError`](crate::LoaderError::YamlError) or
    /// [`JsonError`](crate::LoaderError::JsonError) if parsing fails, and
    /// [`UnsupportedFormat`](crate::LoaderError::UnsupportedFormat) for other
    /// extensions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = match extension(path) {
            Some("yaml" | "yml") => serde_yaml::from_str(&contents)?,
            Some("json") => serde_json::from_str(&contents)?,
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(config)
    }
}
