//! Collection discovery and runtime configuration loading.
//!
//! This crate provides the filesystem-facing collaborators of the
//! dispatcher: locating a task collection by name and loading the optional
//! runtime configuration file.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use rinvoke_loader::{CollectionLocator, FsLocator, RuntimeConfig, DEFAULT_COLLECTION_NAME};
//!
//! // Find tasks.yaml (or .yml/.json) here or in any parent directory
//! let collection = FsLocator::new()
//!     .locate(Path::new("."), DEFAULT_COLLECTION_NAME)
//!     .unwrap();
//! println!("{} tasks", collection.len());
//!
//! // Load run settings
//! let config = RuntimeConfig::load("rinvoke.yaml").unwrap();
//! println!("echo: {}", config.run.echo);
//! ```

mod config;
mod error;
mod locator;

pub use config::{DEFAULT_SHELL, RunConfig, RuntimeConfig, TaskConfig};
pub use error::{LoaderError, Result};
pub use locator::{
    COLLECTION_EXTENSIONS, CollectionLocator, DEFAULT_COLLECTION_NAME, FsLocator,
    load_collection,
};
