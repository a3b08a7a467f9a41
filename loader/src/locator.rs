//! Collection discovery on disk.
//!
//! A collection lives in a single YAML or JSON file named after the
//! collection (`tasks.yaml`, `tasks.yml` or `tasks.json` for the default
//! name). [`FsLocator`] looks for that file in the search root and then in
//! each of its ancestors, so a command run from a subdirectory of a project
//! still finds the project's collection.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use rinvoke_loader::{CollectionLocator, FsLocator};
//!
//! let collection = FsLocator::new().locate(Path::new("."), "tasks").unwrap();
//! for task in &collection.tasks {
//!     println!("{}", task.name);
//! }
//! ```

use std::path::{Path, PathBuf};

use rinvoke_core::{Collection, validate_collection};
use tracing::debug;

use crate::error::{LoaderError, Result};

/// Collection name searched for when none is given explicitly.
pub const DEFAULT_COLLECTION_NAME: &str = "tasks";

/// File extensions tried for each candidate directory, in order.
pub const COLLECTION_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Finds and loads a collection by name.
///
/// Implementations own the search strategy. The dispatcher calls
/// [`locate`](CollectionLocator::locate) at most once per run.
pub trait CollectionLocator {
    /// Locates the collection called `name`, starting from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NotFound`] naming `name` exactly when no
    /// collection exists, or another [`LoaderError`] when one exists but
    /// cannot be loaded.
    fn locate(&self, root: &Path, name: &str) -> Result<Collection>;
}

/// Filesystem locator walking upward from the search root.
#[derive(Debug, Clone, Default)]
pub struct FsLocator {
    /// Stop searching after this many ancestors (unbounded when `None`).
    max_depth: Option<usize>,
}

impl FsLocator {
    /// Creates a locator that searches every ancestor of the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the search to the root plus `depth` ancestors.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Returns the path of the collection file, if one exists.
    pub fn find(&self, root: &Path, name: &str) -> Option<PathBuf> {
        let limit = self.max_depth.map_or(usize::MAX, |d| d.saturating_add(1));
        for dir in root.ancestors().take(limit) {
            for ext in COLLECTION_EXTENSIONS {
                let candidate = dir.join(format!("{name}.{ext}"));
                debug!(path = ?candidate, "Checking for collection");
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl CollectionLocator for FsLocator {
    fn locate(&self, root: &Path, name: &str) -> Result<Collection> {
        let path = self
            .find(root, name)
            .ok_or_else(|| LoaderError::NotFound(name.to_string()))?;
        load_collection(&path)
    }
}

/// Loads and validates a collection file.
///
/// The format is chosen by extension. The collection's name is set to the
/// file stem when the file does not declare one.
///
/// # Errors
///
/// Returns [`LoaderError::IoError`] if the file cannot be read,
/// [`LoaderError::YamlError`]/[`LoaderError::JsonError`] if it does not
/// parse, [`LoaderError::UnsupportedFormat`] for unknown extensions, and
/// [`LoaderError::InvalidCollection`] if validation fails.
pub fn load_collection(path: impl AsRef<Path>) -> Result<Collection> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let mut collection: Collection = match extension(path) {
        Some("yaml" | "yml") => serde_yaml::from_str(&contents)?,
        Some("json") => serde_json::from_str(&contents)?,
        _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
    };

    if collection.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            collection.name = stem.to_string();
        }
    }

    let errors = validate_collection(&collection);
    if !errors.is_empty() {
        return Err(LoaderError::InvalidCollection {
            path: path.to_path_buf(),
            errors,
        });
    }

    debug!(path = ?path, tasks = collection.len(), "Loaded collection");
    Ok(collection)
}

pub(crate) fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
