//! Program identity resolution.
//!
//! The displayed name and binary default to values derived from how the
//! program was invoked, so a copy installed as `/usr/local/bin/myapp`
//! introduces itself as `Myapp` and shows `myapp` in usage lines.

use std::path::Path;

/// Version reported when none is configured.
pub const DEFAULT_VERSION: &str = "unknown";

/// Configured identity of a [`Program`](crate::Program).
///
/// # Examples
///
/// ```
/// use rinvoke_cli::ProgramIdentity;
///
/// let identity = ProgramIdentity::default();
/// assert_eq!(identity.version, "unknown");
/// assert_eq!(identity.display_name("/usr/local/bin/myapp"), "Myapp");
/// assert_eq!(identity.display_binary("/usr/local/bin/myapp"), "myapp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramIdentity {
    /// Name shown by `--version`, derived from the invocation when `None`.
    pub name: Option<String>,
    /// Binary shown in usage lines, derived from the invocation when `None`.
    pub binary: Option<String>,
    /// Version shown by `--version`.
    pub version: String,
}

impl Default for ProgramIdentity {
    fn default() -> Self {
        Self {
            name: None,
            binary: None,
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl ProgramIdentity {
    /// Name to display for an invocation path.
    pub fn display_name(&self, invoked_as: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => capitalize(basename(invoked_as)),
        }
    }

    /// Binary to display for an invocation path.
    pub fn display_binary(&self, invoked_as: &str) -> String {
        match &self.binary {
            Some(binary) => binary.clone(),
            None => basename(invoked_as).to_string(),
        }
    }
}

/// Final path component of the invocation path.
pub fn basename(invoked_as: &str) -> &str {
    Path::new(invoked_as)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(invoked_as)
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
