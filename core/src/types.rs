//! Task collection type definitions.
//!
//! This module defines the data model the dispatcher works against: a
//! [`Collection`] of [`Task`]s, each declaring the [`Parameter`]s it accepts.
//! The types are designed for serialization with [`serde`] so collections can
//! be written by hand as YAML or JSON files.

use serde::{Deserialize, Serialize};

/// Kind of value a task parameter accepts.
///
/// # Examples
///
/// ```
/// use rinvoke_core::ValueKind;
///
/// assert_eq!(ValueKind::default(), ValueKind::String);
/// assert!(ValueKind::Int.takes_value());
/// assert!(!ValueKind::Bool.takes_value());
/// assert_eq!(ValueKind::Int.placeholder(), Some("INT"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free-form string value (the default).
    #[default]
    String,
    /// Signed integer value.
    Int,
    /// Boolean switch (no value).
    Bool,
}

impl ValueKind {
    /// Returns `true` if a flag of this kind consumes a value.
    pub fn takes_value(self) -> bool {
        !matches!(self, ValueKind::Bool)
    }

    /// Placeholder shown in help output for the flag's value.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            ValueKind::String => Some("STRING"),
            ValueKind::Int => Some("INT"),
            ValueKind::Bool => None,
        }
    }
}

/// A single parameter declared by a task.
///
/// Every parameter becomes a long flag derived from its name (underscores
/// turn into dashes) and optionally a short flag.
///
/// # Examples
///
/// ```
/// use rinvoke_core::{Parameter, ValueKind};
///
/// let p = Parameter::string("dry_run").with_help("Only print what would happen");
/// assert_eq!(p.long_name(), "dry-run");
/// assert!(p.takes_value());
///
/// let b = Parameter::boolean("force").with_short('f');
/// assert_eq!(b.kind, ValueKind::Bool);
/// assert_eq!(b.short, Some('f'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as referenced by the task's commands
    pub name: String,
    /// Declared short flag character, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Kind of value accepted
    #[serde(default)]
    pub kind: ValueKind,
    /// Help text shown in per-task help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Value used when the flag is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    /// Creates a parameter of the given kind.
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            kind,
            help: None,
            default: None,
        }
    }

    /// Creates a string-valued parameter.
    pub fn string(name: &str) -> Self {
        Self::new(name, ValueKind::String)
    }

    /// Creates an integer-valued parameter.
    pub fn int(name: &str) -> Self {
        Self::new(name, ValueKind::Int)
    }

    /// Creates a boolean switch parameter.
    pub fn boolean(name: &str) -> Self {
        Self::new(name, ValueKind::Bool)
    }

    /// Declares the short flag.
    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Adds help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Whether the parameter's flag consumes a value.
    pub fn takes_value(&self) -> bool {
        self.kind.takes_value()
    }

    /// Long flag name without the leading dashes.
    pub fn long_name(&self) -> String {
        self.name.replace('_', "-")
    }
}

/// An invocable task.
///
/// # Examples
///
/// ```
/// use rinvoke_core::{Parameter, Task};
///
/// let task = Task::new("deploy")
///     .with_alias("ship")
///     .with_param(Parameter::string("env").with_help("Target environment"))
///     .with_doc("Deploy the current build.")
///     .with_run("./deploy.sh {env}");
///
/// assert!(task.matches("deploy"));
/// assert!(task.matches("ship"));
/// assert!(task.find_parameter("env").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Primary task name
    pub name: String,
    /// Alternate names the task answers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Declared parameters, in declaration order
    #[serde(default, rename = "params", skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Raw docstring (cleaned at render time)
    #[serde(default, rename = "doc", skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Tasks that run before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,
    /// Shell command templates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run: Vec<String>,
}

impl Task {
    /// Creates an empty task with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a parameter.
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Sets the docstring.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.docstring = Some(doc.to_string());
        self
    }

    /// Adds a pre-task.
    pub fn with_pre(mut self, pre: &str) -> Self {
        self.pre.push(pre.to_string());
        self
    }

    /// Adds a command template.
    pub fn with_run(mut self, command: &str) -> Self {
        self.run.push(command.to_string());
        self
    }

    /// Returns `true` if `name` is this task's name or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Finds a parameter by its declared name.
    pub fn find_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A named, ordered registry of tasks.
///
/// Lookups accept either a task's name or any of its aliases. Task order is
/// the order the tasks were declared in, which is also the listing order.
///
/// # Examples
///
/// ```
/// use rinvoke_core::{Collection, Task};
///
/// let collection = Collection::new("tasks")
///     .with_task(Task::new("build").with_alias("b"))
///     .with_task(Task::new("test"));
///
/// assert_eq!(collection.find_task("b").unwrap().name, "build");
/// assert!(collection.find_task("lint").is_none());
/// assert_eq!(collection.invocable_names(), vec!["build", "b", "test"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name (the file stem when loaded from disk)
    #[serde(default)]
    pub name: String,
    /// Task run when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Tasks in declaration order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Sets the default task.
    pub fn with_default(mut self, name: &str) -> Self {
        self.default = Some(name.to_string());
        self
    }

    /// Finds a task by name or alias.
    pub fn find_task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.matches(name))
    }

    /// Returns `true` if `name` resolves to a task.
    pub fn contains(&self, name: &str) -> bool {
        self.find_task(name).is_some()
    }

    /// The default task, if one is declared and exists.
    pub fn default_task(&self) -> Option<&Task> {
        self.default.as_deref().and_then(|d| self.find_task(d))
    }

    /// Every name a task can be invoked by: each task's name followed by its
    /// aliases, in declaration order.
    pub fn invocable_names(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .flat_map(|t| std::iter::once(t.name.as_str()).chain(t.aliases.iter().map(String::as_str)))
            .collect()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the collection holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Where the dispatcher gets its tasks from.
///
/// `AutoDiscover` means a collection is located on disk at run time (and the
/// task-discovery flags are offered); `Fixed` means exactly the given
/// collection is used and the disk is never searched, even if it is empty.
#[derive(Debug, Clone, Default)]
pub enum Namespace {
    /// Locate a collection on disk at run time.
    #[default]
    AutoDiscover,
    /// Use exactly this collection.
    Fixed(Collection),
}

impl Namespace {
    /// Returns `true` for [`Namespace::AutoDiscover`].
    pub fn is_auto_discover(&self) -> bool {
        matches!(self, Namespace::AutoDiscover)
    }

    /// The injected collection, if any.
    pub fn fixed(&self) -> Option<&Collection> {
        match self {
            Namespace::AutoDiscover => None,
            Namespace::Fixed(collection) => Some(collection),
        }
    }
}

impl From<Collection> for Namespace {
    fn from(collection: Collection) -> Self {
        Namespace::Fixed(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_long_name_replaces_underscores() {
        let p = Parameter::string("print_name");
        assert_eq!(p.long_name(), "print-name");
    }

    #[test]
    fn test_task_matches_alias() {
        let task = Task::new("build").with_alias("b");
        assert!(task.matches("build"));
        assert!(task.matches("b"));
        assert!(!task.matches("bu"));
    }

    #[test]
    fn test_default_task_requires_existing_task() {
        let collection = Collection::new("tasks")
            .with_task(Task::new("build"))
            .with_default("missing");
        assert!(collection.default_task().is_none());

        let collection = collection.with_default("build");
        assert_eq!(collection.default_task().unwrap().name, "build");
    }

    #[test]
    fn test_namespace_variants() {
        assert!(Namespace::default().is_auto_discover());
        let fixed: Namespace = Collection::new("blank").into();
        assert!(!fixed.is_auto_discover());
        assert!(fixed.fixed().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_yaml_collection() {
        let yaml = r#"
default: build
tasks:
  - name: build
    aliases: [b]
    doc: Build it.
    params:
      - name: release
        kind: bool
      - name: jobs
        short: j
        kind: int
        default: "4"
    run:
      - cargo build
"#;
        let collection: Collection = serde_yaml::from_str(yaml).unwrap();
        let build = collection.find_task("b").unwrap();
        assert_eq!(build.parameters.len(), 2);
        assert_eq!(build.parameters[0].kind, ValueKind::Bool);
        assert_eq!(build.parameters[1].short, Some('j'));
        assert_eq!(build.parameters[1].default.as_deref(), Some("4"));
        assert_eq!(build.docstring.as_deref(), Some("Build it."));
        assert_eq!(collection.default.as_deref(), Some("build"));
    }

    #[test]
    fn test_deserialize_json_defaults() {
        let json = r#"{"tasks": [{"name": "clean"}]}"#;
        let collection: Collection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.name, "");
        let clean = &collection.tasks[0];
        assert!(clean.parameters.is_empty());
        assert!(clean.docstring.is_none());
        assert!(clean.run.is_empty());
    }
}
