//! The top-level dispatcher.
//!
//! A [`Program`] turns one invocation into at most one action: print the
//! version, print help, list tasks, print completion candidates, or run the
//! requested tasks. Everything it depends on (where collections come from,
//! how tasks are executed, the identity it reports) is injected through
//! builder methods.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::PathBuf;

use rinvoke_core::{Collection, Namespace};
use rinvoke_loader::{
    CollectionLocator, DEFAULT_COLLECTION_NAME, FsLocator, LoaderError, RuntimeConfig,
};
use tracing::{debug, info, warn};

use crate::argv::{Argv, Invocation, normalize};
use crate::core_args::{self, HelpRequest, ParsedCore};
use crate::error::ProgramError;
use crate::exec::{Hide, RunOptions, ShellExecutor, TaskArgs, TaskExecutor};
use crate::grammar::OptionGrammar;
use crate::help;
use crate::identity::ProgramIdentity;
use crate::logging;
use crate::split::split_task_spans;

/// One scheduled task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCall {
    /// Canonical task name.
    pub name: String,
    /// Arguments given on the command line.
    pub args: TaskArgs,
}

impl TaskCall {
    /// A call without arguments.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: TaskArgs::new(),
        }
    }
}

/// Command-line dispatcher.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::Program;
/// use rinvoke_core::{Collection, Task};
///
/// let program = Program::new()
///     .with_binary("myapp")
///     .with_version("1.2.3")
///     .with_namespace(Collection::new("tasks").with_task(Task::new("build")));
///
/// let mut out = Vec::new();
/// program.run_with_output("myapp --version", &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "Myapp 1.2.3\n");
/// ```
pub struct Program {
    identity: ProgramIdentity,
    namespace: Namespace,
    locator: Box<dyn CollectionLocator>,
    executor: Box<dyn TaskExecutor>,
    width: Option<usize>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// A program that discovers `tasks` collections on disk and runs tasks
    /// through the shell.
    pub fn new() -> Self {
        Self {
            identity: ProgramIdentity::default(),
            namespace: Namespace::AutoDiscover,
            locator: Box::new(FsLocator::new()),
            executor: Box::new(ShellExecutor::new()),
            width: None,
        }
    }

    /// Sets the name shown by `--version`.
    pub fn with_name(mut self, name: &str) -> Self {
        self.identity.name = Some(name.to_string());
        self
    }

    /// Sets the binary shown in usage lines.
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.identity.binary = Some(binary.to_string());
        self
    }

    /// Sets the version shown by `--version`.
    pub fn with_version(mut self, version: &str) -> Self {
        self.identity.version = version.to_string();
        self
    }

    /// Uses a fixed collection (or explicit auto-discovery).
    pub fn with_namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Replaces the collection locator.
    pub fn with_locator(mut self, locator: impl CollectionLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Replaces the task executor.
    pub fn with_executor(mut self, executor: impl TaskExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Fixes the help output width instead of detecting the terminal.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Configured identity.
    pub fn identity(&self) -> &ProgramIdentity {
        &self.identity
    }

    /// Name shown by `--version` for `invocation`.
    pub fn name(&self, invocation: &Invocation) -> String {
        self.identity.display_name(&invocation.program)
    }

    /// Binary shown in usage lines for `invocation`.
    pub fn binary(&self, invocation: &Invocation) -> String {
        self.identity.display_binary(&invocation.program)
    }

    /// Version shown by `--version`.
    pub fn version(&self) -> &str {
        &self.identity.version
    }

    /// Fixed collection, or auto-discovery.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Normalizes `argv` and splits off the program path.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Parse`] when an OS argument is not valid UTF-8.
    pub fn normalize_argv(&self, argv: impl Into<Argv>) -> Result<Invocation, ProgramError> {
        Ok(Invocation::from_tokens(normalize(argv.into())?))
    }

    /// The core grammar for this program's namespace.
    pub fn core_grammar(&self) -> OptionGrammar {
        core_args::core_grammar(&self.namespace)
    }

    /// Runs an invocation, writing output to stdout.
    ///
    /// # Errors
    ///
    /// Returns the [`ProgramError`] that ended the invocation.
    pub fn run(&self, argv: impl Into<Argv>) -> Result<(), ProgramError> {
        self.run_with_output(argv, &mut io::stdout())
    }

    /// Runs an invocation and exits the process on failure, after writing the
    /// error message to stderr.
    pub fn run_or_exit(&self, argv: impl Into<Argv>) {
        if let Err(err) = self.run(argv) {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }

    /// Runs an invocation, writing help, listing and version output to `out`.
    ///
    /// Task commands write to the process's own stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns the [`ProgramError`] that ended the invocation. Nothing is
    /// executed when any task's arguments fail to parse.
    pub fn run_with_output(
        &self,
        argv: impl Into<Argv>,
        out: &mut dyn Write,
    ) -> Result<(), ProgramError> {
        let invocation = self.normalize_argv(argv)?;
        let binary = self.binary(&invocation);
        let grammar = self.core_grammar();

        let core = ParsedCore::parse(&grammar, &invocation.args)
            .map_err(|err| ProgramError::Parse(err.message))?;
        logging::init(core.debug());
        debug!(program = %invocation.program, args = ?invocation.args, "Parsed core flags");

        if core.version() {
            let name = self.name(&invocation);
            writeln!(out, "{name} {}", self.identity.version)?;
            return Ok(());
        }

        let width = self.width.unwrap_or_else(help::terminal_width);
        let help_request = core.help();
        if help_request == Some(HelpRequest::Core) {
            out.write_all(help::render_core_help(&binary, &grammar, width).as_bytes())?;
            return Ok(());
        }

        let collection = self.resolve_collection(&core)?;

        if let Some(HelpRequest::Task(name)) = help_request {
            let task = collection
                .find_task(&name)
                .ok_or(ProgramError::UnknownTask(name))?;
            let task_grammar = OptionGrammar::for_task(task);
            out.write_all(help::render_task_help(&binary, task, &task_grammar, width).as_bytes())?;
            return Ok(());
        }

        if core.list() {
            out.write_all(help::render_task_list(&collection, width).as_bytes())?;
            return Ok(());
        }

        if core.complete() {
            for candidate in completions(&grammar, &collection, core.remainder()) {
                writeln!(out, "{candidate}")?;
            }
            return Ok(());
        }

        let mut calls = Vec::new();
        for span in split_task_spans(core.remainder(), &collection)? {
            let parsed = span
                .grammar
                .parse(&span.args)
                .map_err(|err| ProgramError::TaskParse {
                    task: span.invoked_as.clone(),
                    message: err.message,
                })?;
            calls.push(TaskCall {
                name: span.task.name.clone(),
                args: parsed.values,
            });
        }

        if calls.is_empty() {
            match collection.default_task() {
                Some(task) => {
                    info!(task = %task.name, "Running default task");
                    calls.push(TaskCall::new(&task.name));
                }
                None => {
                    out.write_all(help::render_core_help(&binary, &grammar, width).as_bytes())?;
                    return Ok(());
                }
            }
        }

        let config = load_config(&core)?;
        let mut calls = expand_pre_tasks(&collection, calls)?;
        if config.tasks.dedupe && !core.no_dedupe() {
            calls = dedupe(calls);
        }
        let options = run_options(&core, &config)?;

        for call in &calls {
            let task = collection
                .find_task(&call.name)
                .ok_or_else(|| ProgramError::UnknownTask(call.name.clone()))?;
            debug!(task = %task.name, args = ?call.args, "Executing task");
            self.executor.execute(task, &call.args, &options)?;
        }
        Ok(())
    }

    /// Resolves the collection for this run. Discovery happens at most once.
    fn resolve_collection(&self, core: &ParsedCore) -> Result<Cow<'_, Collection>, ProgramError> {
        match &self.namespace {
            Namespace::Fixed(collection) => Ok(Cow::Borrowed(collection)),
            Namespace::AutoDiscover => {
                let root = match core.root() {
                    Some(root) => PathBuf::from(root),
                    None => std::env::current_dir()
                        .map_err(|err| ProgramError::Collection(LoaderError::IoError(err)))?,
                };
                let name = core.collection().unwrap_or(DEFAULT_COLLECTION_NAME);
                debug!(root = ?root, name, "Locating collection");
                Ok(Cow::Owned(self.locator.locate(&root, name)?))
            }
        }
    }
}

fn load_config(core: &ParsedCore) -> Result<RuntimeConfig, ProgramError> {
    match core.config() {
        Some(path) => {
            debug!(path, "Loading runtime config");
            RuntimeConfig::load(path).map_err(ProgramError::Config)
        }
        None => Ok(RuntimeConfig::default()),
    }
}

/// Layers command-line flags over the runtime config.
fn run_options(core: &ParsedCore, config: &RuntimeConfig) -> Result<RunOptions, ProgramError> {
    let hide = match core.hide().or(config.run.hide.as_deref()) {
        Some(value) => value.parse::<Hide>().map_err(ProgramError::Parse)?,
        None => Hide::None,
    };
    Ok(RunOptions {
        echo: core.echo() || config.run.echo,
        pty: core.pty() || config.run.pty,
        warn_only: core.warn_only() || config.run.warn,
        hide,
        shell: config.run.shell.clone(),
    })
}

/// Inserts each call's pre-tasks, depth-first, ahead of it.
///
/// # Errors
///
/// Returns [`ProgramError::UnknownTask`] for a pre-task that does not exist.
pub fn expand_pre_tasks(
    collection: &Collection,
    calls: Vec<TaskCall>,
) -> Result<Vec<TaskCall>, ProgramError> {
    let mut expanded = Vec::with_capacity(calls.len());
    let mut stack = Vec::new();
    for call in calls {
        push_with_pre(collection, call, &mut stack, &mut expanded)?;
    }
    Ok(expanded)
}

fn push_with_pre(
    collection: &Collection,
    call: TaskCall,
    stack: &mut Vec<String>,
    out: &mut Vec<TaskCall>,
) -> Result<(), ProgramError> {
    if stack.contains(&call.name) {
        warn!(task = %call.name, "Skipping pre-task cycle");
        return Ok(());
    }
    let task = collection
        .find_task(&call.name)
        .ok_or_else(|| ProgramError::UnknownTask(call.name.clone()))?;

    stack.push(call.name.clone());
    for pre in &task.pre {
        let pre_task = collection
            .find_task(pre)
            .ok_or_else(|| ProgramError::UnknownTask(pre.clone()))?;
        push_with_pre(collection, TaskCall::new(&pre_task.name), stack, out)?;
    }
    stack.pop();

    out.push(call);
    Ok(())
}

/// Drops calls identical to an earlier call, keeping first occurrences.
pub fn dedupe(calls: Vec<TaskCall>) -> Vec<TaskCall> {
    let mut kept: Vec<TaskCall> = Vec::with_capacity(calls.len());
    for call in calls {
        if kept.contains(&call) {
            debug!(task = %call.name, "Deduplicated task call");
        } else {
            kept.push(call);
        }
    }
    kept
}

/// Completion candidates for a parse remainder.
///
/// A trailing flag-like token completes to the long flags of the last named
/// task (the core flags when none is named); anything else completes to
/// every task name and alias.
pub fn completions(core: &OptionGrammar, collection: &Collection, remainder: &[String]) -> Vec<String> {
    let wants_flags = remainder.last().is_some_and(|token| token.starts_with('-'));
    if !wants_flags {
        return collection
            .invocable_names()
            .into_iter()
            .map(String::from)
            .collect();
    }

    let grammar = remainder
        .iter()
        .rev()
        .find_map(|token| collection.find_task(token))
        .map(OptionGrammar::for_task)
        .unwrap_or_else(|| core.clone());
    grammar
        .sorted_flags()
        .into_iter()
        .map(|flag| format!("--{}", flag.long))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use rinvoke_core::{Parameter, Task};

    use super::*;
    use crate::exec::ExecError;
    use crate::grammar::FlagValue;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<(String, TaskArgs, RunOptions)>>>,
    }

    impl Recorder {
        fn names(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(n, _, _)| n.clone()).collect()
        }
    }

    impl TaskExecutor for Recorder {
        fn execute(&self, task: &Task, args: &TaskArgs, options: &RunOptions) -> Result<(), ExecError> {
            self.calls
                .borrow_mut()
                .push((task.name.clone(), args.clone(), options.clone()));
            Ok(())
        }
    }

    struct NamedLocator(Collection);

    impl CollectionLocator for NamedLocator {
        fn locate(&self, _root: &Path, name: &str) -> rinvoke_loader::Result<Collection> {
            if name == self.0.name {
                Ok(self.0.clone())
            } else {
                Err(LoaderError::NotFound(name.to_string()))
            }
        }
    }

    fn collection() -> Collection {
        Collection::new("tasks")
            .with_task(Task::new("clean"))
            .with_task(Task::new("build").with_alias("b").with_pre("clean"))
            .with_task(Task::new("test").with_pre("build"))
            .with_task(
                Task::new("print_name")
                    .with_param(Parameter::string("name"))
                    .with_param(Parameter::boolean("loud")),
            )
    }

    fn program(recorder: &Recorder) -> Program {
        Program::new()
            .with_binary("inv")
            .with_namespace(collection())
            .with_executor(recorder.clone())
            .with_width(80)
    }

    fn output(program: &Program, line: &str) -> Result<String, ProgramError> {
        let mut out = Vec::new();
        program.run_with_output(line, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_runs_task_with_arguments() {
        let recorder = Recorder::default();
        output(&program(&recorder), "inv print_name --name inigo -l").unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "print_name");
        assert_eq!(calls[0].1.get("name"), Some(&FlagValue::Text("inigo".into())));
        assert_eq!(calls[0].1.get("loud"), Some(&FlagValue::Switch(true)));
    }

    #[test]
    fn test_pre_tasks_run_first_and_dedupe() {
        let recorder = Recorder::default();
        output(&program(&recorder), "inv test b").unwrap();
        assert_eq!(recorder.names(), vec!["clean", "build", "test"]);
    }

    #[test]
    fn test_no_dedupe_keeps_repeats() {
        let recorder = Recorder::default();
        output(&program(&recorder), "inv --no-dedupe build build").unwrap();
        assert_eq!(recorder.names(), vec!["clean", "build", "clean", "build"]);
    }

    #[test]
    fn test_different_arguments_are_not_duplicates() {
        let recorder = Recorder::default();
        output(
            &program(&recorder),
            "inv print_name --name a print_name --name b print_name --name a",
        )
        .unwrap();
        assert_eq!(recorder.names(), vec!["print_name", "print_name"]);
    }

    #[test]
    fn test_task_parse_error_runs_nothing() {
        let recorder = Recorder::default();
        let err = output(&program(&recorder), "inv clean print_name --bogus").unwrap_err();
        assert!(matches!(err, ProgramError::TaskParse { ref task, .. } if task == "print_name"));
        assert!(recorder.names().is_empty());
    }

    #[test]
    fn test_unknown_task() {
        let recorder = Recorder::default();
        let err = output(&program(&recorder), "inv nope").unwrap_err();
        assert_eq!(err.to_string(), "No idea what 'nope' is!");
    }

    #[test]
    fn test_default_task_runs_when_none_named() {
        let recorder = Recorder::default();
        let program = Program::new()
            .with_namespace(collection().with_default("build"))
            .with_executor(recorder.clone());
        output(&program, "inv").unwrap();
        assert_eq!(recorder.names(), vec!["clean", "build"]);
    }

    #[test]
    fn test_no_task_and_no_default_prints_core_help() {
        let recorder = Recorder::default();
        let out = output(&program(&recorder), "inv").unwrap();
        assert!(out.starts_with("Usage: inv [--core-opts] task1"));
        assert!(recorder.names().is_empty());
    }

    #[test]
    fn test_run_options_from_flags() {
        let recorder = Recorder::default();
        output(&program(&recorder), "inv -e -w -H out clean").unwrap();
        let calls = recorder.calls.borrow();
        let options = &calls[0].2;
        assert!(options.echo);
        assert!(options.warn_only);
        assert!(!options.pty);
        assert_eq!(options.hide, Hide::Out);
    }

    #[test]
    fn test_invalid_hide_value() {
        let recorder = Recorder::default();
        let err = output(&program(&recorder), "inv -H sideways clean").unwrap_err();
        assert!(matches!(err, ProgramError::Parse(_)));
    }

    #[test]
    fn test_version_skips_collection_lookup() {
        let program = Program::new()
            .with_name("MyApp")
            .with_version("1.2.3")
            .with_locator(NamedLocator(Collection::new("other")));
        assert_eq!(output(&program, "myapp --version").unwrap(), "MyApp 1.2.3\n");
    }

    #[test]
    fn test_discovery_uses_collection_flag() {
        let recorder = Recorder::default();
        let program = Program::new()
            .with_locator(NamedLocator(collection().with_task(Task::new("x"))))
            .with_executor(recorder.clone());

        let err = output(&program, "inv -c huhwhat x").unwrap_err();
        assert_eq!(err.to_string(), "Can't find any collection named 'huhwhat'!");

        output(&program, "inv -c tasks x").unwrap();
        assert_eq!(recorder.names(), vec!["x"]);
    }

    #[test]
    fn test_completion_candidates() {
        let recorder = Recorder::default();
        let program = program(&recorder);

        assert_eq!(
            output(&program, "inv --complete").unwrap(),
            "clean\nbuild\nb\ntest\nprint_name\n"
        );
        assert_eq!(
            output(&program, "inv --complete print_name -").unwrap(),
            "--loud\n--name\n"
        );
        assert!(output(&program, "inv --complete -")
            .unwrap()
            .contains("--warn-only\n"));
    }

    #[test]
    fn test_pre_task_cycle_is_cut() {
        let cyclic = Collection::new("tasks")
            .with_task(Task::new("a").with_pre("b"))
            .with_task(Task::new("b").with_pre("a"));
        let calls = expand_pre_tasks(&cyclic, vec![TaskCall::new("a")]).unwrap();
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_unknown_pre_task() {
        let broken = Collection::new("tasks").with_task(Task::new("a").with_pre("ghost"));
        let err = expand_pre_tasks(&broken, vec![TaskCall::new("a")]).unwrap_err();
        assert_eq!(err.to_string(), "No idea what 'ghost' is!");
    }
}
