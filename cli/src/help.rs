//! Help and listing rendering.
//!
//! All output is laid out in two columns: flag signatures (or task names)
//! on the left, never wrapped, and help text on the right, wrapped to the
//! remaining terminal width with continuation lines aligned under the text
//! column.

use rinvoke_core::{Collection, Task, clean_docstring, docstring_summary};

use crate::grammar::OptionGrammar;

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 80;

const INDENT: usize = 2;
const PADDING: usize = 3;
const MIN_TEXT_WIDTH: usize = 20;

/// Current terminal width, or [`DEFAULT_WIDTH`].
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| usize::from(cols))
        .filter(|cols| *cols > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
///
/// # Examples
///
/// ```
/// use rinvoke_cli::help::wrap;
///
/// assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
/// assert!(wrap("   ", 10).is_empty());
/// ```
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Renders rows of `(label, help)` as indented, aligned columns.
///
/// Every row, including the last, ends with a newline.
pub fn render_columns(rows: &[(String, Option<String>)], width: usize) -> String {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let text_width = width
        .saturating_sub(label_width + INDENT + PADDING + 1)
        .max(MIN_TEXT_WIDTH);
    let continuation = " ".repeat(INDENT + label_width + PADDING);

    let mut out = String::new();
    for (label, help) in rows {
        let lines = help.as_deref().map(|h| wrap(h, text_width)).unwrap_or_default();
        match lines.split_first() {
            Some((first, rest)) => {
                out.push_str(&format!(
                    "{:indent$}{label:<label_width$}{:padding$}{first}\n",
                    "",
                    "",
                    indent = INDENT,
                    padding = PADDING,
                ));
                for line in rest {
                    out.push_str(&continuation);
                    out.push_str(line);
                    out.push('\n');
                }
            }
            None => {
                out.push_str(&format!("{:indent$}{label}\n", "", indent = INDENT));
            }
        }
    }
    out
}

fn flag_rows(grammar: &OptionGrammar) -> Vec<(String, Option<String>)> {
    grammar
        .sorted_flags()
        .into_iter()
        .map(|flag| (flag.signature(), flag.help.clone()))
        .collect()
}

/// Core help: usage line plus every core flag.
pub fn render_core_help(binary: &str, grammar: &OptionGrammar, width: usize) -> String {
    format!(
        "Usage: {binary} [--core-opts] task1 [--task1-opts] ... taskN [--taskN-opts]\n\n\
         Core options:\n{}\n",
        render_columns(&flag_rows(grammar), width)
    )
}

/// Per-task help: usage, dedented docstring and the task's options.
pub fn render_task_help(binary: &str, task: &Task, grammar: &OptionGrammar, width: usize) -> String {
    let options_marker = if grammar.is_empty() { "" } else { " [--options]" };

    let docstring = task
        .docstring
        .as_deref()
        .map(clean_docstring)
        .filter(|doc| !doc.is_empty())
        .map(|doc| indent_block(&doc))
        .unwrap_or_else(|| "  none".to_string());

    let options = if grammar.is_empty() {
        "  none\n".to_string()
    } else {
        render_columns(&flag_rows(grammar), width)
    };

    format!(
        "Usage: {binary} [--core-opts] {name}{options_marker} [other tasks here ...]\n\n\
         Docstring:\n{docstring}\n\n\
         Options:\n{options}\n",
        name = task.name,
    )
}

/// Task listing: one row per task with aliases and docstring summary.
pub fn render_task_list(collection: &Collection, width: usize) -> String {
    if collection.is_empty() {
        return format!("No tasks found in collection '{}'!\n", collection.name);
    }
    let rows: Vec<(String, Option<String>)> = collection
        .tasks
        .iter()
        .map(|task| {
            let label = if task.aliases.is_empty() {
                task.name.clone()
            } else {
                format!("{} ({})", task.name, task.aliases.join(", "))
            };
            (label, task.docstring.as_deref().and_then(docstring_summary))
        })
        .collect();
    format!("Available tasks:\n\n{}\n", render_columns(&rows, width))
}

fn indent_block(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{:indent$}{line}", "", indent = INDENT)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use rinvoke_core::{Namespace, Parameter};

    use super::*;
    use crate::core_args::core_grammar;

    #[test]
    fn test_wrap_breaks_between_words() {
        assert_eq!(
            wrap("Warn, instead of failing, when shell commands fail.", 45),
            vec!["Warn, instead of failing, when shell commands", "fail."]
        );
        assert_eq!(wrap("supercalifragilistic word", 5), vec!["supercalifragilistic", "word"]);
    }

    #[test]
    fn test_columns_align_and_wrap() {
        let rows = vec![
            ("-a, --alpha".to_string(), Some("Short help.".to_string())),
            (
                "-b STRING, --beta=STRING".to_string(),
                Some("A much longer help text that has to wrap onto a second line.".to_string()),
            ),
            ("--gamma".to_string(), None),
        ];
        // label width 24, text width 60 - 24 - 2 - 3 - 1 = 30
        let expected = concat!(
            "  -a, --alpha                Short help.\n",
            "  -b STRING, --beta=STRING   A much longer help text that\n",
            "                             has to wrap onto a second\n",
            "                             line.\n",
            "  --gamma\n",
        );
        assert_eq!(render_columns(&rows, 60), expected);
    }

    #[test]
    fn test_core_help_golden() {
        let expected = "\
Usage: rinv[oke] [--core-opts] task1 [--task1-opts] ... taskN [--taskN-opts]

Core options:
  --complete                       Print tab-completion candidates for given
                                   parse remainder.
  --no-dedupe                      Disable task deduplication.
  -c STRING, --collection=STRING   Specify collection name to load.
  -d, --debug                      Enable debug output.
  -e, --echo                       Echo executed commands before running.
  -f STRING, --config=STRING       Runtime configuration file to use.
  -h [STRING], --help[=STRING]     Show core or per-task help and exit.
  -H STRING, --hide=STRING         Set default output hiding for shell commands
                                   (out, err or both).
  -l, --list                       List available tasks.
  -p, --pty                        Use a pty when executing shell commands.
  -r STRING, --root=STRING         Change root directory used for finding task
                                   collections.
  -V, --version                    Show version and exit.
  -w, --warn-only                  Warn, instead of failing, when shell
                                   commands fail.

";
        let grammar = core_grammar(&Namespace::AutoDiscover);
        assert_eq!(render_core_help("rinv[oke]", &grammar, 80), expected);
    }

    #[test]
    fn test_task_help_with_options() {
        let punch = Task::new("punch")
            .with_param(Parameter::string("who").with_help("Who to punch"))
            .with_param(Parameter::string("why").with_help("Motive"));
        let expected = "\
Usage: invoke [--core-opts] punch [--options] [other tasks here ...]

Docstring:
  none

Options:
  -h STRING, --why=STRING   Motive
  -w STRING, --who=STRING   Who to punch

";
        let grammar = OptionGrammar::for_task(&punch);
        assert_eq!(render_task_help("invoke", &punch, &grammar, 80), expected);
    }

    #[test]
    fn test_task_help_without_options() {
        let biz = Task::new("biz");
        let expected = "\
Usage: invoke [--core-opts] biz [other tasks here ...]

Docstring:
  none

Options:
  none

";
        let grammar = OptionGrammar::for_task(&biz);
        assert_eq!(render_task_help("invoke", &biz, &grammar, 80), expected);
    }

    #[test]
    fn test_task_help_dedents_docstring() {
        let foo2 = Task::new("foo2")
            .with_doc("\n    Foo the bar:\n\n        example code\n\n    Added in 1.0\n    ");
        let expected = "\
Usage: invoke [--core-opts] foo2 [other tasks here ...]

Docstring:
  Foo the bar:

      example code

  Added in 1.0

Options:
  none

";
        let grammar = OptionGrammar::for_task(&foo2);
        assert_eq!(render_task_help("invoke", &foo2, &grammar, 80), expected);
    }

    #[test]
    fn test_task_list() {
        let collection = Collection::new("tasks")
            .with_task(Task::new("build").with_alias("b").with_doc("Build it.\n\n    Details."))
            .with_task(Task::new("clean"));
        let expected = "\
Available tasks:

  build (b)   Build it.
  clean

";
        assert_eq!(render_task_list(&collection, 80), expected);
    }

    #[test]
    fn test_empty_task_list() {
        assert_eq!(
            render_task_list(&Collection::new("blank"), 80),
            "No tasks found in collection 'blank'!\n"
        );
    }
}
