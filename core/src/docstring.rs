//! Docstring cleaning.
//!
//! Task docstrings are written in one of two common shapes: a summary on the
//! same line as the opening quote followed by an indented body, or a block
//! that is indented as a whole. [`clean_docstring`] normalizes both to the
//! same text: the summary line loses its leading whitespace and the lines
//! after it lose their common indentation.
//!
//! ```
//! use rinvoke_core::clean_docstring;
//!
//! let summary_first = "Foo the bar:\n\n        example code\n\n    Added in 1.0\n    ";
//! let fully_indented = "\n    Foo the bar:\n\n        example code\n\n    Added in 1.0\n    ";
//!
//! let expected = "Foo the bar:\n\n    example code\n\nAdded in 1.0";
//! assert_eq!(clean_docstring(summary_first), expected);
//! assert_eq!(clean_docstring(fully_indented), expected);
//! ```

/// Dedents a docstring.
///
/// Leading blank lines are skipped and the first line with content is the
/// summary, which only loses its own leading whitespace. The margin is the
/// minimum indentation over the non-blank lines after the summary. Lines
/// that are blank become empty and trailing blank lines are dropped.
/// Applying the function to its own output returns it unchanged.
pub fn clean_docstring(doc: &str) -> String {
    let mut lines = doc.lines().skip_while(|line| line.trim().is_empty());
    let Some(summary) = lines.next() else {
        return String::new();
    };
    let body: Vec<&str> = lines.collect();

    let margin = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indentation(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(body.len() + 1);
    cleaned.push(summary.trim_start());
    for line in &body {
        if line.trim().is_empty() {
            cleaned.push("");
        } else {
            cleaned.push(strip_indent(line, margin));
        }
    }

    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Returns the first line of the cleaned docstring, if any.
pub fn docstring_summary(doc: &str) -> Option<String> {
    clean_docstring(doc)
        .lines()
        .next()
        .filter(|l| !l.is_empty())
        .map(String::from)
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn strip_indent(line: &str, margin: usize) -> &str {
    let offset = line
        .char_indices()
        .take(margin)
        .take_while(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    &line[offset..]
}
