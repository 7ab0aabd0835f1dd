//! Line diffs of pretty-printed JSON, attached to mismatches.

use once_cell::unsync::OnceCell;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Unified-style line diff between two values. Removed lines are prefixed
/// with `-`, added lines with `+`.
pub fn generate_diff(expected: &Value, actual: &Value) -> String {
    let expected = pretty(expected);
    let actual = pretty(actual);
    let diff = TextDiff::from_lines(&expected, &actual);

    let mut output = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.value().trim_end_matches('\n'));
        output.push('\n');
    }
    output
}

/// Deferred diff computation. The diff is rendered the first time a
/// mismatch needs it and reused afterwards.
pub struct LazyDiff<'a> {
    expected: &'a Value,
    actual: &'a Value,
    rendered: OnceCell<String>,
}

impl<'a> LazyDiff<'a> {
    pub fn new(expected: &'a Value, actual: &'a Value) -> Self {
        Self {
            expected,
            actual,
            rendered: OnceCell::new(),
        }
    }

    pub fn render(&self) -> String {
        self.rendered
            .get_or_init(|| generate_diff(self.expected, self.actual))
            .clone()
    }
}
