//! Decoding of annotation text before it is used
//!
//! Tag values cannot contain `<` or `>`, so authors write `&lt;` and `&gt;`
//! (the trailing `;` is optional). After those are decoded, the host's
//! message escape sequences such as `\V[n]` are resolved.

use crate::VariableTable;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static GT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&gt;?").expect("gt pattern is valid"));
static LT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&lt;?").expect("lt pattern is valid"));
static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\x1bV\[(\d+)\]").expect("variable pattern is valid"));

/// Marker used while resolving escapes, as the host's message window does
const ESC: char = '\x1b';

/// `\V[n]` is expanded this many times, enough for one level of nesting
const VARIABLE_PASSES: usize = 2;

/// Replace `&gt;`/`&gt` with `>` and `&lt;`/`&lt` with `<`, ignoring case
pub fn decode_comparison_escapes(text: &str) -> String {
    let text = GT.replace_all(text, ">");
    LT.replace_all(&text, "<").into_owned()
}

/// The host's text escape service
pub trait TextEscaper {
    /// Resolve engine escape sequences in `text`
    fn convert_escapes(&self, text: &str) -> String;
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscapes;

impl TextEscaper for NoEscapes {
    fn convert_escapes(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Resolves `\V[n]` to the value of variable `n`
///
/// Substitution runs twice, so `\V[\V[1]]` reads the variable whose id is
/// stored in variable 1. Deeper nesting is left partly unresolved. `\\` yields one backslash.
/// Other sequences are left as written.
pub struct VariableEscaper<'a> {
    variables: &'a dyn VariableTable,
}

impl<'a> VariableEscaper<'a> {
    /// Create an escaper reading from `variables`
    pub fn new(variables: &'a dyn VariableTable) -> Self {
        Self { variables }
    }
}

impl TextEscaper for VariableEscaper<'_> {
    fn convert_escapes(&self, text: &str) -> String {
        let mut text = text.replace('\\', &ESC.to_string());
        text = text.replace("\x1b\x1b", "\\");
        for _ in 0..VARIABLE_PASSES {
            let next = match VARIABLE.replace_all(&text, |caps: &Captures| {
                let id = caps[1].parse::<i64>().unwrap_or(0);
                self.variables.value(id).to_string()
            }) {
                Cow::Borrowed(_) => break,
                Cow::Owned(next) => next,
            };
            text = next;
        }
        text.replace(ESC, "\\")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variables;

    #[test]
    fn test_decode_comparison_escapes() {
        assert_eq!(decode_comparison_escapes("a &gt; b"), "a > b");
        assert_eq!(decode_comparison_escapes("a &lt;= b"), "a <= b");
        assert_eq!(decode_comparison_escapes("a &gt b &lt c"), "a > b < c");
        assert_eq!(decode_comparison_escapes("a &GT; b"), "a > b");
        assert_eq!(decode_comparison_escapes("a && b"), "a && b");
    }

    #[test]
    fn test_no_escapes() {
        assert_eq!(NoEscapes.convert_escapes(r"\v[1] > 2"), r"\v[1] > 2");
    }

    #[test]
    fn test_variable_escape() {
        let mut variables = Variables::new();
        variables.set(1, 15);
        let escaper = VariableEscaper::new(&variables);
        assert_eq!(escaper.convert_escapes(r"\v[1] > 10"), "15 > 10");
        assert_eq!(escaper.convert_escapes(r"\V[1] + \V[2]"), "15 + 0");
    }

    #[test]
    fn test_nested_variable_escape() {
        let mut variables = Variables::new();
        variables.set(1, 3);
        variables.set(3, 42);
        let escaper = VariableEscaper::new(&variables);
        assert_eq!(escaper.convert_escapes(r"\v[\v[1]]"), "42");
    }

    #[test]
    fn test_self_referencing_variable_terminates() {
        let mut variables = Variables::new();
        variables.set(1, "\x1bV[1]");
        let escaper = VariableEscaper::new(&variables);
        assert_eq!(escaper.convert_escapes(r"\v[1]"), r"\V[1]");
    }

    #[test]
    fn test_other_sequences_kept() {
        let variables = Variables::new();
        let escaper = VariableEscaper::new(&variables);
        assert_eq!(escaper.convert_escapes(r"\n[1]"), r"\n[1]");
        assert_eq!(escaper.convert_escapes(r"'a\\b'"), r"'a\b'");
    }
}
