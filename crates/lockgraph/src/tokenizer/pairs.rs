//! Indentation-aware `key: value` tokenizer for the YAML subset used by
//! `pnpm-lock.yaml` and Berry `yarn.lock` files.

use super::lines::LineSplitter;
use std::cmp::Ordering;

/// One `key: value` line together with the keys of its enclosing mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Number of leading spaces on the line.
    pub indent: usize,
    /// The key with surrounding quotes removed.
    pub key: String,
    /// The scalar value, or `None` when the key opens a nested mapping.
    pub value: Option<String>,
    /// Keys of the enclosing mappings, outermost first.
    pub path: Vec<String>,
}

impl Pair {
    /// Nesting depth of the pair (0 for top-level keys).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Iterator of [`Pair`]s over an indented document.
///
/// Nesting advances by one level whenever a line is indented further than the
/// previous one; the previous line's key becomes the new path segment. A
/// dedent closes `(previous − current) / 2` levels. Lines without a colon only
/// take part in that bookkeeping, blank lines are ignored, and block scalars,
/// sequences or flow collections are not understood.
///
/// Every yielded pair owns a copy of its path.
///
/// ```
/// use lockgraph::tokenizer::IndentedPairs;
///
/// let doc = "importers:\n  .:\n    dependencies:\n      left-pad:\n        version: 1.3.0\n";
/// let pair = IndentedPairs::new(doc).last().unwrap();
///
/// assert_eq!(pair.key, "version");
/// assert_eq!(pair.value.as_deref(), Some("1.3.0"));
/// assert_eq!(pair.path, ["importers", ".", "dependencies", "left-pad"]);
/// ```
#[derive(Debug, Clone)]
pub struct IndentedPairs<'a> {
    lines: LineSplitter<'a>,
    path: Vec<String>,
    last_indent: usize,
    last_key: Option<String>,
}

impl<'a> IndentedPairs<'a> {
    /// Creates a tokenizer over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            lines: LineSplitter::new(input),
            path: Vec::new(),
            last_indent: 0,
            last_key: None,
        }
    }

    fn adjust_nesting(&mut self, indent: usize) {
        match indent.cmp(&self.last_indent) {
            Ordering::Greater => {
                self.path.push(self.last_key.clone().unwrap_or_default());
            }
            Ordering::Less => {
                let closed = (self.last_indent - indent) / 2;
                let keep = self.path.len().saturating_sub(closed);
                self.path.truncate(keep);
            }
            Ordering::Equal => {}
        }
        self.last_indent = indent;
    }
}

impl Iterator for IndentedPairs<'_> {
    type Item = Pair;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            let content = line.trim_start_matches(' ');
            if content.trim().is_empty() {
                continue;
            }
            let indent = line.len() - content.len();

            if let Some((key, value)) = split_pair(content) {
                self.adjust_nesting(indent);
                self.last_key = Some(key.clone());
                return Some(Pair {
                    indent,
                    key,
                    value,
                    path: self.path.clone(),
                });
            }

            if !content.contains(':') && indent > 0 {
                self.adjust_nesting(indent);
            }
        }
    }
}

/// Splits `key: value` / `key:` with quoted keys taking precedence over
/// unquoted ones (single quotes first).
fn split_pair(content: &str) -> Option<(String, Option<String>)> {
    quoted_key(content, '\'')
        .or_else(|| quoted_key(content, '"'))
        .or_else(|| unquoted_key(content))
}

fn quoted_key(content: &str, quote: char) -> Option<(String, Option<String>)> {
    let inner = content.strip_prefix(quote)?;
    let close = inner.find(quote)?;
    let after = inner[close + quote.len_utf8()..].strip_prefix(':')?;
    let value = pair_value(after)?;
    Some((inner[..close].to_string(), value))
}

fn unquoted_key(content: &str) -> Option<(String, Option<String>)> {
    let colon = content.find(':')?;
    if colon == 0 {
        return None;
    }
    let value = pair_value(&content[colon + 1..])?;
    Some((content[..colon].to_string(), value))
}

/// What follows the colon: nothing, or whitespace and a scalar. Extra spaces
/// before the scalar are not part of it.
fn pair_value(after_colon: &str) -> Option<Option<String>> {
    if after_colon.is_empty() {
        return Some(None);
    }
    let raw = after_colon.strip_prefix(' ')?.trim_start();
    Some(Some(unquote(raw).to_string()))
}

pub(crate) fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            && !inner.contains(quote)
        {
            return inner;
        }
    }
    raw
}
