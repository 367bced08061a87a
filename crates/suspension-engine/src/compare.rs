//! Human-oriented comparison of two texts.

use std::fmt;

use serde::Serialize;

use crate::Result;
use crate::diff::{ByteDiff, DiffAdapter, DiffPrimitive, EditKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Attach line numbers and excerpts.
    pub with_context: bool,
    /// Leave out Equal segments.
    pub changes_only: bool,
    /// Characters of excerpt on either side of a change.
    pub excerpt_window: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            with_context: true,
            changes_only: true,
            excerpt_window: 20,
        }
    }
}

/// One segment of a comparison, located relative to the first text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub kind: EditKind,
    pub text: String,
    /// 1-based line in the first text.
    pub line: Option<usize>,
    /// Surrounding text: from the first text for deletions, from the second
    /// for insertions. Equal segments have none.
    pub excerpt: Option<String>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.text)?;
        if let Some(line) = self.line {
            write!(f, " at line {line}")?;
        }
        if let Some(excerpt) = &self.excerpt {
            write!(f, ": {excerpt:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringComparer<P = ByteDiff> {
    diff: DiffAdapter<P>,
    options: CompareOptions,
}

impl<P: DiffPrimitive> StringComparer<P> {
    pub fn new(diff: DiffAdapter<P>, options: CompareOptions) -> Self {
        Self { diff, options }
    }

    /// Differences between `a` and `b`. Identical texts are not diffed.
    pub fn compare(&self, a: &str, b: &str) -> Result<Vec<Difference>> {
        if a == b {
            return Ok(Vec::new());
        }
        let script = self.diff.call(a, b)?;
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let window = self.options.excerpt_window;

        let mut line = 1;
        let mut pos_a = 0;
        let mut pos_b = 0;
        let mut differences = Vec::new();
        for segment in &script {
            let len = segment.char_len();
            let excerpt = match segment.kind {
                EditKind::Delete => Some(excerpt(&a_chars, pos_a, window)),
                EditKind::Insert => Some(excerpt(&b_chars, pos_b, window)),
                EditKind::Equal => None,
            };
            if segment.kind != EditKind::Insert {
                line += segment.text.matches('\n').count();
                pos_a += len;
            }
            if segment.kind != EditKind::Delete {
                pos_b += len;
            }
            if self.options.changes_only && segment.kind == EditKind::Equal {
                continue;
            }
            let (line, excerpt) = if self.options.with_context {
                (Some(line), excerpt)
            } else {
                (None, None)
            };
            differences.push(Difference {
                kind: segment.kind,
                text: segment.text.clone(),
                line,
                excerpt,
            });
        }
        Ok(differences)
    }
}

fn excerpt(chars: &[char], position: usize, window: usize) -> String {
    let start = position.saturating_sub(window);
    let end = (position + window).min(chars.len());
    chars[start.min(end)..end].iter().collect()
}
