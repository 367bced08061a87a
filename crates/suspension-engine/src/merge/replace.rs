use log::debug;

use crate::suspend::{Suspension, restore, suspend};
use crate::tokens::TokenCatalog;
use crate::{Result, SuspensionError};

/// Characters of context shown on either side of a text mismatch.
const MISMATCH_CONTEXT: usize = 20;

/// Moves selected mark categories from one document into another.
///
/// Both documents must have identical filtered text; this does not diff. Use
/// [`TextReplayer`](super::TextReplayer) first when the prose has diverged.
#[derive(Debug, Clone)]
pub struct TokenReplacer {
    catalog: TokenCatalog,
    target_catalog: Option<TokenCatalog>,
}

impl TokenReplacer {
    pub fn new(catalog: TokenCatalog) -> Self {
        Self {
            catalog,
            target_catalog: None,
        }
    }

    /// Suspend the target with a different catalog than the source.
    #[must_use]
    pub fn with_target_catalog(mut self, catalog: TokenCatalog) -> Self {
        self.target_catalog = Some(catalog);
        self
    }

    /// The target's filtered text carrying its own marks, except those named
    /// in `names`, which are taken from `source` instead.
    ///
    /// At equal positions the transferred marks come first.
    pub fn replace_suspension(
        &self,
        source: &str,
        target: &str,
        names: &[&str],
    ) -> Result<Suspension> {
        let source = suspend(source, &self.catalog, None);
        let target = suspend(
            target,
            self.target_catalog.as_ref().unwrap_or(&self.catalog),
            None,
        );
        if let Some(offset) = first_difference(&source.filtered_text, &target.filtered_text) {
            return Err(SuspensionError::TextMismatch {
                offset,
                left: excerpt(&source.filtered_text, offset),
                right: excerpt(&target.filtered_text, offset),
            });
        }

        let transferred = source.marks.retain_names(names);
        let retained = target.marks.exclude_names(names);
        debug!(
            "Transferring {} marks ({}), keeping {}",
            transferred.len(),
            names.join(", "),
            retained.len()
        );
        Ok(Suspension {
            filtered_text: target.filtered_text,
            marks: transferred.merge(&retained),
        })
    }

    pub fn replace(&self, source: &str, target: &str, names: &[&str]) -> Result<String> {
        let replaced = self.replace_suspension(source, target, names)?;
        restore(&replaced.filtered_text, &replaced.marks, None)
    }
}

/// Char offset of the first difference, if any.
fn first_difference(left: &str, right: &str) -> Option<usize> {
    if left == right {
        return None;
    }
    let common = left
        .chars()
        .zip(right.chars())
        .take_while(|(l, r)| l == r)
        .count();
    Some(common)
}

fn excerpt(text: &str, offset: usize) -> String {
    text.chars()
        .skip(offset.saturating_sub(MISMATCH_CONTEXT))
        .take(2 * MISMATCH_CONTEXT)
        .collect()
}
