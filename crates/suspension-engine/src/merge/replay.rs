use log::debug;

use crate::Result;
use crate::diff::{ByteDiff, DiffAdapter, DiffPrimitive, EditKind};
use crate::marks::Affinity;
use crate::suspend::{Suspension, restore, suspend};
use crate::tokens::TokenCatalog;

/// Replays the marks of a mark authority onto the prose of a text authority.
///
/// Both documents are suspended, the mark authority's filtered text is diffed
/// into the text authority's, and the mark authority's marks are remapped
/// through that edit script. The text authority's own marks are discarded.
#[derive(Debug, Clone)]
pub struct TextReplayer<P = ByteDiff> {
    catalog: TokenCatalog,
    mark_catalog: Option<TokenCatalog>,
    diff: DiffAdapter<P>,
    affinity: Affinity,
}

impl TextReplayer {
    /// Replayer suspending both sides with `catalog`, diffing with the default
    /// byte-level adapter and [`Affinity::Right`].
    pub fn new(catalog: TokenCatalog) -> Self {
        Self {
            catalog,
            mark_catalog: None,
            diff: DiffAdapter::default(),
            affinity: Affinity::default(),
        }
    }
}

impl<P: DiffPrimitive> TextReplayer<P> {
    /// Suspend the mark authority with a different catalog.
    #[must_use]
    pub fn with_mark_catalog(mut self, catalog: TokenCatalog) -> Self {
        self.mark_catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn with_diff<Q: DiffPrimitive>(self, diff: DiffAdapter<Q>) -> TextReplayer<Q> {
        TextReplayer {
            catalog: self.catalog,
            mark_catalog: self.mark_catalog,
            diff,
            affinity: self.affinity,
        }
    }

    /// The text authority's filtered text paired with the mark authority's
    /// marks, remapped to fit it.
    pub fn replay_suspension(
        &self,
        text_authority: &str,
        mark_authority: &str,
    ) -> Result<Suspension> {
        let text = suspend(text_authority, &self.catalog, None);
        let marks = suspend(
            mark_authority,
            self.mark_catalog.as_ref().unwrap_or(&self.catalog),
            None,
        );
        let script = self.diff.call(&marks.filtered_text, &text.filtered_text)?;
        let remapped = marks.marks.adjust_for_diff(&script, self.affinity)?;
        debug!(
            "Replayed {} marks over {} changed segments",
            remapped.len(),
            script
                .iter()
                .filter(|segment| segment.kind != EditKind::Equal)
                .count()
        );
        Ok(Suspension {
            filtered_text: text.filtered_text,
            marks: remapped,
        })
    }

    /// The text authority's prose carrying the mark authority's marks.
    pub fn replay(&self, text_authority: &str, mark_authority: &str) -> Result<String> {
        let replayed = self.replay_suspension(text_authority, mark_authority)?;
        restore(&replayed.filtered_text, &replayed.marks, None)
    }
}
