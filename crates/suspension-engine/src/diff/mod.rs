//! Edit scripts and the adapter that derives them from a diff primitive.
//!
//! A diff primitive compares two texts and emits [`RawSegment`]s. Byte
//! oriented primitives may cut a multi-byte character in half when two
//! different characters share leading or trailing bytes. [`DiffAdapter`]
//! normalizes the raw output and moves such stray bytes across segment
//! boundaries, so every [`EditSegment`] it returns is valid UTF-8 and can be
//! measured in characters.

mod primitive;
mod repair;

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use primitive::{ByteDiff, CharDiff, DiffAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Equal,
    Delete,
    Insert,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditKind::Equal => "equal",
            EditKind::Delete => "delete",
            EditKind::Insert => "insert",
        })
    }
}

/// One run of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSegment {
    pub kind: EditKind,
    pub text: String,
}

impl EditSegment {
    pub fn new(kind: EditKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(EditKind::Equal, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(EditKind::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(EditKind::Insert, text)
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Ordered segments describing how to turn a source text into a result text.
///
/// Equal and Delete segments concatenate to the source, Equal and Insert
/// segments to the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    segments: Vec<EditSegment>,
}

impl EditScript {
    pub fn segments(&self) -> &[EditSegment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditSegment> {
        self.segments.iter()
    }

    /// Character ranges covered by segments of `kind`.
    ///
    /// The counter advances over Equal segments and over segments of `kind`;
    /// the other kind does not exist in this coordinate space. Delete ranges
    /// therefore come out in source coordinates and Insert ranges in result
    /// coordinates.
    pub fn ranges(&self, kind: EditKind) -> Vec<Range<usize>> {
        let mut position = 0;
        let mut ranges = Vec::new();
        for segment in &self.segments {
            if segment.kind != kind && segment.kind != EditKind::Equal {
                continue;
            }
            let end = position + segment.char_len();
            if segment.kind == kind {
                ranges.push(position..end);
            }
            position = end;
        }
        ranges
    }

    pub fn deletions(&self) -> Vec<Range<usize>> {
        self.ranges(EditKind::Delete)
    }

    pub fn insertions(&self) -> Vec<Range<usize>> {
        self.ranges(EditKind::Insert)
    }

    /// The source text: Equal and Delete segments in order.
    pub fn from_text(&self) -> String {
        self.collect_text(EditKind::Delete)
    }

    /// The result text: Equal and Insert segments in order.
    pub fn to_text(&self) -> String {
        self.collect_text(EditKind::Insert)
    }

    /// The script turning the result back into the source.
    #[must_use]
    pub fn invert(&self) -> Self {
        self.segments
            .iter()
            .map(|segment| {
                let kind = match segment.kind {
                    EditKind::Equal => EditKind::Equal,
                    EditKind::Delete => EditKind::Insert,
                    EditKind::Insert => EditKind::Delete,
                };
                EditSegment::new(kind, segment.text.clone())
            })
            .collect()
    }

    /// True when the script contains no Delete or Insert segment.
    pub fn is_unchanged(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| segment.kind == EditKind::Equal)
    }

    fn collect_text(&self, kind: EditKind) -> String {
        self.segments
            .iter()
            .filter(|segment| segment.kind == kind || segment.kind == EditKind::Equal)
            .map(|segment| segment.text.as_str())
            .collect()
    }
}

impl From<Vec<EditSegment>> for EditScript {
    fn from(segments: Vec<EditSegment>) -> Self {
        Self { segments }
    }
}

impl FromIterator<EditSegment> for EditScript {
    fn from_iter<I: IntoIterator<Item = EditSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditSegment;
    type IntoIter = std::slice::Iter<'a, EditSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// A segment as emitted by a diff primitive. The bytes need not be valid
/// UTF-8 on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    pub kind: EditKind,
    pub bytes: Vec<u8>,
}

impl RawSegment {
    pub fn new(kind: EditKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }
}

/// Anything that can diff two texts.
///
/// The returned segments must reconstruct both inputs: Equal and Delete bytes
/// concatenate to `from`, Equal and Insert bytes to `to`.
pub trait DiffPrimitive {
    fn diff(&self, from: &str, to: &str) -> Vec<RawSegment>;
}

impl<F> DiffPrimitive for F
where
    F: Fn(&str, &str) -> Vec<RawSegment>,
{
    fn diff(&self, from: &str, to: &str) -> Vec<RawSegment> {
        self(from, to)
    }
}

/// Wraps a [`DiffPrimitive`] and guarantees well-formed, valid UTF-8 output.
#[derive(Debug, Clone, Default)]
pub struct DiffAdapter<P = ByteDiff> {
    primitive: P,
}

impl<P: DiffPrimitive> DiffAdapter<P> {
    pub fn new(primitive: P) -> Self {
        Self { primitive }
    }

    /// Edit script turning `from` into `to`.
    ///
    /// Adjacent segments of the same kind are merged, empty segments are
    /// dropped, and within a change the Delete segment precedes the Insert.
    pub fn call(&self, from: &str, to: &str) -> Result<EditScript> {
        if from == to {
            return Ok(if from.is_empty() {
                EditScript::default()
            } else {
                EditScript::from(vec![EditSegment::equal(from)])
            });
        }
        repair::repair(self.primitive.diff(from, to))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn script() -> EditScript {
        EditScript::from(vec![
            EditSegment::equal("ab"),
            EditSegment::delete("cd"),
            EditSegment::insert("x"),
            EditSegment::equal("é"),
            EditSegment::insert("yz"),
            EditSegment::delete("w"),
        ])
    }

    #[test]
    fn extracts_ranges_in_their_own_coordinates() {
        assert_eq!(script().deletions(), vec![2..4, 5..6]);
        assert_eq!(script().insertions(), vec![2..3, 4..6]);
    }

    #[test]
    fn ranges_count_characters_not_bytes() {
        let script = EditScript::from(vec![
            EditSegment::equal("…—"),
            EditSegment::delete("ü"),
        ]);
        assert_eq!(script.deletions(), vec![2..3]);
    }

    #[test]
    fn reconstructs_both_texts() {
        assert_eq!(script().from_text(), "abcdéw");
        assert_eq!(script().to_text(), "abxéyz");
    }

    #[test]
    fn inverted_script_swaps_the_texts() {
        let inverted = script().invert();
        assert_eq!(inverted.from_text(), script().to_text());
        assert_eq!(inverted.to_text(), script().from_text());
        assert_eq!(inverted.deletions(), script().insertions());
    }

    #[test]
    fn detects_unchanged_scripts() {
        assert!(!script().is_unchanged());
        assert!(EditScript::from(vec![EditSegment::equal("abc")]).is_unchanged());
        assert!(EditScript::default().is_unchanged());
    }

    #[test]
    fn adapter_short_circuits_identical_texts() {
        let adapter = DiffAdapter::new(|_: &str, _: &str| -> Vec<RawSegment> {
            unreachable!("identical texts are not diffed")
        });
        assert_eq!(
            adapter.call("same", "same").unwrap(),
            EditScript::from(vec![EditSegment::equal("same")])
        );
        assert!(adapter.call("", "").unwrap().segments().is_empty());
    }

    #[test]
    fn adapter_accepts_closures_as_primitives() {
        let adapter = DiffAdapter::new(|from: &str, to: &str| {
            vec![
                RawSegment::new(EditKind::Delete, from.as_bytes()),
                RawSegment::new(EditKind::Insert, to.as_bytes()),
            ]
        });
        let script = adapter.call("old", "new").unwrap();
        assert_eq!(
            script.segments(),
            &[EditSegment::delete("old"), EditSegment::insert("new")]
        );
    }

    #[test]
    fn default_adapter_keeps_multibyte_characters_whole() {
        let script = DiffAdapter::<ByteDiff>::default().call("a—b", "a…b").unwrap();
        assert_eq!(
            script.segments(),
            &[
                EditSegment::equal("a"),
                EditSegment::delete("—"),
                EditSegment::insert("…"),
                EditSegment::equal("b"),
            ]
        );
    }
}
