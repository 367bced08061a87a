use std::hash::Hash;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, capture_diff_slices};

use super::{DiffPrimitive, EditKind, RawSegment};

/// Sequence diff algorithm backing the built-in primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// Diffs the UTF-8 encodings byte by byte.
///
/// Finds the smallest edits, but may split a multi-byte character between
/// segments; the adapter repairs those boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteDiff {
    pub algorithm: DiffAlgorithm,
}

impl ByteDiff {
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl DiffPrimitive for ByteDiff {
    fn diff(&self, from: &str, to: &str) -> Vec<RawSegment> {
        capture(self.algorithm, from.as_bytes(), to.as_bytes(), <[u8]>::to_vec)
    }
}

/// Diffs character by character. Never splits a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharDiff {
    pub algorithm: DiffAlgorithm,
}

impl CharDiff {
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl DiffPrimitive for CharDiff {
    fn diff(&self, from: &str, to: &str) -> Vec<RawSegment> {
        let from: Vec<char> = from.chars().collect();
        let to: Vec<char> = to.chars().collect();
        capture(self.algorithm, &from, &to, |chars| {
            chars.iter().collect::<String>().into_bytes()
        })
    }
}

fn capture<T: Hash + Eq + Ord>(
    algorithm: DiffAlgorithm,
    from: &[T],
    to: &[T],
    encode: impl Fn(&[T]) -> Vec<u8>,
) -> Vec<RawSegment> {
    let mut segments = Vec::new();
    for op in capture_diff_slices(algorithm.into(), from, to) {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => segments.push(RawSegment::new(EditKind::Equal, encode(&from[old]))),
            DiffTag::Delete => segments.push(RawSegment::new(EditKind::Delete, encode(&from[old]))),
            DiffTag::Insert => segments.push(RawSegment::new(EditKind::Insert, encode(&to[new]))),
            DiffTag::Replace => {
                segments.push(RawSegment::new(EditKind::Delete, encode(&from[old])));
                segments.push(RawSegment::new(EditKind::Insert, encode(&to[new])));
            }
        }
    }
    segments
}
