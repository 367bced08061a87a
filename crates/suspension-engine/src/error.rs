use std::ops::Range;

use thiserror::Error;

use crate::diff::EditKind;

/// Result alias used throughout the engine.
pub type Result<T, E = SuspensionError> = std::result::Result<T, E>;

/// Every way a suspension operation can reject its input.
///
/// All variants describe a broken caller contract. None of them are
/// recovered internally; they end the requested operation and carry enough
/// context (index, position, range, name) to find the offending input.
#[derive(Debug, Error)]
pub enum SuspensionError {
    #[error(
        "marks must be in ascending order: mark #{index} ({name}) at {position} follows position {previous}"
    )]
    MarkOrdering {
        index: usize,
        name: String,
        position: usize,
        previous: usize,
    },

    #[error("negative offsets are not permitted: mark #{index} ({name}) has delta {delta}")]
    NegativeOffset {
        index: usize,
        name: String,
        delta: i64,
    },

    #[error("range #{index} is malformed: start {} is after end {}", .range.start, .range.end)]
    RangeShape { index: usize, range: Range<usize> },

    #[error("range #{index} ({}..{}) is not ordered after offset {previous}", .range.start, .range.end)]
    RangeOrdering {
        index: usize,
        range: Range<usize>,
        previous: usize,
    },

    #[error(
        "filtered text does not match at char {offset} ({left:?} vs {right:?}); run replay first"
    )]
    TextMismatch {
        offset: usize,
        left: String,
        right: String,
    },

    #[error("cannot repair invalid UTF-8 in {kind:?} segment #{index}: {bytes:02x?}")]
    UnrepairableDiff {
        index: usize,
        kind: EditKind,
        bytes: Vec<u8>,
    },

    #[error("token {name:?} has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("mark record on line {line} is malformed: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("failed to read or write mark records: {0}")]
    Csv(#[from] csv::Error),
}
