//! Suspension engine: lift markup out of a document, keep it aside while the
//! plain text is edited, and put it back where it belongs.

pub mod compare;
pub mod diff;
mod error;
pub mod marks;
pub mod merge;
pub mod suspend;
pub mod tokens;

// Re-export key types for easier usage
pub use compare::{CompareOptions, Difference, StringComparer};
pub use diff::{
    ByteDiff, CharDiff, DiffAdapter, DiffAlgorithm, DiffPrimitive, EditKind, EditScript,
    EditSegment, RawSegment,
};
pub use error::{Result, SuspensionError};
pub use marks::{
    Absolute, AbsoluteMarks, Affinity, Mark, PositionList, Relative, RelativeMarks,
    ranges::assert_ordered_ranges,
};
pub use merge::{TextReplayer, TokenReplacer};
pub use suspend::{Suspension, remove, restore, suspend};
pub use tokens::{TokenCatalog, TokenSpec};
