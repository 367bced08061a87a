//! Marks and the ordered lists that carry them.
//!
//! A [`Mark`] is a span of markup that was lifted out of a document, together
//! with the character offset in the filtered text where it has to go back in.
//! Marks travel in a [`PositionList`], which comes in two representations:
//!
//! - [`Absolute`]: every position is an offset into the filtered text.
//!   Positions never decrease; marks sharing a position keep their list order.
//! - [`Relative`]: every position is the delta from the previous mark's
//!   absolute position. This form exists for serialization, where a small edit
//!   only touches the records near it.
//!
//! Lists are immutable values. Every transform (conversion, remapping,
//! sorting, filtering) returns a new list and leaves its receiver untouched, so
//! callers can keep the pre-transform list around for comparison.

mod absolute;
pub mod ranges;
mod relative;
pub mod wire;

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A removed piece of markup and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    /// Character offset, absolute or relative depending on the owning list.
    pub position: usize,
    /// Name of the token rule that produced the mark.
    pub name: String,
    /// The exact markup text that was removed.
    pub contents: String,
}

impl Mark {
    pub fn new(position: usize, name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Copy of this mark moved to `position`.
    #[must_use]
    pub fn at(&self, position: usize) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{:?}", self.position, self.name, self.contents)
    }
}

/// Tie-break for a mark that sits exactly where an insertion starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    /// The mark stays in front of the inserted text.
    Left,
    /// The mark moves behind the inserted text.
    #[default]
    Right,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Absolute {}
    impl Sealed for super::Relative {}
}

/// Position space of a [`PositionList`].
pub trait Space: sealed::Sealed + fmt::Debug + Clone + Copy + PartialEq + Eq {
    /// Checks the representation invariant of `marks`.
    fn validate(marks: &[Mark]) -> Result<()>;

    /// Decodes `marks` into absolute positions.
    fn to_absolute(marks: &[Mark]) -> Vec<Mark>;
}

/// Positions are offsets into the filtered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absolute;

/// Positions are deltas from the previous mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relative;

pub type AbsoluteMarks = PositionList<Absolute>;
pub type RelativeMarks = PositionList<Relative>;

/// An ordered, immutable sequence of marks in one position space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionList<S: Space> {
    marks: Vec<Mark>,
    space: PhantomData<S>,
}

impl<S: Space> Default for PositionList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Space> PositionList<S> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Builds a list and checks its representation invariant.
    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Result<Self> {
        Self::from_vec(marks.into_iter().collect()).validate()
    }

    pub(crate) fn from_vec(marks: Vec<Mark>) -> Self {
        Self {
            marks,
            space: PhantomData,
        }
    }

    /// Returns the list unchanged if it satisfies its representation
    /// invariant: ascending positions for [`Absolute`], non-negative deltas for
    /// [`Relative`].
    pub fn validate(self) -> Result<Self> {
        S::validate(&self.marks)?;
        Ok(self)
    }

    /// Absolute form of this list. Already absolute lists are copied.
    pub fn to_absolute(&self) -> AbsoluteMarks {
        PositionList::from_vec(S::to_absolute(&self.marks))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mark> {
        self.marks.iter()
    }

    pub fn as_slice(&self) -> &[Mark] {
        &self.marks
    }

    pub fn into_vec(self) -> Vec<Mark> {
        self.marks
    }
}

impl<'a, S: Space> IntoIterator for &'a PositionList<S> {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}

impl<S: Space> IntoIterator for PositionList<S> {
    type Item = Mark;
    type IntoIter = std::vec::IntoIter<Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.into_iter()
    }
}
