//! Document-level merges built from suspend, diff, remap and restore.
//!
//! - [`TextReplayer`] carries one document's marks over onto another
//!   document's (possibly edited) prose.
//! - [`TokenReplacer`] swaps selected mark categories between two documents
//!   whose filtered texts are identical.

mod replace;
mod replay;

pub use replace::TokenReplacer;
pub use replay::TextReplayer;
