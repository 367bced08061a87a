use std::ops::Range;

use crate::{Result, SuspensionError};

/// Checks that `ranges` is a list of well-formed, ascending, non-overlapping
/// `[start, end)` pairs.
///
/// Flattened, the start and end values must be weakly ascending: a range may
/// start exactly where the previous one ended, and empty ranges are allowed.
pub fn assert_ordered_ranges(ranges: &[Range<usize>]) -> Result<()> {
    let mut previous = 0;
    for (index, range) in ranges.iter().enumerate() {
        if range.start > range.end {
            return Err(SuspensionError::RangeShape {
                index,
                range: range.clone(),
            });
        }
        if range.start < previous {
            return Err(SuspensionError::RangeOrdering {
                index,
                range: range.clone(),
                previous,
            });
        }
        previous = range.end;
    }
    Ok(())
}
