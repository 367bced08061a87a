use crate::Result;

use super::{Mark, Relative, Space};

impl Space for Relative {
    /// Deltas are unsigned once decoded, so a relative list is valid by
    /// construction. Negative deltas are rejected where they can appear: when
    /// encoding a descending absolute list and when reading the wire format.
    fn validate(_marks: &[Mark]) -> Result<()> {
        Ok(())
    }

    fn to_absolute(marks: &[Mark]) -> Vec<Mark> {
        let mut last = 0;
        marks
            .iter()
            .map(|mark| {
                last += mark.position;
                mark.at(last)
            })
            .collect()
    }
}
