use std::ops::Range;

use crate::diff::{EditKind, EditScript};
use crate::{Result, SuspensionError};

use super::ranges::assert_ordered_ranges;
use super::{Absolute, Affinity, Mark, PositionList, RelativeMarks, Space};

impl Space for Absolute {
    fn validate(marks: &[Mark]) -> Result<()> {
        let mut previous = 0;
        for (index, mark) in marks.iter().enumerate() {
            if mark.position < previous {
                return Err(SuspensionError::MarkOrdering {
                    index,
                    name: mark.name.clone(),
                    position: mark.position,
                    previous,
                });
            }
            previous = mark.position;
        }
        Ok(())
    }

    fn to_absolute(marks: &[Mark]) -> Vec<Mark> {
        marks.to_vec()
    }
}

impl PositionList<Absolute> {
    /// Builds an absolute list from marks in any order, sorting them by
    /// position. Marks with equal positions keep the order they arrive in.
    pub fn from_unsorted(marks: impl IntoIterator<Item = Mark>) -> Self {
        PositionList::from_vec(marks.into_iter().collect()).stable_sort()
    }

    /// Delta-encodes the list.
    ///
    /// Fails with [`SuspensionError::NegativeOffset`] if a position is smaller
    /// than its predecessor's.
    pub fn to_relative(&self) -> Result<RelativeMarks> {
        let mut last = 0;
        let mut relative = Vec::with_capacity(self.len());
        for (index, mark) in self.iter().enumerate() {
            let Some(delta) = mark.position.checked_sub(last) else {
                return Err(SuspensionError::NegativeOffset {
                    index,
                    name: mark.name.clone(),
                    delta: mark.position as i64 - last as i64,
                });
            };
            relative.push(mark.at(delta));
            last = mark.position;
        }
        Ok(PositionList::from_vec(relative))
    }

    /// Remaps every mark through `script`, which must describe the edit from
    /// the text these positions refer to into the new text.
    ///
    /// Deletions are applied first, in source coordinates. Insertions follow in
    /// result coordinates, which only line up once the deletions are gone.
    pub fn adjust_for_diff(&self, script: &EditScript, affinity: Affinity) -> Result<Self> {
        self.adjust_for_deletions(&script.ranges(EditKind::Delete))?
            .adjust_for_insertions(&script.ranges(EditKind::Insert), affinity)
    }

    /// Shifts marks back over the deleted `ranges`.
    ///
    /// `new = position - sum(min(position - d.start, d.len()))` over every
    /// deletion `d` starting before the mark. A deletion wholly before the mark
    /// removes its full length, one straddling the mark pulls it back to the
    /// deletion start, and one after the mark changes nothing.
    pub fn adjust_for_deletions(&self, ranges: &[Range<usize>]) -> Result<Self> {
        assert_ordered_ranges(ranges)?;
        self.assert_ascending()?;

        let mut next = 0;
        let mut removed = 0;
        let marks = self
            .iter()
            .map(|mark| {
                // Ranges are disjoint, so at most one can straddle a mark and
                // every range ending at or before it is removed in full.
                while let Some(range) = ranges.get(next) {
                    if range.end > mark.position {
                        break;
                    }
                    removed += range.len();
                    next += 1;
                }
                let straddling = ranges
                    .get(next)
                    .filter(|range| range.start < mark.position)
                    .map_or(0, |range| mark.position - range.start);
                mark.at(mark.position - removed - straddling)
            })
            .collect();
        Ok(PositionList::from_vec(marks))
    }

    /// Shifts marks forward over the inserted `ranges`, given in result
    /// coordinates.
    ///
    /// Each mark is compared against its already shifted position, so an
    /// earlier insertion can bring a later one into range. `affinity` decides
    /// marks sitting exactly at an insertion start.
    pub fn adjust_for_insertions(
        &self,
        ranges: &[Range<usize>],
        affinity: Affinity,
    ) -> Result<Self> {
        assert_ordered_ranges(ranges)?;
        self.assert_ascending()?;

        let mut next = 0;
        let mut inserted = 0;
        let marks = self
            .iter()
            .map(|mark| {
                while let Some(range) = ranges.get(next) {
                    let reference = mark.position + inserted;
                    let before = match affinity {
                        Affinity::Left => range.start < reference,
                        Affinity::Right => range.start <= reference,
                    };
                    if !before {
                        break;
                    }
                    inserted += range.len();
                    next += 1;
                }
                mark.at(mark.position + inserted)
            })
            .collect();
        Ok(PositionList::from_vec(marks))
    }

    /// Sorts by position. Marks sharing a position keep their current relative
    /// order, so whoever concatenated the list decides the tie-break.
    #[must_use]
    pub fn stable_sort(&self) -> Self {
        let mut marks: Vec<(usize, &Mark)> = self.iter().enumerate().collect();
        marks.sort_by_key(|(index, mark)| (mark.position, *index));
        PositionList::from_vec(marks.into_iter().map(|(_, mark)| mark.clone()).collect())
    }

    /// `self` followed by `other`, unsorted. The result may need
    /// [`stable_sort`](Self::stable_sort) before it validates.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        PositionList::from_vec(self.iter().chain(other.iter()).cloned().collect())
    }

    /// Concatenates `self` and `other` and stable-sorts the result, so at
    /// equal positions marks from `self` come first.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        self.concat(other).stable_sort()
    }

    /// Marks whose name is in `names`, in their current order.
    #[must_use]
    pub fn retain_names(&self, names: &[&str]) -> Self {
        self.filter(|mark| names.contains(&mark.name.as_str()))
    }

    /// Marks whose name is not in `names`, in their current order.
    #[must_use]
    pub fn exclude_names(&self, names: &[&str]) -> Self {
        self.filter(|mark| !names.contains(&mark.name.as_str()))
    }

    fn filter(&self, keep: impl Fn(&Mark) -> bool) -> Self {
        PositionList::from_vec(self.iter().filter(|m| keep(m)).cloned().collect())
    }

    fn assert_ascending(&self) -> Result<()> {
        Absolute::validate(self.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::diff::EditSegment;
    use crate::marks::AbsoluteMarks;
    use crate::marks::test_support::{flat, to_flat};

    fn marks(pairs: &[(usize, &str)]) -> AbsoluteMarks {
        flat::<Absolute>(pairs).validate().unwrap()
    }

    fn positions(list: &AbsoluteMarks) -> Vec<usize> {
        list.iter().map(|m| m.position).collect()
    }

    #[test]
    fn adjusts_for_deletions_and_insertions() {
        let script = EditScript::from(vec![
            EditSegment::delete("a"),
            EditSegment::equal("bb"),
            EditSegment::insert("cc"),
        ]);
        let adjusted = marks(&[(1, "@"), (5, "%")])
            .adjust_for_diff(&script, Affinity::Right)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(
            to_flat(&adjusted),
            vec![(0, "@".to_string()), (6, "%".to_string())]
        );
    }

    #[test]
    fn deletion_clamps_mark_inside_deleted_span() {
        let adjusted = marks(&[(1, "@")]).adjust_for_deletions(&[0..2]).unwrap();
        assert_eq!(positions(&adjusted), vec![0]);
    }

    #[test]
    fn deletions_shift_subsequent_marks() {
        let adjusted = marks(&[(5, "@"), (8, "@")])
            .adjust_for_deletions(&[0..2, 4..5])
            .unwrap();
        assert_eq!(positions(&adjusted), vec![2, 5]);
    }

    #[test]
    fn deletion_after_mark_changes_nothing() {
        let adjusted = marks(&[(2, "@")]).adjust_for_deletions(&[2..4]).unwrap();
        assert_eq!(positions(&adjusted), vec![2]);
    }

    #[test]
    fn deletion_straddling_several_marks() {
        let adjusted = marks(&[(1, "a"), (3, "b"), (6, "c"), (9, "d")])
            .adjust_for_deletions(&[2..7])
            .unwrap();
        assert_eq!(positions(&adjusted), vec![1, 2, 2, 4]);
    }

    #[test]
    fn insertion_before_mark_shifts_it() {
        let adjusted = marks(&[(1, "@")])
            .adjust_for_insertions(&[0..2], Affinity::Right)
            .unwrap();
        assert_eq!(positions(&adjusted), vec![3]);
    }

    #[test]
    fn insertions_shift_subsequent_marks() {
        let adjusted = marks(&[(1, "@"), (3, "@")])
            .adjust_for_insertions(&[0..2, 4..7], Affinity::Right)
            .unwrap();
        assert_eq!(positions(&adjusted), vec![3, 8]);
    }

    #[test]
    fn earlier_insertion_pulls_later_one_into_range() {
        // Result coordinates: the second insertion starts at 3, which is only
        // "before" the mark once the first insertion has moved it to 4.
        let adjusted = marks(&[(2, "@")])
            .adjust_for_insertions(&[0..2, 3..4], Affinity::Left)
            .unwrap();
        assert_eq!(positions(&adjusted), vec![5]);
    }

    #[rstest]
    #[case::left(Affinity::Left, 1)]
    #[case::right(Affinity::Right, 3)]
    fn touching_insertion_respects_affinity(#[case] affinity: Affinity, #[case] expected: usize) {
        let adjusted = marks(&[(1, "@")])
            .adjust_for_insertions(&[1..3], affinity)
            .unwrap();
        assert_eq!(positions(&adjusted), vec![expected]);
    }

    #[rstest]
    #[case::left(Affinity::Left, vec![2, 2, 2])]
    #[case::right(Affinity::Right, vec![5, 5, 5])]
    fn tied_marks_move_together(#[case] affinity: Affinity, #[case] expected: Vec<usize>) {
        let adjusted = marks(&[(2, "a"), (2, "b"), (2, "c")])
            .adjust_for_insertions(&[2..5], affinity)
            .unwrap();
        assert_eq!(positions(&adjusted), expected);
    }

    #[test]
    fn adjustment_leaves_receiver_untouched() {
        let original = marks(&[(4, "@"), (8, "%")]);
        let snapshot = original.clone();
        let _ = original.adjust_for_deletions(&[0..3]).unwrap();
        let _ = original.adjust_for_insertions(&[0..3], Affinity::Right).unwrap();
        assert_eq!(original, snapshot);
    }

    #[test]
    fn rejects_malformed_ranges() {
        let list = AbsoluteMarks::new();
        assert!(matches!(
            list.adjust_for_deletions(&[0..3, 8..12, 11..14]),
            Err(SuspensionError::RangeOrdering { .. })
        ));
        let inverted = Range { start: 4, end: 1 };
        assert!(matches!(
            list.adjust_for_insertions(&[inverted], Affinity::Right),
            Err(SuspensionError::RangeShape { .. })
        ));
    }

    #[test]
    fn converts_to_relative_and_back() {
        let list = marks(&[(0, "a"), (5, "bbb"), (5, "ccc"), (9, "ddd")]);
        let relative = list.to_relative().unwrap();
        assert_eq!(
            relative.iter().map(|m| m.position).collect::<Vec<_>>(),
            vec![0, 5, 0, 4]
        );
        assert_eq!(relative.to_absolute(), list);
    }

    #[test]
    fn to_relative_rejects_descending_positions() {
        let list = flat::<Absolute>(&[(4, "a"), (2, "b")]);
        assert!(matches!(
            list.to_relative(),
            Err(SuspensionError::NegativeOffset {
                index: 1,
                delta: -2,
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_descending_positions() {
        let list = flat::<Absolute>(&[(1, "a"), (2, "a"), (4, "a"), (3, "a")]);
        assert!(matches!(
            list.validate(),
            Err(SuspensionError::MarkOrdering {
                index: 3,
                position: 3,
                previous: 4,
                ..
            })
        ));
    }

    #[test]
    fn stable_sort_orders_by_position() {
        let first = marks(&[(1, "a"), (3, "b"), (5, "c")]);
        let merged = first.merge(&marks(&[(2, "d"), (4, "e"), (6, "f")]));
        assert_eq!(
            to_flat(&merged)
                .into_iter()
                .map(|(p, c)| format!("{p}{c}"))
                .collect::<Vec<_>>(),
            vec!["1a", "2d", "3b", "4e", "5c", "6f"]
        );
    }

    #[test]
    fn stable_sort_keeps_concatenation_order_for_ties() {
        let first = marks(&[(1, "a"), (2, "b"), (3, "c")]);
        let merged = first.merge(&marks(&[(1, "d"), (2, "e"), (3, "f")]));
        assert_eq!(
            to_flat(&merged)
                .into_iter()
                .map(|(p, c)| format!("{p}{c}"))
                .collect::<Vec<_>>(),
            vec!["1a", "1d", "2b", "2e", "3c", "3f"]
        );
    }

    #[test]
    fn from_unsorted_is_stable() {
        let list = AbsoluteMarks::from_unsorted(vec![
            Mark::new(8, "gap_mark", "%"),
            Mark::new(4, "subtitle_mark", "@"),
            Mark::new(8, "subtitle_mark", "@"),
        ]);
        assert_eq!(
            list.iter().map(|m| m.contents.as_str()).collect::<Vec<_>>(),
            vec!["@", "%", "@"]
        );
    }

    #[test]
    fn name_filters_preserve_order() {
        let list = AbsoluteMarks::from_marks(vec![
            Mark::new(1, "a", "@"),
            Mark::new(2, "b", "%"),
            Mark::new(3, "a", "@"),
        ])
        .unwrap();
        assert_eq!(positions(&list.retain_names(&["a"])), vec![1, 3]);
        assert_eq!(positions(&list.exclude_names(&["a"])), vec![2]);
    }
}
