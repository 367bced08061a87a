//! Splitting a document into filtered text and marks, and back.

use log::trace;

use crate::Result;
use crate::marks::{AbsoluteMarks, Mark, PositionList, Space};
use crate::tokens::TokenCatalog;

/// A suspended document: the text left over once marks are lifted out, and
/// the marks themselves in absolute positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suspension {
    pub filtered_text: String,
    pub marks: AbsoluteMarks,
}

impl Suspension {
    /// Splices the marks back into the filtered text.
    pub fn restore(&self) -> Result<String> {
        restore(&self.filtered_text, &self.marks, None)
    }
}

/// Scans `document` with `catalog` and lifts every non-plain-text match out
/// as a mark.
///
/// With `active` given, only the named specs take part. Text no spec matches
/// is copied one character at a time, so the scan is total and always makes
/// progress.
pub fn suspend(document: &str, catalog: &TokenCatalog, active: Option<&[&str]>) -> Suspension {
    let restricted;
    let catalog = match active {
        Some(names) => {
            restricted = catalog.restrict(names);
            &restricted
        }
        None => catalog,
    };

    let mut filtered_text = String::with_capacity(document.len());
    let mut filtered_len = 0;
    let mut marks = Vec::new();
    let mut cursor = 0;
    let mut transparent = false;

    while cursor < document.len() {
        let rest = &document[cursor..];
        let at_line_start = cursor == 0
            || document.as_bytes()[cursor - 1] == b'\n'
            || rest.starts_with('\n')
            || transparent;

        let matched = catalog
            .iter()
            .filter(|spec| at_line_start || !spec.must_be_at_line_start())
            .find_map(|spec| spec.match_len(rest).map(|len| (spec, &rest[..len])));

        match matched {
            Some((spec, text)) if spec.is_plain_text() => {
                filtered_text.push_str(text);
                filtered_len += text.chars().count();
                transparent = false;
                cursor += text.len();
            }
            Some((spec, text)) => {
                trace!("{} at {filtered_len}: {text:?}", spec.name());
                marks.push(Mark::new(filtered_len, spec.name(), text));
                transparent = spec.must_be_at_line_start() && spec.is_transparent_to_line_start();
                cursor += text.len();
            }
            None => {
                let Some(c) = rest.chars().next() else {
                    break;
                };
                filtered_text.push(c);
                filtered_len += 1;
                transparent = false;
                cursor += c.len_utf8();
            }
        }
    }

    Suspension {
        filtered_text,
        marks: PositionList::from_vec(marks),
    }
}

/// The filtered text of `document`, with every mark the catalog finds
/// dropped.
pub fn remove(document: &str, catalog: &TokenCatalog, active: Option<&[&str]>) -> String {
    suspend(document, catalog, active).filtered_text
}

/// Splices `marks` into `filtered_text`.
///
/// With `names` given, only marks with one of those names are restored. The
/// (filtered) list must be in ascending order. A mark positioned past the end
/// of the text is appended at the end.
pub fn restore<S: Space>(
    filtered_text: &str,
    marks: &PositionList<S>,
    names: Option<&[&str]>,
) -> Result<String> {
    let marks = marks.to_absolute();
    let marks = match names {
        Some(names) => marks.retain_names(names),
        None => marks,
    }
    .validate()?;

    let extra: usize = marks.iter().map(|mark| mark.contents.len()).sum();
    let mut output = String::with_capacity(filtered_text.len() + extra);
    let mut boundaries = filtered_text
        .char_indices()
        .map(|(offset, _)| offset)
        .skip(1)
        .chain(std::iter::once(filtered_text.len()));
    let mut char_pos = 0;
    let mut byte_pos = 0;
    let mut copied = 0;

    for mark in &marks {
        while char_pos < mark.position {
            match boundaries.next() {
                Some(offset) => byte_pos = offset,
                None => break,
            }
            char_pos += 1;
        }
        output.push_str(&filtered_text[copied..byte_pos]);
        output.push_str(&mark.contents);
        copied = byte_pos;
    }
    output.push_str(&filtered_text[copied..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::SuspensionError;
    use crate::marks::RelativeMarks;
    use crate::tokens::TokenSpec;

    fn at_marks() -> TokenCatalog {
        TokenCatalog::new(vec![
            TokenSpec::literal("subtitle_mark", "@").unwrap(),
            TokenSpec::literal("gap_mark", "%").unwrap(),
        ])
    }

    fn layout(marks: &AbsoluteMarks) -> Vec<(usize, &str)> {
        marks
            .iter()
            .map(|m| (m.position, m.contents.as_str()))
            .collect()
    }

    #[test]
    fn lifts_marks_out_of_the_text() {
        let suspension = suspend("aabb@ccnn%@", &at_marks(), None);
        assert_eq!(suspension.filtered_text, "aabbccnn");
        assert_eq!(
            layout(&suspension.marks),
            vec![(4, "@"), (8, "%"), (8, "@")]
        );
    }

    #[test]
    fn positions_are_in_characters() {
        let suspension = suspend("—…@é%", &at_marks(), None);
        assert_eq!(suspension.filtered_text, "—…é");
        assert_eq!(layout(&suspension.marks), vec![(2, "@"), (3, "%")]);
        assert_eq!(suspension.restore().unwrap(), "—…@é%");
    }

    #[test]
    fn active_names_restrict_the_catalog() {
        let suspension = suspend("a@b%c", &at_marks(), Some(&["gap_mark"]));
        assert_eq!(suspension.filtered_text, "a@bc");
        assert_eq!(layout(&suspension.marks), vec![(3, "%")]);
    }

    #[test]
    fn empty_document() {
        let suspension = suspend("", &at_marks(), None);
        assert_eq!(suspension, Suspension::default());
    }

    #[test]
    fn empty_catalog_keeps_everything() {
        let suspension = suspend("plain @ text", &TokenCatalog::default(), None);
        assert_eq!(suspension.filtered_text, "plain @ text");
        assert!(suspension.marks.is_empty());
    }

    #[test]
    fn first_matching_spec_wins() {
        let catalog = TokenCatalog::new(vec![
            TokenSpec::new("word", r"[a-z]+").unwrap().plain_text(),
            TokenSpec::new("letter_a", "a").unwrap(),
        ]);
        let suspension = suspend("abc a", &catalog, None);
        assert_eq!(suspension.filtered_text, "abc a");
        assert!(suspension.marks.is_empty());
    }

    fn line_start_catalog(transparent: bool) -> TokenCatalog {
        let record = TokenSpec::new("record", r"\n\^\^\^").unwrap().at_line_start();
        let record = if transparent {
            record.transparent_to_line_start()
        } else {
            record
        };
        TokenCatalog::new(vec![
            record,
            TokenSpec::new("header", "# ").unwrap().at_line_start(),
        ])
    }

    #[rstest]
    #[case::transparent(true, "textx", vec![(4, "\n^^^"), (4, "# ")])]
    #[case::opaque(false, "text# x", vec![(4, "\n^^^")])]
    fn transparency_carries_the_line_start(
        #[case] transparent: bool,
        #[case] filtered: &str,
        #[case] expected: Vec<(usize, &str)>,
    ) {
        let suspension = suspend("text\n^^^# x", &line_start_catalog(transparent), None);
        assert_eq!(suspension.filtered_text, filtered);
        assert_eq!(layout(&suspension.marks), expected);
    }

    #[test]
    fn line_start_specs_wait_for_a_line_start() {
        let suspension = suspend("a# b\n# c", &line_start_catalog(true), None);
        assert_eq!(suspension.filtered_text, "a# b\nc");
        assert_eq!(layout(&suspension.marks), vec![(5, "# ")]);
    }

    #[test]
    fn a_following_newline_counts_as_line_start() {
        let catalog = TokenCatalog::new(vec![
            TokenSpec::new("blank", r"\n\n").unwrap().at_line_start(),
        ]);
        let suspension = suspend("ab\n\ncd", &catalog, None);
        assert_eq!(suspension.filtered_text, "abcd");
        assert_eq!(layout(&suspension.marks), vec![(2, "\n\n")]);
    }

    #[rstest]
    #[case(r"\bfoo", "xfoo", "x")]
    #[case("(?m)^foo", "xfoo", "x")]
    #[case("^foo", "x\nfoo", "x\n")]
    fn pattern_assertions_start_at_the_cursor(
        #[case] pattern: &str,
        #[case] document: &str,
        #[case] filtered: &str,
    ) {
        let catalog = TokenCatalog::new(vec![TokenSpec::new("foo", pattern).unwrap()]);
        let suspension = suspend(document, &catalog, None);
        assert_eq!(suspension.filtered_text, filtered);
        assert_eq!(layout(&suspension.marks), vec![(filtered.chars().count(), "foo")]);
    }

    #[test]
    fn remove_returns_the_filtered_text() {
        assert_eq!(remove("aabb@ccnn%@", &at_marks(), None), "aabbccnn");
    }

    #[test]
    fn restores_marks() {
        let marks = AbsoluteMarks::from_marks(vec![
            Mark::new(4, "subtitle_mark", "@"),
            Mark::new(8, "gap_mark", "%"),
            Mark::new(8, "subtitle_mark", "@"),
        ])
        .unwrap();
        assert_eq!(restore("aabbccnn", &marks, None).unwrap(), "aabb@ccnn%@");
        assert_eq!(
            restore("aabbccnn", &marks, Some(&["gap_mark"])).unwrap(),
            "aabbccnn%"
        );
    }

    #[test]
    fn restores_relative_marks() {
        let marks = RelativeMarks::from_marks(vec![
            Mark::new(4, "subtitle_mark", "@"),
            Mark::new(4, "gap_mark", "%"),
            Mark::new(0, "subtitle_mark", "@"),
        ])
        .unwrap();
        assert_eq!(restore("aabbccnn", &marks, None).unwrap(), "aabb@ccnn%@");
    }

    #[test]
    fn restore_clamps_marks_past_the_end() {
        let marks = AbsoluteMarks::from_marks(vec![Mark::new(10, "gap_mark", "%")]).unwrap();
        assert_eq!(restore("ab", &marks, None).unwrap(), "ab%");
    }

    #[test]
    fn restore_rejects_unsorted_marks() {
        let marks: AbsoluteMarks = PositionList::from_vec(vec![
            Mark::new(5, "gap_mark", "%"),
            Mark::new(2, "gap_mark", "%"),
        ]);
        assert!(matches!(
            restore("abcdef", &marks, None),
            Err(SuspensionError::MarkOrdering { index: 1, .. })
        ));
    }
}
