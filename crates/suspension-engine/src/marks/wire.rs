//! Tab-separated wire format for relative mark lists.
//!
//! One record per mark: `delta<TAB>name<TAB>contents<LF>`. Fields containing a
//! tab, CR, LF or double quote are wrapped in double quotes with embedded
//! quotes doubled. Relative deltas keep the serialized form stable under
//! local edits: inserting text only changes the record right after it.

use std::io;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::{Result, SuspensionError};

use super::{Mark, PositionList, Relative, RelativeMarks};

const DELIMITER: u8 = b'\t';

impl PositionList<Relative> {
    /// Writes the list in wire format to `writer`.
    pub fn serialize_to<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(writer);
        for mark in self {
            csv.write_record([
                mark.position.to_string().as_str(),
                mark.name.as_str(),
                mark.contents.as_str(),
            ])?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// The list in wire format.
    pub fn serialize(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.serialize_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| SuspensionError::MalformedRecord {
            line: 0,
            reason: err.to_string(),
        })
    }

    /// Reads a list written by [`serialize`](Self::serialize).
    pub fn deserialize(text: &str) -> Result<RelativeMarks> {
        Self::deserialize_from(text.as_bytes())
    }

    /// Reads a wire-format list from `reader`.
    pub fn deserialize_from<R: io::Read>(reader: R) -> Result<RelativeMarks> {
        let mut csv = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut marks = Vec::new();
        for (index, record) in csv.records().enumerate() {
            marks.push(decode_record(index, &record?)?);
        }
        PositionList::from_marks(marks)
    }
}

fn decode_record(index: usize, record: &StringRecord) -> Result<Mark> {
    let line = record.position().map_or(0, |p| p.line());
    if record.len() != 3 {
        return Err(SuspensionError::MalformedRecord {
            line,
            reason: format!("expected 3 fields, found {}", record.len()),
        });
    }
    let (delta, name, contents) = (&record[0], &record[1], &record[2]);
    let delta: i64 = delta.parse().map_err(|_| SuspensionError::MalformedRecord {
        line,
        reason: format!("position {delta:?} is not an integer"),
    })?;
    let position = usize::try_from(delta).map_err(|_| SuspensionError::NegativeOffset {
        index,
        name: name.to_string(),
        delta,
    })?;
    Ok(Mark::new(position, name, contents))
}
