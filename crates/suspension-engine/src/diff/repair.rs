//! UTF-8 boundary repair for byte-level edit scripts.
//!
//! When two different characters share leading bytes (`—` and `…` both start
//! with `E2 80`) or trailing bytes (`é` and `©` both end in `A9`), a byte diff
//! reports the shared bytes as Equal and only the differing bytes as a change.
//! Each Equal run is trimmed back to whole characters here; the trimmed bytes
//! are added to both sides of the neighbouring change, which leaves both
//! reconstructed texts byte-for-byte intact.

use log::debug;

use crate::{Result, SuspensionError};

use super::{EditKind, EditScript, EditSegment, RawSegment};

/// Longest run of continuation bytes a valid character can carry.
const MAX_CONTINUATION: usize = 3;

#[derive(Debug)]
enum Chunk {
    Equal(Vec<u8>),
    Change { deleted: Vec<u8>, inserted: Vec<u8> },
}

pub(super) fn repair(raw: Vec<RawSegment>) -> Result<EditScript> {
    let (chunks, moved) = realign(normalize(raw))?;
    if moved > 0 {
        debug!("Moved {moved} bytes across diff segment boundaries to keep characters whole");
    }
    decode(chunks)
}

/// Merges runs of the same kind into alternating Equal and Change chunks.
fn normalize(raw: Vec<RawSegment>) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    for RawSegment { kind, bytes } in raw {
        if bytes.is_empty() {
            continue;
        }
        match (kind, chunks.last_mut()) {
            (EditKind::Equal, Some(Chunk::Equal(equal))) => equal.extend(bytes),
            (EditKind::Delete, Some(Chunk::Change { deleted, .. })) => deleted.extend(bytes),
            (EditKind::Insert, Some(Chunk::Change { inserted, .. })) => inserted.extend(bytes),
            (EditKind::Equal, _) => chunks.push(Chunk::Equal(bytes)),
            (EditKind::Delete, _) => chunks.push(Chunk::Change {
                deleted: bytes,
                inserted: Vec::new(),
            }),
            (EditKind::Insert, _) => chunks.push(Chunk::Change {
                deleted: Vec::new(),
                inserted: bytes,
            }),
        }
    }
    chunks
}

/// Trims every Equal chunk back to whole characters.
///
/// Leading continuation bytes join the preceding change, an unfinished
/// character at the end joins the following one. Changes left adjacent by an
/// emptied Equal chunk are merged. Returns the chunks and the number of bytes
/// moved.
fn realign(chunks: Vec<Chunk>) -> Result<(Vec<Chunk>, usize)> {
    let mut aligned: Vec<Chunk> = Vec::with_capacity(chunks.len());
    let mut moved = 0;
    let mut dangling = None;
    for (index, chunk) in chunks.into_iter().enumerate() {
        match chunk {
            Chunk::Equal(mut equal) => {
                let leading = equal
                    .iter()
                    .take(MAX_CONTINUATION)
                    .take_while(|byte| is_continuation(**byte))
                    .count();
                if leading > 0 {
                    let Some(Chunk::Change { deleted, inserted }) = aligned.last_mut() else {
                        return Err(unrepairable(index, equal));
                    };
                    deleted.extend_from_slice(&equal[..leading]);
                    inserted.extend_from_slice(&equal[..leading]);
                    equal.drain(..leading);
                    moved += leading;
                }
                let tail = equal.split_off(equal.len() - incomplete_tail(&equal));
                if !equal.is_empty() {
                    aligned.push(Chunk::Equal(equal));
                }
                if !tail.is_empty() {
                    moved += tail.len();
                    dangling = Some((index, tail.clone()));
                    append_change(&mut aligned, tail.clone(), tail);
                }
            }
            Chunk::Change { deleted, inserted } => {
                dangling = None;
                append_change(&mut aligned, deleted, inserted);
            }
        }
    }
    if let Some((index, tail)) = dangling {
        return Err(unrepairable(index, tail));
    }
    Ok((aligned, moved))
}

/// Extends the last chunk if it is a change, otherwise starts a new one.
fn append_change(chunks: &mut Vec<Chunk>, more_deleted: Vec<u8>, more_inserted: Vec<u8>) {
    match chunks.last_mut() {
        Some(Chunk::Change { deleted, inserted }) => {
            deleted.extend(more_deleted);
            inserted.extend(more_inserted);
        }
        _ => chunks.push(Chunk::Change {
            deleted: more_deleted,
            inserted: more_inserted,
        }),
    }
}

fn decode(chunks: Vec<Chunk>) -> Result<EditScript> {
    let mut segments = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let parts = match chunk {
            Chunk::Equal(bytes) => vec![(EditKind::Equal, bytes)],
            Chunk::Change { deleted, inserted } => {
                vec![(EditKind::Delete, deleted), (EditKind::Insert, inserted)]
            }
        };
        for (kind, bytes) in parts {
            if bytes.is_empty() {
                continue;
            }
            let text = String::from_utf8(bytes).map_err(|err| SuspensionError::UnrepairableDiff {
                index: segments.len(),
                kind,
                bytes: err.into_bytes(),
            })?;
            segments.push(EditSegment { kind, text });
        }
    }
    Ok(EditScript::from(segments))
}

fn unrepairable(index: usize, bytes: Vec<u8>) -> SuspensionError {
    SuspensionError::UnrepairableDiff {
        index,
        kind: EditKind::Equal,
        bytes,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Encoded width announced by a leading byte. Invalid leading bytes count as
/// one so they are left for the final decode to reject.
fn width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Number of trailing bytes forming a character cut short by the chunk end.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(MAX_CONTINUATION + 1) {
        let byte = bytes[bytes.len() - back];
        if !is_continuation(byte) {
            return if width(byte) > back { back } else { 0 };
        }
    }
    0
}
