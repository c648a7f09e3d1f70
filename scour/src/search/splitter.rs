use tracing::warn;

use crate::config::SearchConfig;

/// Longest record the line splitter emits in one piece. Anything longer
/// continues as additional records.
pub const MAX_RECORD_BYTES: usize = 4096;

/// One searchable unit of input, with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record content with the delimiter stripped.
    pub text: Vec<u8>,
    /// Offset of the record's first byte, per the active counting mode.
    pub byte_offset: u64,
    /// Whether the record was selected, inversion already applied.
    pub is_match: bool,
}

impl Record {
    fn new(text: Vec<u8>, byte_offset: u64) -> Self {
        Record {
            text,
            byte_offset,
            is_match: false,
        }
    }
}

/// Splits newline-delimited content into records.
///
/// Each record drops its whole trailing run of CR and LF bytes, or only
/// the final LF when `keep_cr` is set. Offsets accumulate the stripped
/// lengths, so delimiter bytes are not counted.
pub fn split_lines(content: &[u8], keep_cr: bool) -> Vec<Record> {
    let mut records = Vec::new();
    let mut offset = 0u64;
    let mut pos = 0;

    while pos < content.len() {
        let window = &content[pos..(pos + MAX_RECORD_BYTES).min(content.len())];
        let (raw_len, terminated) = match window.iter().position(|&b| b == b'\n') {
            Some(nl) => (nl + 1, true),
            None => (window.len(), false),
        };
        if !terminated && raw_len == MAX_RECORD_BYTES {
            warn!(
                "record exceeds {} bytes, continuing it as a new record",
                MAX_RECORD_BYTES
            );
        }

        let mut text = &window[..raw_len];
        if keep_cr {
            if terminated {
                text = &text[..text.len() - 1];
            }
        } else {
            while let Some((&last, rest)) = text.split_last() {
                if last == b'\n' || last == b'\r' {
                    text = rest;
                } else {
                    break;
                }
            }
        }

        records.push(Record::new(text.to_vec(), offset));
        offset += text.len() as u64;
        pos += raw_len;
    }

    records
}

/// Splits NUL-delimited content into records.
///
/// Offsets count the delimiter bytes, unlike the newline splitter. A
/// final fragment without its terminator is kept when non-empty.
pub fn split_null(content: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut offset = 0u64;
    let mut pieces = content.split(|&b| b == 0).peekable();

    while let Some(piece) = pieces.next() {
        if pieces.peek().is_none() && piece.is_empty() {
            break;
        }
        records.push(Record::new(piece.to_vec(), offset));
        offset += piece.len() as u64 + 1;
    }

    records
}

/// Splits content according to the configured delimiter mode.
pub fn split_records(content: &[u8], config: &SearchConfig) -> Vec<Record> {
    if config.null_data {
        split_null(content)
    } else {
        split_lines(content, config.keep_cr)
    }
}
