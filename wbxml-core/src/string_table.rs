//! The document string table: NUL-terminated strings addressed by byte
//! offset, including offsets into the middle of a string.

use std::borrow::Cow;

use memchr::memchr_iter;

use crate::charset::Charset;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    /// Offset of the first byte.
    start: u32,
    /// Offset of the terminator (or the table end for an unterminated tail).
    end: u32,
    value: String,
}

/// Decoded string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    raw: Vec<u8>,
    charset: Charset,
    entries: Vec<Entry>,
}

impl StringTable {
    /// Split `data` on NUL bytes and decode each string with `charset`.
    pub fn new(data: &[u8], charset: Charset) -> Self {
        let mut entries = Vec::new();
        let mut start = 0usize;
        for nul in memchr_iter(0, data) {
            entries.push(Entry {
                start: start as u32,
                end: nul as u32,
                value: charset.decode(&data[start..nul]).into_owned(),
            });
            start = nul + 1;
        }
        if start < data.len() {
            entries.push(Entry {
                start: start as u32,
                end: data.len() as u32,
                value: charset.decode(&data[start..]).into_owned(),
            });
        }
        StringTable { raw: data.to_vec(), charset, entries }
    }

    /// An empty table.
    pub fn empty(charset: Charset) -> Self {
        StringTable { raw: Vec::new(), charset, entries: Vec::new() }
    }

    /// The string at `offset`. An offset inside a string yields its tail;
    /// an offset on a terminator yields the empty string.
    pub fn get(&self, offset: u32) -> Result<Cow<'_, str>, ParseError> {
        if offset as usize >= self.raw.len() {
            return Err(ParseError::InvalidOffset(offset));
        }
        // Last entry starting at or before `offset`.
        let idx = self.entries.partition_point(|e| e.start <= offset);
        let entry = idx
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or(ParseError::InvalidOffset(offset))?;
        if entry.start == offset {
            return Ok(Cow::Borrowed(&entry.value));
        }
        Ok(self.charset.decode(&self.raw[offset as usize..entry.end as usize]))
    }

    /// Encoded length in bytes, terminators included.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whole strings in table order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.value.as_str())
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }
}
