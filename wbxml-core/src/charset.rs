//! Character sets named by IANA MIB enum in the WBXML header.

use std::borrow::Cow;

use encoding_rs::Encoding;
use phf::phf_map;

use crate::error::WriteError;

/// Character set of a document's inline strings and string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    UsAscii,
    /// ISO-8859-1 through ISO-8859-10.
    Iso8859(u8),
    Utf8,
    /// A MIB the codec has no table for.
    Unknown(u32),
}

/// Upper-cased names and synonyms accepted by [`Charset::from_name`].
static BY_NAME: phf::Map<&'static str, Charset> = phf_map! {
    "US-ASCII" => Charset::UsAscii,
    "ASCII" => Charset::UsAscii,
    "ISO-8859-1" => Charset::Iso8859(1),
    "ISO8859-1" => Charset::Iso8859(1),
    "LATIN1" => Charset::Iso8859(1),
    "ISO-8859-2" => Charset::Iso8859(2),
    "ISO-8859-3" => Charset::Iso8859(3),
    "ISO-8859-4" => Charset::Iso8859(4),
    "ISO-8859-5" => Charset::Iso8859(5),
    "ISO-8859-6" => Charset::Iso8859(6),
    "ISO-8859-7" => Charset::Iso8859(7),
    "ISO-8859-8" => Charset::Iso8859(8),
    "ISO-8859-9" => Charset::Iso8859(9),
    "ISO-8859-10" => Charset::Iso8859(10),
    "UTF-8" => Charset::Utf8,
    "UTF8" => Charset::Utf8,
};

impl Charset {
    pub fn from_mib(mib: u32) -> Self {
        match mib {
            3 => Charset::UsAscii,
            4..=13 => Charset::Iso8859((mib - 3) as u8),
            106 => Charset::Utf8,
            other => Charset::Unknown(other),
        }
    }

    /// Look up a charset by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name.to_ascii_uppercase().as_str()).copied()
    }

    pub fn mib(self) -> u32 {
        match self {
            Charset::UsAscii => 3,
            Charset::Iso8859(n) => n as u32 + 3,
            Charset::Utf8 => 106,
            Charset::Unknown(mib) => mib,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859(1) => "ISO-8859-1",
            Charset::Iso8859(2) => "ISO-8859-2",
            Charset::Iso8859(3) => "ISO-8859-3",
            Charset::Iso8859(4) => "ISO-8859-4",
            Charset::Iso8859(5) => "ISO-8859-5",
            Charset::Iso8859(6) => "ISO-8859-6",
            Charset::Iso8859(7) => "ISO-8859-7",
            Charset::Iso8859(8) => "ISO-8859-8",
            Charset::Iso8859(9) => "ISO-8859-9",
            Charset::Iso8859(10) => "ISO-8859-10",
            Charset::Iso8859(_) | Charset::Unknown(_) => "unknown",
            Charset::Utf8 => "UTF-8",
        }
    }

    /// Single-byte table for ISO-8859-2 through ISO-8859-10.
    ///
    /// Looked up by label, so 8859-9 resolves to windows-1254 the way web
    /// decoders treat it.
    fn table(self) -> Option<&'static Encoding> {
        match self {
            Charset::Iso8859(2..=10) => Encoding::for_label(self.name().as_bytes()),
            _ => None,
        }
    }

    /// Decode bytes, replacing anything this charset can't map with U+FFFD.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Cow<'a, str> {
        if let Some(table) = self.table() {
            return table.decode_without_bom_handling(bytes).0;
        }
        match self {
            Charset::Iso8859(1) if !bytes.is_ascii() => {
                Cow::Owned(bytes.iter().map(|&b| b as char).collect())
            }
            Charset::UsAscii if !bytes.is_ascii() => Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                    .collect(),
            ),
            _ => String::from_utf8_lossy(bytes),
        }
    }

    /// Whether the writer can produce this charset.
    pub fn is_encodable(self) -> bool {
        matches!(self, Charset::Utf8 | Charset::UsAscii | Charset::Iso8859(1..=10))
    }

    /// Append the encoding of `s` to `out`.
    pub fn encode_into(self, s: &str, out: &mut Vec<u8>) -> Result<(), WriteError> {
        if let Some(table) = self.table() {
            let (bytes, _, unmappable) = table.encode(s);
            if !unmappable {
                out.extend_from_slice(&bytes);
                return Ok(());
            }
            let mut tmp = [0u8; 4];
            let ch = s
                .chars()
                .find(|ch| table.encode(ch.encode_utf8(&mut tmp)).2)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(WriteError::Unencodable { ch, charset: self.name() });
        }
        match self {
            Charset::Utf8 => out.extend_from_slice(s.as_bytes()),
            Charset::UsAscii | Charset::Iso8859(1) => {
                let limit = if self == Charset::UsAscii { 0x7f } else { 0xff };
                for ch in s.chars() {
                    let code = ch as u32;
                    if code > limit {
                        return Err(WriteError::Unencodable { ch, charset: self.name() });
                    }
                    out.push(code as u8);
                }
            }
            other => return Err(WriteError::UnsupportedCharset(other.name())),
        }
        Ok(())
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
