//! Error types for reading, writing and path-driven event parsing.
//!
//! Each component has its own error enum so callers can tell a malformed
//! input (`ParseError`) from a misuse of the writer (`WriteError`).

use thiserror::Error;

/// Errors from decoding a multi-byte unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarIntError {
    /// The input ended while the continuation bit was still set.
    #[error("truncated mb_uint32")]
    Truncated,

    /// The encoded value does not fit in 32 bits.
    #[error("mb_uint32 overflows 32 bits")]
    Overflow,
}

/// Errors raised by the reader. Always fatal to that parse call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The buffer ended in the middle of a token, or before the document
    /// was structurally complete.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid mb_uint32 at byte {offset}: {source}")]
    VarInt {
        offset: usize,
        #[source]
        source: VarIntError,
    },

    #[error("unknown codepage {0}")]
    UnknownCodepage(u8),

    #[error("unexpected {token} token at byte {offset}")]
    UnexpectedToken { token: &'static str, offset: usize },

    #[error("multiple root nodes found")]
    MultipleRoots,

    #[error("no root element found")]
    MissingRoot,

    #[error("document ends with {depth} unclosed element(s)")]
    Unclosed { depth: usize },

    /// String table lookup past the end of the table.
    #[error("invalid offset {0}")]
    InvalidOffset(u32),

    #[error("attribute {0} is repeated")]
    RepeatedAttribute(String),

    #[error("unexpected attribute in PI")]
    RepeatedPiTarget,

    #[error("processing instruction has no target")]
    MissingPiTarget,

    #[error("attribute value at byte {offset} has no attribute")]
    OrphanAttributeValue { offset: usize },
}

/// Writer misuse. These are programmer errors and are never corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("unknown charset {0}")]
    UnknownCharset(String),

    #[error("charset {0} cannot be encoded")]
    UnsupportedCharset(&'static str),

    #[error("character {ch:?} cannot be encoded as {charset}")]
    Unencodable { ch: char, charset: &'static str },

    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("unknown tag 0x{0:04x}")]
    UnknownTag(u16),

    #[error("unknown attribute 0x{0:04x}")]
    UnknownAttribute(u16),

    /// The low byte is a global token or carries the content/attribute
    /// flags.
    #[error("0x{0:04x} is not a tag code")]
    InvalidTag(u16),

    #[error("0x{0:04x} is not an attribute value constant")]
    InvalidAttrValue(u16),

    #[error("invalid extension slot {0}")]
    InvalidExtensionSlot(u8),

    #[error("spurious etag")]
    SpuriousEtag,

    #[error("closed the wrong tag")]
    WrongTag,

    #[error("{0} tag(s) left open")]
    UnclosedTags(usize),

    #[error("document already has a root element")]
    MultipleRoots,

    #[error("content outside the root element")]
    ContentOutsideRoot,

    #[error("can't use attribute value constants outside of attributes")]
    ConstantOutsideAttribute,

    #[error("can't use attribute value constants as attribute names")]
    ConstantAsAttribute,

    #[error("writer not opened in chunked mode")]
    NotChunked,
}

/// A failure reported by an event parser listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raised by `EventParser::run` when the error hook re-raises a listener
/// failure.
#[derive(Debug, Error)]
#[error("listener failed: {0}")]
pub struct EventError(#[source] pub ListenerError);

/// Result alias defaulting to [`ParseError`].
pub type Result<T, E = ParseError> = std::result::Result<T, E>;
