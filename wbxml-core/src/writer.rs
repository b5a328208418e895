//! WBXML writer.
//!
//! Builds a document from structured calls. The header is written when the
//! writer is created; [`Writer::finish`] hands back the encoded output.
//!
//! ```
//! use wbxml_core::activesync::airsync;
//! use wbxml_core::writer::{Writer, WriterConfig};
//!
//! let mut w = Writer::new(WriterConfig::default()).unwrap();
//! w.stag(airsync::Sync, &[]).unwrap()
//!     .tag_with_text(airsync::SyncKey, &[], "0").unwrap()
//!     .etag().unwrap();
//! let bytes = w.finish().unwrap().into_vec();
//! assert_eq!(&bytes[..4], &[0x03, 0x01, 0x6a, 0x00]);
//! ```
//!
//! In [`OutputMode::Chunked`], blobs passed to [`Writer::opaque`] are kept
//! as separate chunks instead of being copied into the buffer.

use std::borrow::Cow;

use bytes::Bytes;

use crate::charset::Charset;
use crate::codepage::CodepageIndex;
use crate::error::WriteError;
use crate::node::{token, Extension, ExtensionValue};
use crate::reader::Version;
use crate::varint;

/// Starting size of the output buffer.
const INITIAL_CAPACITY: usize = 1024;

type Result<T> = std::result::Result<T, WriteError>;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One contiguous buffer.
    #[default]
    Buffer,
    /// A list of chunks; opaque blobs are referenced, not copied.
    Chunked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub version: Version,
    /// `1` is "unknown or missing", which is what ActiveSync sends.
    pub public_id: u32,
    /// Charset name, resolved through the MIB table.
    pub charset: String,
    /// String table contents, written in order.
    pub strings: Vec<String>,
    pub mode: OutputMode,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            version: Version::V1_3,
            public_id: 1,
            charset: "UTF-8".to_string(),
            strings: Vec::new(),
            mode: OutputMode::Buffer,
        }
    }
}

impl WriterConfig {
    pub fn chunked() -> Self {
        WriterConfig { mode: OutputMode::Chunked, ..Default::default() }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// A tag or attribute name to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRef {
    /// `(codepage << 8) | local`
    Code(u16),
    /// Offset of the name in the string table.
    Literal(u32),
}

impl From<u16> for TagRef {
    fn from(code: u16) -> Self {
        TagRef::Code(code)
    }
}

/// Text content, or an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<'a> {
    /// Inline string, `STR_I`.
    Str(Cow<'a, str>),
    /// String table offset, `STR_T`.
    TableRef(u32),
    /// Character entity, `ENTITY`.
    Entity(u32),
    Extension(Extension),
    /// Attribute value constant. Only valid inside an attribute value.
    AttrValue(u16),
    /// Pieces written back to back.
    List(Vec<Content<'a>>),
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(s: &'a str) -> Self {
        Content::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Content<'_> {
    fn from(s: String) -> Self {
        Content::Str(Cow::Owned(s))
    }
}

impl From<Extension> for Content<'_> {
    fn from(ext: Extension) -> Self {
        Content::Extension(ext)
    }
}

impl<'a> From<Vec<Content<'a>>> for Content<'a> {
    fn from(list: Vec<Content<'a>>) -> Self {
        Content::List(list)
    }
}

/// An attribute: its start token and optional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: TagRef,
    pub value: Option<Content<'a>>,
}

impl<'a> Attr<'a> {
    pub fn new(name: impl Into<TagRef>, value: impl Into<Content<'a>>) -> Self {
        Attr { name: name.into(), value: Some(value.into()) }
    }

    /// An attribute whose start token carries the whole value.
    pub fn bare(name: impl Into<TagRef>) -> Self {
        Attr { name: name.into(), value: None }
    }
}

/// Payload for [`Writer::opaque`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opaque<'a> {
    Bytes(&'a [u8]),
    /// Encoded with the document charset.
    Str(&'a str),
    /// Large payload kept as its own chunk. Needs [`OutputMode::Chunked`].
    Blob(Bytes),
}

impl<'a> From<&'a [u8]> for Opaque<'a> {
    fn from(b: &'a [u8]) -> Self {
        Opaque::Bytes(b)
    }
}

impl<'a> From<&'a str> for Opaque<'a> {
    fn from(s: &'a str) -> Self {
        Opaque::Str(s)
    }
}

impl From<Bytes> for Opaque<'_> {
    fn from(b: Bytes) -> Self {
        Opaque::Blob(b)
    }
}

/// Finished output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WbxmlOutput {
    Buffer(Vec<u8>),
    /// Concatenate in order to get the document.
    Chunks(Vec<Bytes>),
}

impl WbxmlOutput {
    /// Total encoded length.
    pub fn len(&self) -> usize {
        match self {
            WbxmlOutput::Buffer(b) => b.len(),
            WbxmlOutput::Chunks(chunks) => chunks.iter().map(Bytes::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contiguous copy of the whole document.
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            WbxmlOutput::Buffer(b) => b,
            WbxmlOutput::Chunks(chunks) => chunks.concat(),
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

#[derive(Debug)]
pub struct Writer<'i> {
    buf: Vec<u8>,
    chunks: Option<Vec<Bytes>>,
    charset: Charset,
    codepage: u8,
    tag_stack: Vec<TagRef>,
    root_tag: Option<u16>,
    has_root: bool,
    index: Option<&'i CodepageIndex<'i>>,
}

/// Writer state at the start of a call. A failed call rolls back to it.
#[derive(Debug, Clone, Copy)]
struct Mark {
    len: usize,
    codepage: u8,
    depth: usize,
    root_tag: Option<u16>,
    has_root: bool,
}

impl<'i> Writer<'i> {
    /// Create a writer and emit the header and string table.
    pub fn new(config: WriterConfig) -> Result<Self> {
        let charset = Charset::from_name(&config.charset)
            .ok_or_else(|| WriteError::UnknownCharset(config.charset.clone()))?;
        if !charset.is_encodable() {
            return Err(WriteError::UnsupportedCharset(charset.name()));
        }

        let mut buf = Vec::with_capacity(INITIAL_CAPACITY);
        buf.push(config.version.to_byte());
        varint::write(config.public_id, &mut buf);
        varint::write(charset.mib(), &mut buf);

        let mut table = Vec::new();
        for s in &config.strings {
            charset.encode_into(s, &mut table)?;
            table.push(0x00);
        }
        varint::write(table.len() as u32, &mut buf);
        buf.extend_from_slice(&table);

        let chunks = match config.mode {
            OutputMode::Buffer => None,
            OutputMode::Chunked => Some(Vec::new()),
        };
        Ok(Writer {
            buf,
            chunks,
            charset,
            codepage: 0,
            tag_stack: Vec::new(),
            root_tag: None,
            has_root: false,
            index: None,
        })
    }

    /// Reject tag and attribute codes the schema doesn't define.
    pub fn validate_with(mut self, index: &'i CodepageIndex<'i>) -> Self {
        self.index = Some(index);
        self
    }

    // Every write below either succeeds whole or leaves the writer as it was.

    /// Self-closing tag.
    pub fn tag(&mut self, tag: impl Into<TagRef>, attrs: &[Attr<'_>]) -> Result<&mut Self> {
        let tag = tag.into();
        self.atomic(|w| w.write_tag(tag, false, attrs))
    }

    /// Start tag, content, end tag.
    pub fn tag_with_text<'a>(
        &mut self,
        tag: impl Into<TagRef>,
        attrs: &[Attr<'_>],
        body: impl Into<Content<'a>>,
    ) -> Result<&mut Self> {
        let (tag, body) = (tag.into(), body.into());
        self.atomic(|w| {
            w.open(tag, attrs)?;
            w.write_content(&body, false)?;
            w.close(None)
        })
    }

    /// Start tag; content follows until the matching [`etag`](Self::etag).
    pub fn stag(&mut self, tag: impl Into<TagRef>, attrs: &[Attr<'_>]) -> Result<&mut Self> {
        let tag = tag.into();
        self.atomic(|w| w.open(tag, attrs))
    }

    /// Close the innermost open tag.
    pub fn etag(&mut self) -> Result<&mut Self> {
        self.atomic(|w| w.close(None))
    }

    /// Close the innermost open tag, which must be `expected`.
    pub fn etag_checked(&mut self, expected: impl Into<TagRef>) -> Result<&mut Self> {
        let expected = expected.into();
        self.atomic(|w| w.close(Some(expected)))
    }

    pub fn text<'a>(&mut self, value: impl Into<Content<'a>>) -> Result<&mut Self> {
        let value = value.into();
        self.atomic(|w| {
            w.check_in_root()?;
            w.write_content(&value, false)
        })
    }

    /// Processing instruction: `PI target data END`.
    pub fn pi<'a>(&mut self, target: impl Into<TagRef>, data: Option<Content<'a>>) -> Result<&mut Self> {
        let attr = Attr { name: target.into(), value: data };
        self.atomic(|w| {
            w.buf.push(token::PI);
            w.write_attr(&attr)?;
            w.buf.push(token::END);
            Ok(())
        })
    }

    /// Extension token in content.
    pub fn ext(&mut self, slot: u8, value: ExtensionValue) -> Result<&mut Self> {
        self.text(Extension { slot, value })
    }

    pub fn opaque<'a>(&mut self, data: impl Into<Opaque<'a>>) -> Result<&mut Self> {
        let data = data.into();
        self.atomic(|w| {
            w.check_in_root()?;
            w.write_opaque(data)
        })
    }

    /// Code of the first coded tag written; a request's command.
    pub fn root_tag(&self) -> Option<u16> {
        self.root_tag
    }

    /// Bytes in the buffer. In chunked mode, only those after the last blob.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of `stag` calls not yet closed.
    pub fn depth(&self) -> usize {
        self.tag_stack.len()
    }

    /// Close out the document.
    pub fn finish(self) -> Result<WbxmlOutput> {
        if !self.tag_stack.is_empty() {
            return Err(WriteError::UnclosedTags(self.tag_stack.len()));
        }
        let output = match self.chunks {
            None => WbxmlOutput::Buffer(self.buf),
            Some(mut chunks) => {
                if !self.buf.is_empty() {
                    chunks.push(Bytes::from(self.buf));
                }
                WbxmlOutput::Chunks(chunks)
            }
        };
        log::debug!("finished document: {} bytes", output.len());
        Ok(output)
    }

    fn mark(&self) -> Mark {
        Mark {
            len: self.buf.len(),
            codepage: self.codepage,
            depth: self.tag_stack.len(),
            root_tag: self.root_tag,
            has_root: self.has_root,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.buf.truncate(mark.len);
        self.codepage = mark.codepage;
        self.tag_stack.truncate(mark.depth);
        self.root_tag = mark.root_tag;
        self.has_root = mark.has_root;
    }

    /// Run one write, rolling back on failure. No write pops the tag stack
    /// before its last fallible step, so truncating restores it.
    fn atomic<F>(&mut self, write: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mark = self.mark();
        if let Err(e) = write(self) {
            log::trace!("write failed ({}), rolling back to byte {}", e, mark.len);
            self.reset(mark);
            return Err(e);
        }
        Ok(self)
    }

    fn check_in_root(&self) -> Result<()> {
        if self.tag_stack.is_empty() {
            return Err(WriteError::ContentOutsideRoot);
        }
        Ok(())
    }

    fn open(&mut self, tag: TagRef, attrs: &[Attr<'_>]) -> Result<()> {
        self.write_tag(tag, true, attrs)?;
        log::trace!("stag {:?} at depth {}", tag, self.tag_stack.len());
        self.tag_stack.push(tag);
        Ok(())
    }

    fn close(&mut self, expected: Option<TagRef>) -> Result<()> {
        let open = *self.tag_stack.last().ok_or(WriteError::SpuriousEtag)?;
        if expected.is_some_and(|tag| tag != open) {
            return Err(WriteError::WrongTag);
        }
        self.tag_stack.pop();
        self.buf.push(token::END);
        Ok(())
    }

    fn set_codepage(&mut self, page: u8) {
        if self.codepage != page {
            log::trace!("switch to codepage {}", page);
            self.buf.push(token::SWITCH_PAGE);
            self.buf.push(page);
            self.codepage = page;
        }
    }

    fn write_tag(&mut self, tag: TagRef, has_content: bool, attrs: &[Attr<'_>]) -> Result<()> {
        if self.tag_stack.is_empty() {
            if self.has_root {
                return Err(WriteError::MultipleRoots);
            }
            self.has_root = true;
        }

        let mut flags = 0;
        if has_content {
            flags |= token::HAS_CONTENT;
        }
        if !attrs.is_empty() {
            flags |= token::HAS_ATTRIBUTES;
        }

        match tag {
            TagRef::Literal(offset) => {
                self.buf.push(token::LITERAL | flags);
                varint::write(offset, &mut self.buf);
            }
            TagRef::Code(id) => {
                let local = (id & 0xff) as u8;
                if !(0x05..0x40).contains(&local) {
                    return Err(WriteError::InvalidTag(id));
                }
                if let Some(index) = self.index {
                    if index.tag_name(id).is_none() {
                        return Err(WriteError::UnknownTag(id));
                    }
                }
                self.set_codepage((id >> 8) as u8);
                self.buf.push(local | flags);
                self.root_tag.get_or_insert(id);
            }
        }

        if !attrs.is_empty() {
            for attr in attrs {
                self.write_attr(attr)?;
            }
            self.buf.push(token::END);
        }
        Ok(())
    }

    fn write_attr(&mut self, attr: &Attr<'_>) -> Result<()> {
        match attr.name {
            TagRef::Literal(offset) => {
                self.buf.push(token::LITERAL);
                varint::write(offset, &mut self.buf);
            }
            TagRef::Code(id) => {
                let local = (id & 0xff) as u8;
                if local & token::ATTR_VALUE != 0 {
                    return Err(WriteError::ConstantAsAttribute);
                }
                self.check_attribute(id)?;
                self.set_codepage((id >> 8) as u8);
                self.buf.push(local);
            }
        }
        if let Some(value) = &attr.value {
            self.write_content(value, true)?;
        }
        Ok(())
    }

    fn check_attribute(&self, id: u16) -> Result<()> {
        match self.index {
            Some(index) if index.attribute(id).is_none() => Err(WriteError::UnknownAttribute(id)),
            _ => Ok(()),
        }
    }

    fn write_content(&mut self, value: &Content<'_>, in_attr: bool) -> Result<()> {
        match value {
            Content::Str(s) => {
                self.buf.push(token::STR_I);
                self.charset.encode_into(s, &mut self.buf)?;
                self.buf.push(0x00);
            }
            Content::TableRef(offset) => {
                self.buf.push(token::STR_T);
                varint::write(*offset, &mut self.buf);
            }
            Content::Entity(code) => {
                self.buf.push(token::ENTITY);
                varint::write(*code, &mut self.buf);
            }
            Content::Extension(ext) => {
                if ext.slot > 2 {
                    return Err(WriteError::InvalidExtensionSlot(ext.slot));
                }
                self.buf.push(ext.token());
                match &ext.value {
                    ExtensionValue::String(s) => {
                        self.charset.encode_into(s, &mut self.buf)?;
                        self.buf.push(0x00);
                    }
                    ExtensionValue::Integer(n) => varint::write(*n, &mut self.buf),
                    ExtensionValue::Byte => {}
                }
            }
            Content::AttrValue(id) => {
                if !in_attr {
                    return Err(WriteError::ConstantOutsideAttribute);
                }
                let local = (id & 0xff) as u8;
                if local & token::ATTR_VALUE == 0 {
                    return Err(WriteError::InvalidAttrValue(*id));
                }
                self.check_attribute(*id)?;
                self.set_codepage((id >> 8) as u8);
                self.buf.push(local);
            }
            Content::List(items) => {
                for item in items {
                    self.write_content(item, in_attr)?;
                }
            }
        }
        Ok(())
    }

    fn write_opaque(&mut self, data: Opaque<'_>) -> Result<()> {
        match data {
            Opaque::Bytes(b) => {
                self.buf.push(token::OPAQUE);
                varint::write(b.len() as u32, &mut self.buf);
                self.buf.extend_from_slice(b);
            }
            Opaque::Str(s) => {
                let mut encoded = Vec::with_capacity(s.len());
                self.charset.encode_into(s, &mut encoded)?;
                self.buf.push(token::OPAQUE);
                varint::write(encoded.len() as u32, &mut self.buf);
                self.buf.extend_from_slice(&encoded);
            }
            Opaque::Blob(blob) => {
                // Checked before anything is written: the buffer is handed
                // off below and can't be rolled back past that point.
                let chunks = self.chunks.as_mut().ok_or(WriteError::NotChunked)?;
                self.buf.push(token::OPAQUE);
                varint::write(blob.len() as u32, &mut self.buf);
                let head = std::mem::replace(&mut self.buf, Vec::with_capacity(INITIAL_CAPACITY));
                chunks.push(Bytes::from(head));
                chunks.push(blob);
            }
        }
        Ok(())
    }
}
