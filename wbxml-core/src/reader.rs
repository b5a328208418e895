//! WBXML reader.
//!
//! Decodes a complete buffer into a [`Document`]: header metadata plus a
//! flat list of [`Node`]s. The body is a single forward scan driven by a
//! three-state machine:
//!
//! - **Body** - tags, text, extensions, PIs and opaque data
//! - **Attributes** - the attribute list of the element just opened
//! - **PiData** - the target and data of a processing instruction
//!
//! The buffer carries no body length; the scan ends when the input runs
//! out. What counts as a complete document at that point is set by
//! [`EndOfInput`].
//!
//! # Example
//!
//! ```
//! use wbxml_core::activesync::{airsync, codepages};
//! use wbxml_core::reader::parse;
//!
//! // <Sync><Status>1</Status></Sync>
//! let data = [0x03, 0x01, 0x6a, 0x00, 0x45, 0x4e, 0x03, b'1', 0x00, 0x01, 0x01];
//! let doc = parse(&data, codepages()).unwrap();
//! assert_eq!(doc.version.to_string(), "1.3");
//! assert_eq!(doc.nodes[0].tag_id(), Some(airsync::Sync));
//! assert_eq!(doc.nodes[2].text(), Some("1"));
//! ```

use std::fmt;
use std::str::FromStr;

use memchr::memchr;

use crate::charset::Charset;
use crate::codepage::CodepageIndex;
use crate::error::{ParseError, Result, VarIntError, WriteError};
use crate::node::{
    token, AttrPart, Attribute, Element, ElementKind, Extension, ExtensionValue, Name, Node,
    ProcessingInstruction,
};
use crate::string_table::StringTable;
use crate::varint;

// ============================================================================
// Options
// ============================================================================

/// What the reader accepts when the buffer runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfInput {
    /// The buffer must end between tokens, outside any attribute list or
    /// PI, with every element closed and a root element present.
    #[default]
    Strict,
    /// Running out of input anywhere ends the document. A node still being
    /// built is dropped.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReaderOptions {
    pub end_of_input: EndOfInput,
}

impl ReaderOptions {
    pub fn lenient() -> Self {
        ReaderOptions { end_of_input: EndOfInput::Lenient }
    }
}

// ============================================================================
// Header
// ============================================================================

/// WBXML version from the first header byte: the high nibble is
/// `major - 1`, the low nibble is `minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const V1_3: Version = Version { major: 1, minor: 3 };

    pub fn from_byte(v: u8) -> Self {
        Version { major: (v >> 4) + 1, minor: v & 0x0f }
    }

    pub fn to_byte(self) -> u8 {
        (self.major.saturating_sub(1) << 4) | (self.minor & 0x0f)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::V1_3
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = WriteError;

    /// Parse `"major.minor"`; major must be 1..=16 and minor 0..=15.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || WriteError::InvalidVersion(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        let major: u8 = major.parse().map_err(|_| invalid())?;
        let minor: u8 = minor.parse().map_err(|_| invalid())?;
        if !(1..=16).contains(&major) || minor > 15 {
            return Err(invalid());
        }
        Ok(Version { major, minor })
    }
}

/// A decoded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub version: Version,
    pub public_id: u32,
    pub charset: Charset,
    pub strings: StringTable,
    pub nodes: Vec<Node>,
}

impl Document {
    /// The root element.
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    /// Tag code of the root element.
    pub fn root_tag(&self) -> Option<u16> {
        self.root().and_then(|e| e.tag.code())
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Byte cursor over the input. `next` signals a clean end of input with
/// `None`; the other reads are mid-token and fail with `UnexpectedEof`.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    #[inline]
    fn next(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn eof(&self) -> ParseError {
        ParseError::UnexpectedEof { offset: self.data.len() }
    }

    #[inline]
    fn byte(&mut self) -> Result<u8> {
        self.next().ok_or_else(|| self.eof())
    }

    fn mb_uint32(&mut self) -> Result<u32> {
        match varint::decode(self.data, self.pos) {
            Ok((value, pos)) => {
                self.pos = pos;
                Ok(value)
            }
            Err(VarIntError::Truncated) => Err(self.eof()),
            Err(source) => Err(ParseError::VarInt { offset: self.pos, source }),
        }
    }

    fn slice(&mut self, len: u32) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.eof())?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// NUL-terminated string, terminator consumed but not returned.
    fn c_string(&mut self) -> Result<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let nul = memchr(0, rest).ok_or_else(|| self.eof())?;
        self.pos += nul + 1;
        Ok(&rest[..nul])
    }
}

// ============================================================================
// Reader
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Body,
    Attributes,
    PiData,
}

/// The node being assembled: pending text, or an element or PI whose
/// attribute list is still open.
#[derive(Debug)]
enum Pending {
    Text(String),
    Element(Element),
    Pi { target: Option<Name>, data: Vec<AttrPart> },
}

/// Decoder bound to one schema.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'c> {
    codepages: &'c CodepageIndex<'c>,
    options: ReaderOptions,
}

impl<'c> Reader<'c> {
    pub fn new(codepages: &'c CodepageIndex<'c>) -> Self {
        Reader { codepages, options: ReaderOptions::default() }
    }

    pub fn with_options(codepages: &'c CodepageIndex<'c>, options: ReaderOptions) -> Self {
        Reader { codepages, options }
    }

    /// Decode a whole buffer.
    pub fn parse(&self, data: &[u8]) -> Result<Document> {
        let mut cur = Cursor::new(data);

        let version = Version::from_byte(cur.byte()?);
        let public_id = cur.mb_uint32()?;
        let charset = Charset::from_mib(cur.mb_uint32()?);
        let table_len = cur.mb_uint32()?;
        let strings = StringTable::new(cur.slice(table_len)?, charset);
        log::debug!(
            "header: version {}, public id {}, charset {}, string table {} bytes",
            version,
            public_id,
            charset,
            strings.len()
        );

        let mut body = Body::new(self.codepages, &strings, charset);
        match body.run(&mut cur) {
            Ok(()) => body.finish(self.options.end_of_input, cur.pos)?,
            Err(ParseError::UnexpectedEof { offset })
                if self.options.end_of_input == EndOfInput::Lenient =>
            {
                log::warn!("input truncated at byte {}, keeping {} nodes", offset, body.nodes.len());
            }
            Err(e) => return Err(e),
        }

        log::debug!("parsed {} nodes", body.nodes.len());
        let nodes = body.nodes;
        Ok(Document { version, public_id, charset, strings, nodes })
    }
}

/// Decode `data` with default options.
pub fn parse(data: &[u8], codepages: &CodepageIndex<'_>) -> Result<Document> {
    Reader::new(codepages).parse(data)
}

/// Body scan state.
struct Body<'r, 'c> {
    codepages: &'r CodepageIndex<'c>,
    strings: &'r StringTable,
    charset: Charset,
    state: State,
    codepage: u8,
    depth: usize,
    found_root: bool,
    pending: Option<Pending>,
    nodes: Vec<Node>,
}

impl<'r, 'c> Body<'r, 'c> {
    fn new(codepages: &'r CodepageIndex<'c>, strings: &'r StringTable, charset: Charset) -> Self {
        Body {
            codepages,
            strings,
            charset,
            state: State::Body,
            codepage: 0,
            depth: 0,
            found_root: false,
            pending: None,
            nodes: Vec::new(),
        }
    }

    fn run(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        while let Some(tok) = cur.next() {
            let offset = cur.pos - 1;
            match tok {
                token::SWITCH_PAGE => {
                    let page = cur.byte()?;
                    if !self.codepages.has_page(page) {
                        return Err(ParseError::UnknownCodepage(page));
                    }
                    log::trace!("switch to codepage {}", page);
                    self.codepage = page;
                }
                token::END => self.end(offset)?,
                token::ENTITY => {
                    self.check_text("ENTITY", offset)?;
                    let code = cur.mb_uint32()?;
                    self.append_str(format!("&#{};", code), offset)?;
                }
                token::STR_I => {
                    self.check_text("STR_I", offset)?;
                    let s = self.charset.decode(cur.c_string()?).into_owned();
                    self.append_str(s, offset)?;
                }
                token::STR_T => {
                    self.check_text("STR_T", offset)?;
                    let s = self.strings.get(cur.mb_uint32()?)?.into_owned();
                    self.append_str(s, offset)?;
                }
                token::PI => {
                    if self.state != State::Body {
                        return Err(ParseError::UnexpectedToken { token: "PI", offset });
                    }
                    self.flush();
                    self.pending = Some(Pending::Pi { target: None, data: Vec::new() });
                    self.state = State::PiData;
                }
                token::OPAQUE => {
                    if self.state != State::Body {
                        return Err(ParseError::UnexpectedToken { token: "OPAQUE", offset });
                    }
                    let len = cur.mb_uint32()?;
                    let data = cur.slice(len)?.to_vec();
                    self.flush();
                    self.nodes.push(Node::Opaque(data));
                }
                t if t & 0xc0 != 0 && t & 0x3f < 3 => {
                    let ext = self.extension(t, cur)?;
                    if self.state == State::Body {
                        self.flush();
                        self.nodes.push(Node::Extension(ext));
                    } else {
                        self.attr_value(offset)?.push(AttrPart::Extension(ext));
                    }
                }
                t if self.state == State::Body => self.open_tag(t, cur)?,
                t => self.attribute(t, cur, offset)?,
            }
        }
        Ok(())
    }

    /// Validate the state at a clean end of input.
    fn finish(&mut self, end: EndOfInput, offset: usize) -> Result<()> {
        if end == EndOfInput::Lenient {
            if self.state == State::Body {
                self.flush();
            } else {
                log::warn!("input ended inside an attribute list, dropping it");
            }
            return Ok(());
        }
        if self.state != State::Body {
            return Err(ParseError::UnexpectedEof { offset });
        }
        if self.depth > 0 {
            return Err(ParseError::Unclosed { depth: self.depth });
        }
        if !self.found_root {
            return Err(ParseError::MissingRoot);
        }
        self.flush();
        Ok(())
    }

    /// Emit pending text or a completed node.
    fn flush(&mut self) {
        match self.pending.take() {
            Some(Pending::Text(s)) => self.nodes.push(Node::Text(s)),
            Some(Pending::Element(e)) => self.nodes.push(Node::Element(e)),
            Some(Pending::Pi { target: Some(target), data }) => {
                self.nodes.push(Node::ProcessingInstruction(ProcessingInstruction { target, data }))
            }
            Some(Pending::Pi { target: None, .. }) | None => {}
        }
    }

    fn end(&mut self, offset: usize) -> Result<()> {
        match self.state {
            State::Body if self.depth > 0 => {
                self.depth -= 1;
                self.flush();
                self.nodes.push(Node::EndTag);
            }
            State::Body => return Err(ParseError::UnexpectedToken { token: "END", offset }),
            State::Attributes => {
                self.state = State::Body;
                self.flush();
            }
            State::PiData => {
                if matches!(self.pending, Some(Pending::Pi { target: None, .. })) {
                    return Err(ParseError::MissingPiTarget);
                }
                self.state = State::Body;
                self.flush();
            }
        }
        Ok(())
    }

    /// Text is content, so it cannot appear in the body outside the root.
    fn check_text(&self, token: &'static str, offset: usize) -> Result<()> {
        if self.state == State::Body && self.depth == 0 {
            return Err(ParseError::UnexpectedToken { token, offset });
        }
        Ok(())
    }

    fn append_str(&mut self, s: String, offset: usize) -> Result<()> {
        if self.state != State::Body {
            self.attr_value(offset)?.push(AttrPart::Str(s));
            return Ok(());
        }
        match &mut self.pending {
            Some(Pending::Text(text)) => text.push_str(&s),
            _ => {
                self.flush();
                self.pending = Some(Pending::Text(s));
            }
        }
        Ok(())
    }

    fn extension(&self, tok: u8, cur: &mut Cursor<'_>) -> Result<Extension> {
        let slot = tok & 0x3f;
        let value = match tok & 0xc0 {
            token::EXT_I_0 => ExtensionValue::String(self.charset.decode(cur.c_string()?).into_owned()),
            token::EXT_T_0 => ExtensionValue::Integer(cur.mb_uint32()?),
            _ => ExtensionValue::Byte,
        };
        Ok(Extension { slot, value })
    }

    fn open_tag(&mut self, tok: u8, cur: &mut Cursor<'_>) -> Result<()> {
        if self.depth == 0 {
            if self.found_root {
                return Err(ParseError::MultipleRoots);
            }
            self.found_root = true;
        }

        let local = tok & 0x3f;
        let tag = if local == token::LITERAL {
            Name::Literal(self.strings.get(cur.mb_uint32()?)?.into_owned())
        } else {
            Name::Code(((self.codepage as u16) << 8) | local as u16)
        };
        log::trace!("open {:?} at depth {}", tag, self.depth);

        let kind = if tok & token::HAS_CONTENT != 0 {
            self.depth += 1;
            ElementKind::Start
        } else {
            ElementKind::Empty
        };

        self.flush();
        self.pending = Some(Pending::Element(Element { kind, tag, attributes: Vec::new() }));
        if tok & token::HAS_ATTRIBUTES != 0 {
            self.state = State::Attributes;
        } else {
            self.flush();
        }
        Ok(())
    }

    /// An attribute-start or attribute-value token.
    fn attribute(&mut self, tok: u8, cur: &mut Cursor<'_>, offset: usize) -> Result<()> {
        if tok & token::ATTR_VALUE != 0 {
            let id = ((self.codepage as u16) << 8) | tok as u16;
            self.attr_value(offset)?.push(AttrPart::Constant(id));
            return Ok(());
        }

        let name = if tok == token::LITERAL {
            Name::Literal(self.strings.get(cur.mb_uint32()?)?.into_owned())
        } else {
            Name::Code(((self.codepage as u16) << 8) | tok as u16)
        };

        match &mut self.pending {
            Some(Pending::Pi { target, .. }) => {
                if target.is_some() {
                    return Err(ParseError::RepeatedPiTarget);
                }
                *target = Some(name);
            }
            Some(Pending::Element(element)) => {
                if element.attribute(&name).is_some() {
                    let shown = self.codepages.qualified_attribute(&name).into_owned();
                    return Err(ParseError::RepeatedAttribute(shown));
                }
                element.attributes.push(Attribute { name, value: Vec::new() });
            }
            Some(Pending::Text(_)) | None => {
                return Err(ParseError::UnexpectedToken { token: "attribute", offset })
            }
        }
        Ok(())
    }

    /// Value parts of the attribute (or PI target) opened last.
    fn attr_value(&mut self, offset: usize) -> Result<&mut Vec<AttrPart>> {
        match &mut self.pending {
            Some(Pending::Element(element)) => match element.attributes.last_mut() {
                Some(attr) => Ok(&mut attr.value),
                None => Err(ParseError::OrphanAttributeValue { offset }),
            },
            Some(Pending::Pi { target: Some(_), data }) => Ok(data),
            _ => Err(ParseError::OrphanAttributeValue { offset }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::{compile, AttrDef, Codepage};
    use pretty_assertions::assert_eq;

    const PAGES: &[Codepage<'static>] = &[
        Codepage {
            name: "Zero",
            tags: &[("Root", 0x0005), ("Item", 0x0006), ("Leaf", 0x0007)],
            attrs: &[
                AttrDef { name: "name", value: 0x0005, data: None },
                AttrDef { name: "url", value: 0x0006, data: Some("http://") },
                AttrDef { name: "org", value: 0x0085, data: Some(".org") },
            ],
        },
        Codepage { name: "One", tags: &[("Other", 0x0105)], attrs: &[] },
    ];

    /// Header for version 1.3, public id 1, UTF-8 and the given string table.
    fn doc(table: &[u8], body: &[u8]) -> Vec<u8> {
        let mut out = vec![0x03, 0x01, 0x6a];
        varint::write(table.len() as u32, &mut out);
        out.extend_from_slice(table);
        out.extend_from_slice(body);
        out
    }

    fn read(data: &[u8]) -> Result<Document> {
        parse(data, &compile(PAGES))
    }

    fn start(tag: u16) -> Node {
        Node::Element(Element::new(ElementKind::Start, tag))
    }

    fn empty(tag: u16) -> Node {
        Node::Element(Element::new(ElementKind::Empty, tag))
    }

    #[test]
    fn test_header() {
        let d = read(&doc(b"ab\0", &[0x05])).unwrap();
        assert_eq!(d.version, Version { major: 1, minor: 3 });
        assert_eq!(d.public_id, 1);
        assert_eq!(d.charset, Charset::Utf8);
        assert_eq!(d.strings.len(), 3);
        assert_eq!(d.nodes, vec![empty(0x0005)]);
    }

    #[test]
    fn test_version_byte() {
        assert_eq!(Version::from_byte(0x13).to_string(), "2.3");
        assert_eq!(Version::from_byte(0x03).to_byte(), 0x03);
        assert_eq!("1.3".parse::<Version>().unwrap(), Version::V1_3);
        assert!("0.1".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
    }

    #[test]
    fn test_nested_text() {
        let body = [0x45, 0x47, 0x03, b'h', b'i', 0x00, 0x01, 0x01];
        let d = read(&doc(b"", &body)).unwrap();
        assert_eq!(
            d.nodes,
            vec![start(0x0005), start(0x0007), Node::Text("hi".into()), Node::EndTag, Node::EndTag]
        );
    }

    #[test]
    fn test_adjacent_text_merges() {
        // STR_I "a", STR_T 0 ("bc"), ENTITY 65
        let body = [0x45, 0x03, b'a', 0x00, 0x83, 0x00, 0x02, 0x41, 0x01];
        let d = read(&doc(b"bc\0", &body)).unwrap();
        assert_eq!(d.nodes[1], Node::Text("abc&#65;".into()));
        assert_eq!(d.nodes.len(), 3);
    }

    #[test]
    fn test_codepage_switch() {
        let body = [0x45, 0x00, 0x01, 0x05, 0x01];
        let d = read(&doc(b"", &body)).unwrap();
        assert_eq!(d.nodes[1].tag_id(), Some(0x0105));
        assert_eq!(d.nodes[1].tag_id().map(|t| t >> 8), Some(1));
    }

    #[test]
    fn test_unknown_codepage() {
        let body = [0x00, 0x09, 0x05];
        assert_eq!(read(&doc(b"", &body)), Err(ParseError::UnknownCodepage(9)));
    }

    #[test]
    fn test_multiple_roots() {
        let body = [0x45, 0x01, 0x45, 0x01];
        let err = read(&doc(b"", &body)).unwrap_err();
        assert_eq!(err, ParseError::MultipleRoots);
        assert_eq!(err.to_string(), "multiple root nodes found");
    }

    #[test]
    fn test_text_outside_root() {
        let body = [0x03, b'x', 0x00];
        assert!(matches!(
            read(&doc(b"", &body)),
            Err(ParseError::UnexpectedToken { token: "STR_I", .. })
        ));
    }

    #[test]
    fn test_spurious_end() {
        let body = [0x05, 0x01];
        assert!(matches!(
            read(&doc(b"", &body)),
            Err(ParseError::UnexpectedToken { token: "END", .. })
        ));
    }

    #[test]
    fn test_literal_tag() {
        // LITERAL | content, offset 0
        let body = [0x44, 0x00, 0x01];
        let d = read(&doc(b"x:y\0", &body)).unwrap();
        let root = d.root().unwrap();
        assert_eq!(root.tag, Name::Literal("x:y".into()));
    }

    #[test]
    fn test_attributes() {
        // <Root name="v" url="http://" + "example" + ".org"/>
        let body = [0x85, 0x05, 0x03, b'v', 0x00, 0x06, 0x03, b'e', b'x', 0x00, 0x85, 0x01];
        let d = read(&doc(b"", &body)).unwrap();
        let root = d.root().unwrap();
        assert_eq!(root.kind, ElementKind::Empty);
        assert_eq!(root.attributes.len(), 2);
        assert_eq!(root.attributes[0].value, vec![AttrPart::Str("v".into())]);
        assert_eq!(
            root.attributes[1].value,
            vec![AttrPart::Str("ex".into()), AttrPart::Constant(0x0085)]
        );
        let index = compile(PAGES);
        assert_eq!(index.value_string(&root.attributes[1].name, &root.attributes[1].value), "http://ex.org");
    }

    #[test]
    fn test_repeated_attribute() {
        let body = [0x85, 0x05, 0x05, 0x01];
        assert_eq!(
            read(&doc(b"", &body)),
            Err(ParseError::RepeatedAttribute("Zero:name".into()))
        );
    }

    #[test]
    fn test_attribute_value_without_attribute() {
        let body = [0x85, 0x85, 0x01];
        assert!(matches!(read(&doc(b"", &body)), Err(ParseError::OrphanAttributeValue { .. })));
    }

    #[test]
    fn test_extensions() {
        // EXT_I_1 "s", EXT_T_2 300, EXT_0
        let body = [0x45, 0x41, b's', 0x00, 0x82, 0x82, 0x2c, 0xc0, 0x01];
        let d = read(&doc(b"", &body)).unwrap();
        assert_eq!(
            &d.nodes[1..4],
            &[
                Node::Extension(Extension { slot: 1, value: ExtensionValue::String("s".into()) }),
                Node::Extension(Extension { slot: 2, value: ExtensionValue::Integer(300) }),
                Node::Extension(Extension { slot: 0, value: ExtensionValue::Byte }),
            ]
        );
    }

    #[test]
    fn test_opaque() {
        let body = [0x45, 0xc3, 0x03, 0xde, 0xad, 0x00, 0x01];
        let d = read(&doc(b"", &body)).unwrap();
        assert_eq!(d.nodes[1], Node::Opaque(vec![0xde, 0xad, 0x00]));
    }

    #[test]
    fn test_processing_instruction() {
        // PI target=name, data "x", END, then root
        let body = [0x43, 0x05, 0x03, b'x', 0x00, 0x01, 0x05];
        let d = read(&doc(b"", &body)).unwrap();
        assert_eq!(
            d.nodes[0],
            Node::ProcessingInstruction(ProcessingInstruction {
                target: Name::Code(0x0005),
                data: vec![AttrPart::Str("x".into())],
            })
        );
        assert_eq!(d.nodes[1], empty(0x0005));
    }

    #[test]
    fn test_pi_errors() {
        assert_eq!(read(&doc(b"", &[0x43, 0x05, 0x06, 0x01])), Err(ParseError::RepeatedPiTarget));
        assert_eq!(read(&doc(b"", &[0x43, 0x01])), Err(ParseError::MissingPiTarget));
        assert!(matches!(
            read(&doc(b"", &[0x85, 0x43])),
            Err(ParseError::UnexpectedToken { token: "PI", .. })
        ));
    }

    #[test]
    fn test_strict_truncation() {
        // unclosed root
        assert_eq!(read(&doc(b"", &[0x45, 0x47, 0x01])), Err(ParseError::Unclosed { depth: 1 }));
        // mid-token: STR_I without terminator
        assert!(matches!(
            read(&doc(b"", &[0x45, 0x03, b'a'])),
            Err(ParseError::UnexpectedEof { .. })
        ));
        // no body at all
        assert_eq!(read(&doc(b"", &[])), Err(ParseError::MissingRoot));
    }

    #[test]
    fn test_lenient_truncation() {
        let index = compile(PAGES);
        let reader = Reader::with_options(&index, ReaderOptions::lenient());
        let d = reader.parse(&doc(b"", &[0x45, 0x47, 0x03, b'a', 0x00, 0x03, b'b'])).unwrap();
        // the unfinished STR_I is dropped along with the pending text
        assert_eq!(d.nodes, vec![start(0x0005), start(0x0007)]);

        let d = reader.parse(&doc(b"", &[0x45, 0x47, 0x03, b'a', 0x00])).unwrap();
        assert_eq!(d.nodes, vec![start(0x0005), start(0x0007), Node::Text("a".into())]);
    }

    #[test]
    fn test_truncated_header_always_fails() {
        let index = compile(PAGES);
        let reader = Reader::with_options(&index, ReaderOptions::lenient());
        assert!(reader.parse(&[0x03, 0x01]).is_err());
        assert!(reader.parse(&[0x03, 0x01, 0x6a, 0x05, b'a']).is_err());
    }

    #[test]
    fn test_invalid_string_table_offset() {
        let body = [0x45, 0x83, 0x09, 0x01];
        assert_eq!(read(&doc(b"ab\0", &body)), Err(ParseError::InvalidOffset(9)));
    }
}
