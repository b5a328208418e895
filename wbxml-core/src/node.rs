//! Document nodes - the output of the reader.
//!
//! A document is a flat list of nodes. Nesting is implicit: every
//! `Element` of kind `Start` is closed by a later `EndTag`, the way
//! start/end event pairs describe structure in a SAX stream.
//!
//! `<Sync><Status>1</Status></Sync>` reads as:
//! ```text
//! Element { kind: Start, tag: Code(0x0005) }
//! Element { kind: Start, tag: Code(0x000e) }
//! Text("1")
//! EndTag
//! EndTag
//! ```

/// Global token values, valid in every codepage.
pub mod token {
    pub const SWITCH_PAGE: u8 = 0x00;
    pub const END: u8 = 0x01;
    pub const ENTITY: u8 = 0x02;
    pub const STR_I: u8 = 0x03;
    pub const LITERAL: u8 = 0x04;
    pub const EXT_I_0: u8 = 0x40;
    pub const PI: u8 = 0x43;
    pub const EXT_T_0: u8 = 0x80;
    pub const STR_T: u8 = 0x83;
    pub const EXT_0: u8 = 0xc0;
    pub const OPAQUE: u8 = 0xc3;

    /// Tag flag: the element has content and a matching END.
    pub const HAS_CONTENT: u8 = 0x40;
    /// Tag flag: an attribute list follows.
    pub const HAS_ATTRIBUTES: u8 = 0x80;
    /// Attribute tokens at or above this are attribute-value constants.
    pub const ATTR_VALUE: u8 = 0x80;
}

/// A tag, attribute or PI target: either a codepage-qualified code or a
/// name taken from the string table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    /// `(codepage << 8) | local`
    Code(u16),
    Literal(String),
}

impl Name {
    pub fn code(&self) -> Option<u16> {
        match self {
            Name::Code(c) => Some(*c),
            Name::Literal(_) => None,
        }
    }

    /// Codepage number of a coded name.
    pub fn page(&self) -> Option<u8> {
        self.code().map(|c| (c >> 8) as u8)
    }
}

impl From<u16> for Name {
    fn from(code: u16) -> Self {
        Name::Code(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Has content; closed by a later `EndTag`.
    Start,
    /// Self-closing.
    Empty,
}

/// One piece of an attribute value or PI data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrPart {
    /// Inline or string-table text, or a rendered `&#N;` entity.
    Str(String),
    /// An attribute-value constant token, `(codepage << 8) | token`.
    Constant(u16),
    Extension(Extension),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    /// Parts in document order, not counting the literal data that the
    /// attribute start token itself may carry.
    pub value: Vec<AttrPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub tag: Name,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(kind: ElementKind, tag: impl Into<Name>) -> Self {
        Element { kind, tag: tag.into(), attributes: Vec::new() }
    }

    /// Attribute by name.
    pub fn attribute(&self, name: &Name) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.name == name)
    }
}

/// Extension subtype, chosen by the high two bits of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    String,
    Integer,
    Byte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionValue {
    /// `EXT_I_n termstr`
    String(String),
    /// `EXT_T_n mb_uint32`
    Integer(u32),
    /// `EXT_n`, no payload
    Byte,
}

/// A vendor-specific typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// 0, 1 or 2.
    pub slot: u8,
    pub value: ExtensionValue,
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        match self.value {
            ExtensionValue::String(_) => ExtensionKind::String,
            ExtensionValue::Integer(_) => ExtensionKind::Integer,
            ExtensionValue::Byte => ExtensionKind::Byte,
        }
    }

    /// The token this extension is written with.
    pub fn token(&self) -> u8 {
        let base = match self.value {
            ExtensionValue::String(_) => token::EXT_I_0,
            ExtensionValue::Integer(_) => token::EXT_T_0,
            ExtensionValue::Byte => token::EXT_0,
        };
        base + self.slot
    }
}

impl std::fmt::Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            ExtensionValue::String(s) => write!(f, "[ext{} {:?}]", self.slot, s),
            ExtensionValue::Integer(n) => write!(f, "[ext{} {}]", self.slot, n),
            ExtensionValue::Byte => write!(f, "[ext{}]", self.slot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: Name,
    pub data: Vec<AttrPart>,
}

/// A document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Closes the innermost open `Start` element.
    EndTag,
    /// Adjacent string tokens are merged into one text node.
    Text(String),
    Extension(Extension),
    ProcessingInstruction(ProcessingInstruction),
    Opaque(Vec<u8>),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this opens an element that needs an `EndTag`.
    pub fn is_start(&self) -> bool {
        matches!(self, Node::Element(Element { kind: ElementKind::Start, .. }))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Node::EndTag)
    }

    /// Tag code of a coded element.
    pub fn tag_id(&self) -> Option<u16> {
        self.as_element().and_then(|e| e.tag.code())
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }
}
