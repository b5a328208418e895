//! WBXML Core
//!
//! Reader, writer and path-driven event parser for WBXML (WAP Binary XML),
//! the tokenized XML encoding ActiveSync uses on the wire. The codec is
//! parameterized by a compiled schema ([`CodepageIndex`]) and works on
//! complete in-memory buffers; it does no I/O.
//!
//! # Architecture
//!
//! - **varint.rs** - `mb_uint32` encode/decode
//! - **charset.rs** - MIB enum table, string decode/encode
//! - **string_table.rs** - NUL-separated string pool with suffix lookups
//! - **codepage.rs** - Declarative codepages and the compiled index
//! - **activesync.rs** - ActiveSync codepage tables
//! - **node.rs** - Document node model and global tokens
//! - **reader.rs** - Header and body state machine
//! - **writer.rs** - Structured calls to bytes
//! - **tree.rs** - Arena tree view over a node span
//! - **event_parser.rs** - Path listeners over a parsed document
//! - **dump.rs** - Debug rendering
//!
//! # Example
//!
//! ```
//! use wbxml_core::activesync::{airsync, codepages};
//! use wbxml_core::{parse, Writer, WriterConfig};
//!
//! let mut w = Writer::new(WriterConfig::default()).unwrap();
//! w.stag(airsync::Sync, &[]).unwrap()
//!     .tag_with_text(airsync::SyncKey, &[], "0").unwrap()
//!     .etag().unwrap();
//! let bytes = w.finish().unwrap().into_vec();
//!
//! let doc = parse(&bytes, codepages()).unwrap();
//! assert_eq!(doc.root_tag(), Some(airsync::Sync));
//! ```

pub mod activesync;
pub mod charset;
pub mod codepage;
pub mod dump;
pub mod error;
pub mod event_parser;
pub mod node;
pub mod reader;
pub mod string_table;
pub mod tree;
pub mod varint;
pub mod writer;

pub use charset::Charset;
pub use codepage::{compile, AttrDef, Codepage, CodepageIndex};
pub use dump::{dump, DumpOptions};
pub use error::{EventError, ListenerError, ParseError, Result, VarIntError, WriteError};
pub use event_parser::{EventParser, PathSegment};
pub use node::{
    AttrPart, Attribute, Element, ElementKind, Extension, ExtensionKind, ExtensionValue, Name,
    Node, ProcessingInstruction,
};
pub use reader::{parse, Document, EndOfInput, Reader, ReaderOptions, Version};
pub use string_table::StringTable;
pub use tree::{NodeId, Tree, TreeNode};
pub use writer::{Attr, Content, Opaque, OutputMode, TagRef, WbxmlOutput, Writer, WriterConfig};
