//! Human-readable rendering of a document, for logs and debugging.

use std::fmt::Write as _;

use crate::codepage::CodepageIndex;
use crate::node::{AttrPart, Name, Node};
use crate::reader::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Prefix version, public id, charset and string table.
    pub header: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions { indent: 2, header: false }
    }
}

/// Render `doc` as indented XML-like text, one node per line.
pub fn dump(doc: &Document, codepages: &CodepageIndex<'_>, options: &DumpOptions) -> String {
    let mut out = String::new();

    if options.header {
        let _ = writeln!(out, "Version: {}", doc.version);
        let _ = writeln!(out, "Public ID: {}", doc.public_id);
        let _ = writeln!(out, "Charset: {}", doc.charset);
        out.push_str("String table:\n");
        for s in doc.strings.strings() {
            let _ = writeln!(out, "  {:?}", s);
        }
        out.push('\n');
    }

    let mut stack: Vec<String> = Vec::new();
    for node in &doc.nodes {
        let pad = " ".repeat(stack.len() * options.indent);
        match node {
            Node::Element(element) => {
                let name = codepages.qualified_tag(&element.tag).into_owned();
                let _ = write!(out, "{}<{}", pad, name);
                for attr in &element.attributes {
                    let value = value_text(codepages, &attr.name, &attr.value);
                    let _ = write!(out, " {}=\"{}\"", codepages.qualified_attribute(&attr.name), value);
                }
                if node.is_start() {
                    out.push_str(">\n");
                    stack.push(name);
                } else {
                    out.push_str("/>\n");
                }
            }
            Node::EndTag => {
                let name = stack.pop().unwrap_or_default();
                let pad = " ".repeat(stack.len() * options.indent);
                let _ = writeln!(out, "{}</{}>", pad, name);
            }
            Node::Text(s) => {
                let _ = writeln!(out, "{}{}", pad, s);
            }
            Node::Extension(ext) => {
                let _ = writeln!(out, "{}{}", pad, ext);
            }
            Node::ProcessingInstruction(pi) => {
                let _ = write!(out, "{}<?{}", pad, pi_target(codepages, &pi.target));
                let data = value_text(codepages, &pi.target, &pi.data);
                if !data.is_empty() {
                    let _ = write!(out, " {}", data);
                }
                out.push_str("?>\n");
            }
            Node::Opaque(data) => {
                let _ = writeln!(out, "{}<![CDATA[{}]]>", pad, String::from_utf8_lossy(data));
            }
        }
    }
    out
}

/// PI targets are attribute starts, shown by their bare name.
fn pi_target(codepages: &CodepageIndex<'_>, target: &Name) -> String {
    match target {
        Name::Literal(s) => s.clone(),
        Name::Code(id) => match codepages.attribute(*id) {
            Some(def) => def.name.to_string(),
            None => format!("0x{:02x}", id & 0xff),
        },
    }
}

/// Resolved value, or the raw pieces when a constant isn't in the schema.
fn value_text(codepages: &CodepageIndex<'_>, start: &Name, parts: &[AttrPart]) -> String {
    let unresolved = parts.iter().any(|part| match part {
        AttrPart::Constant(id) => codepages.attribute(*id).is_none(),
        _ => false,
    });
    if unresolved {
        raw_value(parts)
    } else {
        codepages.value_string(start, parts)
    }
}

/// Attribute value pieces flattened for display, constants shown by id.
fn raw_value(parts: &[AttrPart]) -> String {
    let mut s = String::new();
    for part in parts {
        match part {
            AttrPart::Str(t) => s.push_str(t),
            AttrPart::Constant(id) => {
                let _ = write!(s, "{{0x{:04x}}}", id);
            }
            AttrPart::Extension(ext) => {
                let _ = write!(s, "{}", ext);
            }
        }
    }
    s
}
