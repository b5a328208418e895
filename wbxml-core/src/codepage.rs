//! Codepage tables and the compiled lookup index.
//!
//! A protocol schema is declared as a list of [`Codepage`]s. [`compile`]
//! turns it into a [`CodepageIndex`] once; the index is immutable and can
//! be shared by any number of readers and writers.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::node::{AttrPart, Name};

/// One codepage of a schema.
#[derive(Debug, Clone, Copy)]
pub struct Codepage<'a> {
    pub name: &'a str,
    /// Tag name and full id; the upper byte is the codepage number.
    pub tags: &'a [(&'a str, u16)],
    pub attrs: &'a [AttrDef<'a>],
}

/// Attribute start or attribute-value constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrDef<'a> {
    pub name: &'a str,
    /// Full id, `(codepage << 8) | token`.
    pub value: u16,
    /// Literal text the token stands for, e.g. `http://` for a value
    /// constant or the prefix carried by an attribute start.
    pub data: Option<&'a str>,
}

/// Compiled lookup tables for a schema.
#[derive(Debug, Clone, Default)]
pub struct CodepageIndex<'a> {
    namespaces: HashMap<u8, &'a str>,
    tags: HashMap<u16, &'a str>,
    tag_ids: HashMap<&'a str, HashMap<&'a str, u16>>,
    attrs: HashMap<u16, AttrDef<'a>>,
}

/// Build the lookup index for a schema.
///
/// A page's number comes from the upper byte of its first tag, so a page
/// without tags cannot be switched to.
pub fn compile<'a>(pages: &[Codepage<'a>]) -> CodepageIndex<'a> {
    let mut index = CodepageIndex::default();
    for page in pages {
        if let Some(&(_, first)) = page.tags.first() {
            index.namespaces.insert((first >> 8) as u8, page.name);
        }
        for &(name, id) in page.tags {
            index.tags.insert(id, name);
            index.tag_ids.entry(page.name).or_default().insert(name, id);
        }
        for attr in page.attrs {
            index.attrs.insert(attr.value, *attr);
        }
    }
    log::debug!(
        "compiled {} codepages: {} tags, {} attributes",
        index.namespaces.len(),
        index.tags.len(),
        index.attrs.len()
    );
    index
}

impl<'a> CodepageIndex<'a> {
    /// Namespace name of a codepage number.
    pub fn namespace(&self, page: u8) -> Option<&'a str> {
        self.namespaces.get(&page).copied()
    }

    pub fn has_page(&self, page: u8) -> bool {
        self.namespaces.contains_key(&page)
    }

    pub fn tag_name(&self, id: u16) -> Option<&'a str> {
        self.tags.get(&id).copied()
    }

    /// Reverse lookup: `tag_id("AirSync", "Sync")`.
    pub fn tag_id(&self, namespace: &str, name: &str) -> Option<u16> {
        self.tag_ids.get(namespace)?.get(name).copied()
    }

    pub fn attribute(&self, id: u16) -> Option<&AttrDef<'a>> {
        self.attrs.get(&id)
    }

    /// `Namespace:Local` for a coded tag, the literal text otherwise.
    pub fn qualified_tag<'n>(&self, tag: &'n Name) -> Cow<'n, str> {
        match tag {
            Name::Literal(s) => Cow::Borrowed(s),
            Name::Code(id) => {
                let local = match self.tag_name(*id) {
                    Some(name) => Cow::Borrowed(name),
                    None => Cow::Owned(format!("0x{:02x}", id & 0xff)),
                };
                self.qualify((id >> 8) as u8, &local)
            }
        }
    }

    /// `Namespace:name` for a coded attribute, the literal text otherwise.
    pub fn qualified_attribute<'n>(&self, attr: &'n Name) -> Cow<'n, str> {
        match attr {
            Name::Literal(s) => Cow::Borrowed(s),
            Name::Code(id) => {
                let local = match self.attribute(*id) {
                    Some(def) => Cow::Borrowed(def.name),
                    None => Cow::Owned(format!("0x{:02x}", id & 0xff)),
                };
                self.qualify((id >> 8) as u8, &local)
            }
        }
    }

    fn qualify<'n>(&self, page: u8, local: &str) -> Cow<'n, str> {
        match self.namespace(page) {
            Some(ns) => Cow::Owned(format!("{}:{}", ns, local)),
            None => Cow::Owned(local.to_string()),
        }
    }

    /// Resolve an attribute value (or PI data) to its final pieces.
    ///
    /// `start` is the attribute start or PI target, whose literal data
    /// prefixes the value. Constants are replaced by their literal data and
    /// adjacent text is merged; extensions stay separate pieces.
    pub fn resolve_value(&self, start: &Name, parts: &[AttrPart]) -> Vec<AttrPart> {
        let mut out = Vec::new();
        let mut text = String::new();
        if let Some(data) = start.code().and_then(|id| self.attribute(id)).and_then(|d| d.data) {
            text.push_str(data);
        }
        for part in parts {
            match part {
                AttrPart::Str(s) => text.push_str(s),
                AttrPart::Constant(id) => {
                    if let Some(data) = self.attribute(*id).and_then(|d| d.data) {
                        text.push_str(data);
                    }
                }
                AttrPart::Extension(ext) => {
                    if !text.is_empty() {
                        out.push(AttrPart::Str(std::mem::take(&mut text)));
                    }
                    out.push(AttrPart::Extension(ext.clone()));
                }
            }
        }
        if !text.is_empty() {
            out.push(AttrPart::Str(text));
        }
        out
    }

    /// [`resolve_value`](Self::resolve_value) flattened to one string.
    pub fn value_string(&self, start: &Name, parts: &[AttrPart]) -> String {
        let mut s = String::new();
        for piece in self.resolve_value(start, parts) {
            match piece {
                AttrPart::Str(t) => s.push_str(&t),
                AttrPart::Extension(ext) => s.push_str(&ext.to_string()),
                AttrPart::Constant(_) => {}
            }
        }
        s
    }
}
