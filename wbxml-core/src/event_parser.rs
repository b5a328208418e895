//! Path-driven extraction from a parsed document.
//!
//! Listeners register a path of tag matchers. One pass over the document
//! calls each listener for every element whose full path matches:
//! self-closing elements when they are seen, elements with content when
//! they close, with their subtree linked as a [`TreeNode`].
//!
//! ```
//! use wbxml_core::activesync::{airsync, codepages};
//! use wbxml_core::event_parser::EventParser;
//! use wbxml_core::reader::parse;
//!
//! // <Sync><Status>1</Status></Sync>
//! let data = [0x03, 0x01, 0x6a, 0x00, 0x45, 0x4e, 0x03, b'1', 0x00, 0x01, 0x01];
//! let doc = parse(&data, codepages()).unwrap();
//!
//! let mut status = None;
//! let mut ep = EventParser::new();
//! ep.add_listener([airsync::Sync, airsync::Status], |node| {
//!     status = node.text().map(str::to_string);
//!     Ok(())
//! });
//! ep.run(&doc).unwrap();
//! drop(ep);
//! assert_eq!(status.as_deref(), Some("1"));
//! ```

use crate::error::{EventError, ListenerError};
use crate::node::{Name, Node};
use crate::reader::Document;
use crate::tree::{NodeId, Tree, TreeNode};

/// One step of a listener path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Tag(u16),
    /// A string-table tag name.
    Literal(String),
    /// Any tag.
    Any,
    OneOf(Vec<u16>),
}

impl PathSegment {
    fn matches(&self, name: &Name) -> bool {
        match (self, name) {
            (PathSegment::Any, _) => true,
            (PathSegment::Tag(t), Name::Code(c)) => t == c,
            (PathSegment::OneOf(set), Name::Code(c)) => set.contains(c),
            (PathSegment::Literal(l), Name::Literal(n)) => l == n,
            _ => false,
        }
    }
}

impl From<u16> for PathSegment {
    fn from(tag: u16) -> Self {
        PathSegment::Tag(tag)
    }
}

impl From<&[u16]> for PathSegment {
    fn from(set: &[u16]) -> Self {
        PathSegment::OneOf(set.to_vec())
    }
}

type Callback<'l> = Box<dyn FnMut(&TreeNode<'_, '_>) -> Result<(), ListenerError> + 'l>;
type ErrorHook<'l> = Box<dyn FnMut(ListenerError) -> Result<(), ListenerError> + 'l>;

struct Listener<'l> {
    path: Vec<PathSegment>,
    callback: Callback<'l>,
}

impl Listener<'_> {
    fn matches(&self, full_path: &[&Name]) -> bool {
        self.path.len() == full_path.len()
            && self.path.iter().zip(full_path).all(|(seg, name)| seg.matches(name))
    }
}

/// Registry of path listeners.
pub struct EventParser<'l> {
    listeners: Vec<Listener<'l>>,
    on_error: ErrorHook<'l>,
}

impl Default for EventParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'l> EventParser<'l> {
    /// A parser with no listeners whose error hook re-raises.
    pub fn new() -> Self {
        EventParser { listeners: Vec::new(), on_error: Box::new(reraise) }
    }

    pub fn add_listener<P, S, F>(&mut self, path: P, callback: F) -> &mut Self
    where
        P: IntoIterator<Item = S>,
        S: Into<PathSegment>,
        F: FnMut(&TreeNode<'_, '_>) -> Result<(), ListenerError> + 'l,
    {
        let path = path.into_iter().map(Into::into).collect();
        self.listeners.push(Listener { path, callback: Box::new(callback) });
        self
    }

    /// Route listener failures through `hook`. Returning `Ok` swallows
    /// the failure and the pass continues; returning `Err` ends it.
    pub fn set_on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(ListenerError) -> Result<(), ListenerError> + 'l,
    {
        self.on_error = Box::new(hook);
        self
    }

    /// Walk `doc` once, calling matching listeners.
    pub fn run(&mut self, doc: &Document) -> Result<(), EventError> {
        let mut full_path: Vec<&Name> = Vec::new();
        // Recorded ids of the open elements, parallel to `full_path`.
        let mut open: Vec<Option<NodeId>> = Vec::new();
        let mut recording = 0usize;
        let mut tree = Tree::new();

        for node in &doc.nodes {
            match node {
                Node::Element(element) if node.is_start() => {
                    full_path.push(&element.tag);
                    recording += self.matching(&full_path).count();
                    let id = (recording > 0).then(|| tree.push(parent(&open), node));
                    open.push(id);
                }
                Node::Element(element) => {
                    full_path.push(&element.tag);
                    let matched: Vec<usize> = self.matching(&full_path).collect();
                    if recording > 0 || !matched.is_empty() {
                        let id = tree.push(parent(&open), node);
                        self.dispatch(&matched, &tree, id)?;
                    }
                    full_path.pop();
                    if recording == 0 {
                        tree.clear();
                    }
                }
                Node::EndTag => {
                    let matched: Vec<usize> = self.matching(&full_path).collect();
                    if let Some(Some(id)) = open.last() {
                        self.dispatch(&matched, &tree, *id)?;
                    }
                    recording -= matched.len().min(recording);
                    full_path.pop();
                    open.pop();
                    if recording == 0 {
                        tree.clear();
                    }
                }
                _ => {
                    if recording > 0 {
                        tree.push(parent(&open), node);
                    }
                }
            }
        }
        Ok(())
    }

    fn matching<'p>(&'p self, full_path: &'p [&'p Name]) -> impl Iterator<Item = usize> + 'p {
        self.listeners
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.matches(full_path))
            .map(|(i, _)| i)
    }

    fn dispatch(&mut self, matched: &[usize], tree: &Tree<'_>, id: NodeId) -> Result<(), EventError> {
        let Some(node) = tree.get(id) else { return Ok(()) };
        for &i in matched {
            if let Err(e) = (self.listeners[i].callback)(&node) {
                match (self.on_error)(e) {
                    Ok(()) => log::warn!("listener {} failed, continuing", i),
                    Err(e) => return Err(EventError(e)),
                }
            }
        }
        Ok(())
    }
}

fn reraise(e: ListenerError) -> Result<(), ListenerError> {
    Err(e)
}

/// Innermost recorded element, which new recorded nodes attach to.
fn parent(open: &[Option<NodeId>]) -> Option<NodeId> {
    open.last().copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activesync::{airsync, codepages};
    use crate::reader::parse;
    use crate::writer::{Writer, WriterConfig};

    /// <Sync><Collections><Collection>..</Collection><Status/></Collections></Sync>
    fn sync_doc() -> Document {
        let mut w = Writer::new(WriterConfig::default()).unwrap();
        w.stag(airsync::Sync, &[]).unwrap();
        w.stag(airsync::Collections, &[]).unwrap();
        w.stag(airsync::Collection, &[]).unwrap();
        w.tag_with_text(airsync::SyncKey, &[], "42").unwrap();
        w.tag_with_text(airsync::CollectionId, &[], "7").unwrap();
        w.tag(airsync::MoreAvailable, &[]).unwrap();
        w.etag().unwrap();
        w.tag(airsync::Status, &[]).unwrap();
        w.etag().unwrap().etag().unwrap();
        parse(&w.finish().unwrap().into_vec(), codepages()).unwrap()
    }

    #[test]
    fn test_collection_recorded_once() {
        let doc = sync_doc();
        let mut calls = Vec::new();
        let mut ep = EventParser::new();
        ep.add_listener([airsync::Sync, airsync::Collections, airsync::Collection], |node| {
            let children: Vec<_> = node.children().map(|c| c.tag_id()).collect();
            let key = node.child(airsync::SyncKey).and_then(|k| k.text()).map(str::to_string);
            calls.push((node.tag_id(), children, key));
            Ok(())
        });
        ep.run(&doc).unwrap();
        drop(ep);

        assert_eq!(
            calls,
            vec![(
                Some(airsync::Collection),
                vec![Some(airsync::SyncKey), Some(airsync::CollectionId), Some(airsync::MoreAvailable)],
                Some("42".to_string()),
            )]
        );
    }

    #[test]
    fn test_empty_tag_fires_immediately() {
        let doc = sync_doc();
        let mut seen = Vec::new();
        let mut ep = EventParser::new();
        ep.add_listener([airsync::Sync, airsync::Collections, airsync::Status], |node| {
            seen.push(node.children().count());
            Ok(())
        });
        ep.run(&doc).unwrap();
        drop(ep);
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn test_wildcard_and_set() {
        let doc = sync_doc();
        let mut count = 0;
        let mut ep = EventParser::new();
        let set: &[u16] = &[airsync::SyncKey, airsync::CollectionId];
        ep.add_listener(
            vec![
                PathSegment::Any,
                PathSegment::Any,
                PathSegment::Tag(airsync::Collection),
                PathSegment::from(set),
            ],
            |_| {
                count += 1;
                Ok(())
            },
        );
        ep.run(&doc).unwrap();
        drop(ep);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_nested_listeners_see_whole_subtree() {
        let doc = sync_doc();
        let mut outer_text = String::new();
        let mut inner = 0;
        let mut ep = EventParser::new();
        ep.add_listener([airsync::Sync], |node| {
            outer_text = node.all_text();
            Ok(())
        });
        ep.add_listener([airsync::Sync, airsync::Collections, airsync::Collection, airsync::SyncKey], |_| {
            inner += 1;
            Ok(())
        });
        ep.run(&doc).unwrap();
        drop(ep);
        assert_eq!(outer_text, "427");
        assert_eq!(inner, 1);
    }

    #[test]
    fn test_error_reraised_by_default() {
        let doc = sync_doc();
        let mut ep = EventParser::new();
        ep.add_listener([airsync::Sync], |_| Err("boom".into()));
        let err = ep.run(&doc).unwrap_err();
        assert_eq!(err.to_string(), "listener failed: boom");
    }

    #[test]
    fn test_error_hook_swallows() {
        let doc = sync_doc();
        let mut errors = Vec::new();
        let mut later = 0;
        let mut ep = EventParser::new();
        ep.add_listener([airsync::Sync, airsync::Collections, airsync::Collection], |_| {
            Err("bad collection".into())
        });
        ep.add_listener([airsync::Sync], |_| {
            later += 1;
            Ok(())
        });
        ep.set_on_error(|e| {
            errors.push(e.to_string());
            Ok(())
        });
        ep.run(&doc).unwrap();
        drop(ep);
        assert_eq!(errors, vec!["bad collection".to_string()]);
        assert_eq!(later, 1);
    }
}
