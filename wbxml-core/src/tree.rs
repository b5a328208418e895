//! Tree view over document nodes.
//!
//! A [`Document`] is flat; nesting is implied by `Start`/`EndTag` pairs.
//! This module gives a span of it explicit parent/child links without
//! copying the nodes. The tree uses an index-based arena, so a node can
//! reach its parent without reference cycles.
//!
//! # Example
//!
//! ```
//! use wbxml_core::activesync::{airsync, codepages};
//! use wbxml_core::reader::parse;
//! use wbxml_core::tree::Tree;
//!
//! // <Sync><Status>1</Status></Sync>
//! let data = [0x03, 0x01, 0x6a, 0x00, 0x45, 0x4e, 0x03, b'1', 0x00, 0x01, 0x01];
//! let doc = parse(&data, codepages()).unwrap();
//! let tree = Tree::build(&doc.nodes);
//! let sync = tree.roots().next().unwrap();
//! assert_eq!(sync.child(airsync::Status).and_then(|s| s.text()), Some("1"));
//! ```

use crate::node::{Element, Node};

/// Index into a tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData<'d> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node: &'d Node,
}

/// Arena of borrowed nodes with parent/child links. `EndTag`s are not
/// stored; they only close their element.
#[derive(Debug, Default)]
pub struct Tree<'d> {
    nodes: Vec<NodeData<'d>>,
    roots: Vec<NodeId>,
}

impl<'d> Tree<'d> {
    pub fn new() -> Self {
        Tree { nodes: Vec::new(), roots: Vec::new() }
    }

    /// Link a whole flat node list. Unbalanced `EndTag`s are ignored.
    pub fn build(nodes: &'d [Node]) -> Self {
        let mut tree = Tree::new();
        let mut open: Vec<NodeId> = Vec::new();
        for node in nodes {
            if node.is_end() {
                open.pop();
                continue;
            }
            let id = tree.push(open.last().copied(), node);
            if node.is_start() {
                open.push(id);
            }
        }
        tree
    }

    /// Append `node` as the last child of `parent`, or as a new root.
    pub fn push(&mut self, parent: Option<NodeId>, node: &'d Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData { parent, children: Vec::new(), node });
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<TreeNode<'_, 'd>> {
        if id.index() < self.nodes.len() {
            Some(TreeNode { tree: self, id })
        } else {
            None
        }
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> impl Iterator<Item = TreeNode<'_, 'd>> + '_ {
        self.roots.iter().map(move |&id| TreeNode { tree: self, id })
    }

    fn data(&self, id: NodeId) -> &NodeData<'d> {
        &self.nodes[id.index()]
    }
}

/// A handle for navigating a [`Tree`].
#[derive(Clone, Copy)]
pub struct TreeNode<'t, 'd> {
    tree: &'t Tree<'d>,
    id: NodeId,
}

impl<'t, 'd> TreeNode<'t, 'd> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying document node.
    pub fn node(&self) -> &'d Node {
        self.tree.data(self.id).node
    }

    pub fn element(&self) -> Option<&'d Element> {
        self.node().as_element()
    }

    /// Tag code, for coded elements.
    pub fn tag_id(&self) -> Option<u16> {
        self.node().tag_id()
    }

    pub fn parent(&self) -> Option<TreeNode<'t, 'd>> {
        let tree = self.tree;
        tree.data(self.id).parent.map(|id| TreeNode { tree, id })
    }

    pub fn children(&self) -> impl Iterator<Item = TreeNode<'t, 'd>> + 't {
        let tree = self.tree;
        tree.data(self.id).children.iter().map(move |&id| TreeNode { tree, id })
    }

    pub fn first_child(&self) -> Option<TreeNode<'t, 'd>> {
        self.children().next()
    }

    /// First child element with the given tag code.
    pub fn child(&self, tag: u16) -> Option<TreeNode<'t, 'd>> {
        self.children().find(|c| c.tag_id() == Some(tag))
    }

    /// Text of this node, or of an element's only text child.
    ///
    /// `<ServerId>5:1</ServerId>` gives `Some("5:1")`.
    pub fn text(&self) -> Option<&'d str> {
        if let Some(s) = self.node().text() {
            return Some(s);
        }
        self.children().find_map(|c| c.node().text())
    }

    /// Recursively collect all text content under this node.
    pub fn all_text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        match self.node() {
            Node::Text(s) => buf.push_str(s),
            _ => {
                for child in self.children() {
                    child.collect_text(buf);
                }
            }
        }
    }
}

impl std::fmt::Debug for TreeNode<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("node", self.node())
            .field("children", &self.tree.data(self.id).children.len())
            .finish()
    }
}
