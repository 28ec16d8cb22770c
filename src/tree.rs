//! Arena-backed document tree.
//!
//! Nodes are addressed by [`NodeId`], a stable index into the [`Document`] arena. Every index
//! computed by this crate is a side table keyed by `NodeId`; nothing is ever written back onto
//! the nodes themselves, so a `Document` is immutable once built.
//!
//! Documents come from an external parser. Two construction paths are provided:
//!
//! - [`DocumentBuilder`] for programmatic construction (tests, adapters over other ASTs)
//! - [`DocNode`], a nested serde form, converted with [`Document::from_tree`] or
//!   [`Document::from_json`]

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use crate::error::AnnotateError;

/// Reserved tag for text leaves.
pub const TEXT_TAG: &str = "#text";
/// Tag of the child element holding a node's title content.
pub const TITLE_TAG: &str = "title";
/// Attribute carrying a node's explicit identifier.
pub const ID_ATTR: &str = "id";
/// Attribute carrying a cross-reference target identifier.
pub const REF_ATTR: &str = "ref";

/// Compact node handle (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<NodeId>,
    pub text: Option<String>,
}

impl Node {
    pub fn element(tag: &str) -> Node {
        Node {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn text(content: &str) -> Node {
        Node {
            tag: TEXT_TAG.to_string(),
            text: Some(content.to_string()),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The explicit identifier, ignoring blank values.
    pub fn explicit_id(&self) -> Option<&str> {
        self.attr(ID_ATTR).map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }
}

/// Nested, serde-friendly form of a document tree.
///
/// A node with an empty `tag` and some `text` is read as a text leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<DocNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|node| node.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|node| node.attr(name))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Build a document from the nested form. Children keep their document order.
    pub fn from_tree(root: DocNode) -> Document {
        let mut builder = DocumentBuilder::new();
        let mut stack: Vec<(DocNode, Option<NodeId>)> = vec![(root, None)];
        let mut root_id = None;
        while let Some((mut doc_node, parent)) = stack.pop() {
            let children = std::mem::take(&mut doc_node.children);
            let tag = if doc_node.tag.is_empty() && doc_node.text.is_some() {
                TEXT_TAG.to_string()
            } else {
                doc_node.tag
            };
            let id = builder.push(Node {
                tag,
                attrs: doc_node.attrs,
                children: Vec::with_capacity(children.len()),
                text: doc_node.text,
            });
            match parent {
                Some(parent) => builder.append(parent, id),
                None => root_id = Some(id),
            }
            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }
        builder.build(root_id.unwrap_or(NodeId(0)))
    }

    pub fn from_json(content: &str) -> Result<Document, AnnotateError> {
        let root: DocNode = serde_json::from_str(content)?;
        Ok(Document::from_tree(root))
    }

    /// First direct child tagged [`TITLE_TAG`].
    pub fn title_of(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.tag(*child) == Some(TITLE_TAG))
    }

    /// The inline nodes making up a node's title, empty when untitled.
    pub fn title_content(&self, id: NodeId) -> Vec<NodeId> {
        self.title_of(id)
            .map(|title| self.children(title).to_vec())
            .unwrap_or_default()
    }

    pub fn title_text(&self, id: NodeId) -> String {
        self.title_of(id)
            .map(|title| self.text_content(title))
            .unwrap_or_default()
    }

    /// Concatenated, whitespace-collapsed text of every text leaf below `id`.
    ///
    /// Each node is read at most once, so malformed arenas cannot loop here.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut seen = vec![false; self.nodes.len()];
        let mut raw = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if std::mem::replace(&mut seen[current.index()], true) {
                continue;
            }
            if let Some(text) = node.text.as_deref() {
                raw.push_str(text);
                raw.push(' ');
            }
            stack.extend(node.children.iter().rev().copied());
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Incremental arena construction.
///
/// `append` does not validate its arguments; structural problems (cycles, shared children,
/// out-of-range ids) surface as [`AnnotateError::MalformedTree`] when the document is installed.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    pub fn element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut node = Node::element(tag);
        for (key, value) in attrs {
            node.attrs.insert(key.to_string(), value.to_string());
        }
        self.push(node)
    }

    pub fn text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.attrs.insert(key.to_string(), value.to_string());
        }
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.index()) {
            node.children.push(child);
        }
    }

    /// Create a child element under `parent` and return it.
    pub fn child(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.element_with(tag, attrs);
        self.append(parent, id);
        id
    }

    /// Attach a `<title>` holding a single text leaf.
    pub fn title(&mut self, parent: NodeId, text: &str) -> NodeId {
        let title = self.child(parent, TITLE_TAG, &[]);
        let leaf = self.text(text);
        self.append(title, leaf);
        title
    }

    pub fn build(self, root: NodeId) -> Document {
        Document {
            nodes: self.nodes,
            root,
        }
    }
}
