use std::collections::HashMap;

use crate::{
    error::AnnotateError,
    tree::{Document, NodeId},
    walk::walk,
};

/// node -> parent, built from one walk of the document.
///
/// Absent entries mean "root, or not part of the installed tree".
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<NodeId, NodeId>,
}

impl ParentIndex {
    pub fn build(doc: &Document) -> Result<ParentIndex, AnnotateError> {
        let mut parents = HashMap::with_capacity(doc.len());
        walk(doc, doc.root(), |node, ancestors| {
            if let Some(parent) = ancestors.parent() {
                parents.insert(node, parent);
            }
        })?;
        tracing::debug!("[ParentIndex::build] indexed {} child nodes", parents.len());
        Ok(ParentIndex { parents })
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Proper ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> AncestorIter<'_> {
        AncestorIter {
            index: self,
            current: Some(node),
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

pub struct AncestorIter<'a> {
    index: &'a ParentIndex,
    current: Option<NodeId>,
}

impl Iterator for AncestorIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let parent = self.index.parent_of(self.current?);
        self.current = parent;
        parent
    }
}
