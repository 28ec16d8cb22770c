//! Cross-reference targets.
//!
//! Every node owning an identifier is a target: refable nodes (which always get one) and any
//! other node carrying an explicit `id`. Each target records its title and display number:
//! the dot-joined ToC path for ToC entries, the enclosing division's number plus the block
//! number for numbered blocks. Untitled numbered blocks get a synthesized title such as
//! `"Theorem 2.3"`. A missing entry means a dangling reference; reporting it is up to the caller.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    error::AnnotateError,
    ids::IdAssignments,
    numbering::{block_display_number, BlockNumbers},
    schema::TagSchema,
    toc::{DivisionMembership, Toc},
    tree::{Document, NodeId},
    walk::walk,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XRefTargetInfo {
    pub id: String,
    pub node: NodeId,
    pub tag: String,
    pub title: Vec<NodeId>,
    pub title_text: String,
    pub number: Option<String>,
}

/// Collaborators the cross-reference pass reads from.
pub struct XRefSources<'a> {
    pub doc: &'a Document,
    pub schema: &'a TagSchema,
    pub ids: &'a IdAssignments,
    pub toc: &'a Toc,
    pub blocks: &'a BlockNumbers,
    pub membership: &'a DivisionMembership,
}

impl XRefSources<'_> {
    fn number_of(&self, node: NodeId) -> Option<String> {
        if let Some(item) = self.toc.get_by_node(node) {
            return Some(item.display_number());
        }
        let block = self.blocks.get(node)?;
        let division = self
            .membership
            .division_node_of(node)
            .and_then(|division| self.toc.get_by_node(division));
        Some(block_display_number(block, division))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct XRefIndex {
    targets: BTreeMap<String, XRefTargetInfo>,
}

impl XRefIndex {
    pub fn build(sources: &XRefSources<'_>) -> Result<XRefIndex, AnnotateError> {
        let XRefSources {
            doc, schema, ids, ..
        } = *sources;
        let mut targets = BTreeMap::new();
        walk(doc, doc.root(), |node, _| {
            if !ids.owns(node) {
                return;
            }
            let (Some(id), Some(tag)) = (ids.id_of(node), doc.tag(node)) else {
                return;
            };
            let number = sources.number_of(node);
            let mut title_text = doc.title_text(node);
            if title_text.is_empty() && schema.is_numbered_block(tag) {
                title_text = match &number {
                    Some(number) => format!("{} {}", schema.display_name(tag), number),
                    None => schema.display_name(tag),
                };
            }
            targets.insert(
                id.to_string(),
                XRefTargetInfo {
                    id: id.to_string(),
                    node,
                    tag: tag.to_string(),
                    title: doc.title_content(node),
                    title_text,
                    number,
                },
            );
        })?;
        tracing::debug!("[XRefIndex::build] {} reference targets", targets.len());
        Ok(XRefIndex { targets })
    }

    pub fn resolve(&self, id: &str) -> Option<&XRefTargetInfo> {
        self.targets.get(id)
    }

    /// Targets ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &XRefTargetInfo> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
