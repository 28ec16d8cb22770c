//! The annotation state façade.
//!
//! [`AnnotationState`] owns the installed [`Document`] and every index derived from it.
//! [`AnnotationState::set_root`] is the only mutator of the indices: it runs all passes in order
//! into a fresh [`Indices`] value and swaps it in only once every pass has succeeded, so queries
//! never observe a partially built index. After installation all queries take `&self` and can be
//! served concurrently.
//!
//! Pass order:
//!
//! 1. parent index (also rejects cycles, shared children and dangling child ids)
//! 2. identifiers: explicit `id`s declared, missing ones generated for refable/ToC nodes
//! 3. block numbering
//! 4. table of contents
//! 5. division membership
//! 6. cross-reference targets
//!
//! List labels are computed on demand from the parent index.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::{
    config::AnnotatorConfig,
    error::AnnotateError,
    ids::{IdAllocator, IdAssignments, DEFAULT_ID_BASE},
    lists::{LabelInfo, LabelKind, ListLabeler, DEFAULT_LABEL_CYCLE},
    numbering::{block_display_number, BlockInfo, BlockNumbers},
    parents::ParentIndex,
    schema::{TagSchema, DEFAULT_SCHEMA},
    toc::{DivisionMembership, Toc, TocItem},
    tree::{Document, NodeId, REF_ATTR},
    walk::walk,
    xref::{XRefIndex, XRefSources, XRefTargetInfo},
};

#[derive(Debug, Clone, Default)]
struct Indices {
    allocator: IdAllocator,
    parents: ParentIndex,
    ids: IdAssignments,
    blocks: BlockNumbers,
    toc: Toc,
    membership: DivisionMembership,
    xrefs: XRefIndex,
    /// Every node carrying a `ref` attribute, with its target.
    refs: Vec<(NodeId, String)>,
}

impl Indices {
    fn build(
        doc: &Document,
        schema: &TagSchema,
        reserved: &BTreeSet<String>,
        default_id_base: &str,
    ) -> Result<Indices, AnnotateError> {
        let parents = ParentIndex::build(doc)?;

        let mut allocator = IdAllocator::with_default_base(default_id_base);
        for id in reserved {
            allocator.declare(id);
        }
        let ids = IdAssignments::build(doc, schema, &mut allocator)?;
        let blocks = BlockNumbers::build(doc, schema)?;
        let toc = Toc::build(doc, schema, &ids)?;
        let membership = DivisionMembership::build(doc, schema, &parents)?;
        let xrefs = XRefIndex::build(&XRefSources {
            doc,
            schema,
            ids: &ids,
            toc: &toc,
            blocks: &blocks,
            membership: &membership,
        })?;

        let mut refs = Vec::new();
        walk(doc, doc.root(), |node, _| {
            if let Some(target) = doc.attr(node, REF_ATTR) {
                refs.push((node, target.trim().to_string()));
            }
        })?;

        Ok(Indices {
            allocator,
            parents,
            ids,
            blocks,
            toc,
            membership,
            xrefs,
            refs,
        })
    }
}

/// A `ref` whose target is not a known identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub node: NodeId,
    pub target: String,
}

/// Serializable snapshot of the derived tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub toc: Vec<TocItem>,
    pub targets: Vec<XRefTargetInfo>,
    pub dangling: Vec<DanglingRef>,
}

#[derive(Debug, Clone)]
pub struct AnnotationState {
    schema: TagSchema,
    label_cycle: Vec<LabelKind>,
    default_id_base: String,
    document: Option<Document>,
    indices: Indices,
    /// Identifiers handed out or declared through the public API; they stay taken across
    /// `set_root` calls.
    reserved: BTreeSet<String>,
}

impl Default for AnnotationState {
    fn default() -> Self {
        AnnotationState::new((*DEFAULT_SCHEMA).clone())
    }
}

impl AnnotationState {
    pub fn new(schema: TagSchema) -> Self {
        AnnotationState {
            schema,
            label_cycle: DEFAULT_LABEL_CYCLE.to_vec(),
            default_id_base: DEFAULT_ID_BASE.to_string(),
            document: None,
            indices: Indices::default(),
            reserved: BTreeSet::new(),
        }
    }

    pub fn with_config(config: &AnnotatorConfig) -> Self {
        let mut state = AnnotationState::new(config.schema());
        state.label_cycle = config.lists.cycle.clone();
        state.default_id_base = config.ids.default_base.clone();
        state.indices.allocator = IdAllocator::with_default_base(&state.default_id_base);
        state
    }

    /// Install a document, replacing every index.
    ///
    /// On error the previously installed document and indices are left untouched.
    pub fn set_root(&mut self, doc: Document) -> Result<(), AnnotateError> {
        let indices = Indices::build(&doc, &self.schema, &self.reserved, &self.default_id_base)
            .inspect_err(|e| tracing::error!("[AnnotationState::set_root] {e}"))?;
        tracing::debug!(
            "[AnnotationState::set_root] installed {} nodes: {} ToC entries, {} targets",
            doc.len(),
            indices.toc.len(),
            indices.xrefs.len()
        );
        self.document = Some(doc);
        self.indices = indices;
        Ok(())
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn schema(&self) -> &TagSchema {
        &self.schema
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.indices.parents.parent_of(node)
    }

    /// 0-based number of a numbered block within its division.
    pub fn block_number(&self, node: NodeId) -> Option<usize> {
        self.indices.blocks.get(node)
    }

    /// Identifier of the nearest enclosing division (the node itself for divisions).
    pub fn division_of(&self, node: NodeId) -> Option<&str> {
        self.indices.membership.division_of(node, &self.indices.ids)
    }

    /// Explicit or generated identifier of a node.
    pub fn node_id_of(&self, node: NodeId) -> Option<&str> {
        self.indices.ids.id_of(node)
    }

    pub fn toc(&self) -> &Toc {
        &self.indices.toc
    }

    /// ToC entry of the node's nearest enclosing division.
    pub fn toc_item_info(&self, node: NodeId) -> Option<&TocItem> {
        self.indices
            .membership
            .division_node_of(node)
            .and_then(|division| self.indices.toc.get_by_node(division))
    }

    pub fn resolve(&self, id: &str) -> Option<&XRefTargetInfo> {
        self.indices.xrefs.resolve(id)
    }

    /// Target of a reference node, looked up through its `ref` attribute.
    pub fn ref_target_info(&self, ref_node: NodeId) -> Option<&XRefTargetInfo> {
        let target = self.document.as_ref()?.attr(ref_node, REF_ATTR)?;
        self.resolve(target.trim())
    }

    pub fn division_display_name(&self, node: NodeId) -> Option<String> {
        let tag = self.document.as_ref()?.tag(node)?;
        Some(self.schema.display_name(tag))
    }

    /// Caption data for a node, `None` when it has no enclosing division with a ToC entry.
    pub fn block_info(&self, node: NodeId) -> Option<BlockInfo> {
        let division = self.toc_item_info(node)?;
        let display_name = self.division_display_name(node)?;
        let number = self.block_number(node);
        let display_number = match number {
            Some(block) => Some(block_display_number(block, Some(division))),
            None if division.node == node => Some(division.display_number()),
            None => None,
        };
        Some(BlockInfo {
            display_name,
            number,
            display_number,
            division: division.clone(),
        })
    }

    pub fn list_item_info(&self, node: NodeId) -> Option<LabelInfo> {
        let doc = self.document.as_ref()?;
        ListLabeler::new(doc, &self.schema, &self.indices.parents, &self.label_cycle)
            .label_of(node)
    }

    /// Reserve an identifier. Returns whether it was already taken.
    pub fn declare_id(&mut self, id: &str) -> bool {
        self.reserved.insert(id.to_string());
        self.indices.allocator.declare(id)
    }

    /// A fresh identifier, never equal to any declared or previously generated one.
    pub fn unique_id(&mut self, preferred: Option<&str>) -> String {
        let id = self.indices.allocator.allocate(preferred);
        self.reserved.insert(id.clone());
        id
    }

    pub fn dangling_refs(&self) -> Vec<DanglingRef> {
        self.indices
            .refs
            .iter()
            .filter(|(_, target)| self.resolve(target).is_none())
            .map(|(node, target)| DanglingRef {
                node: *node,
                target: target.clone(),
            })
            .collect()
    }

    pub fn summary(&self) -> AnnotationSummary {
        AnnotationSummary {
            toc: self.indices.toc.iter().cloned().collect(),
            targets: self.indices.xrefs.iter().cloned().collect(),
            dangling: self.dangling_refs(),
        }
    }
}
