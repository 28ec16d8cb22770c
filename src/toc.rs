//! Table of contents and division membership.
//!
//! [`Toc::build`] creates one [`TocItem`] per division (or other ToC-eligible node) in document
//! order. An item's ToC parent is its nearest ancestor that also has an item; its numbering path
//! is the parent's path plus its 1-based position among the parent's ToC children, and its level
//! is the parent's level plus one (0 at the top).
//!
//! [`DivisionMembership`] then maps every node to its nearest enclosing division node, inherited
//! from the node's parent in the [`ParentIndex`]. A division maps to itself. Membership is kept
//! by node rather than by identifier, so divisions sharing a duplicated `id` stay distinct.

use serde::Serialize;
use std::collections::HashMap;

use crate::{
    error::AnnotateError,
    ids::IdAssignments,
    parents::ParentIndex,
    schema::TagSchema,
    tree::{Document, NodeId},
    walk::walk,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocItem {
    pub id: String,
    pub node: NodeId,
    /// Tag of the node (chapter, section, appendix, ...).
    pub kind: String,
    /// One 1-based position per nesting level; `path.len() == level + 1`.
    pub path: Vec<u32>,
    pub level: usize,
    pub title: Vec<NodeId>,
    pub title_text: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl TocItem {
    /// Dot-joined numbering path, e.g. `"2.1.3"`.
    pub fn display_number(&self) -> String {
        self.path
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// 1-based sibling position. Node ids are `u32`, so any real sibling count fits.
fn position(n: usize, node: NodeId) -> Result<u32, AnnotateError> {
    u32::try_from(n).map_err(|_| {
        AnnotateError::MalformedTree(format!("ToC entry {node} has sibling position {n}"))
    })
}

/// Ordered forest of [`TocItem`]s.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Toc {
    items: Vec<TocItem>,
    #[serde(skip)]
    child_indices: Vec<Vec<usize>>,
    #[serde(skip)]
    roots: Vec<usize>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
    #[serde(skip)]
    by_node: HashMap<NodeId, usize>,
}

impl Toc {
    pub fn build(
        doc: &Document,
        schema: &TagSchema,
        ids: &IdAssignments,
    ) -> Result<Toc, AnnotateError> {
        let mut toc = Toc::default();
        let mut failure = None;
        walk(doc, doc.root(), |node, ancestors| {
            if failure.is_some() {
                return;
            }
            let Some(tag) = doc.tag(node) else {
                return;
            };
            if !schema.is_toc_eligible(tag) {
                return;
            }
            let Some(id) = ids.id_of(node) else {
                tracing::warn!("[Toc::build] {tag} node {node} has no identifier, skipping");
                return;
            };
            let parent = ancestors
                .iter()
                .find_map(|ancestor| toc.by_node.get(&ancestor).copied());
            let siblings = match parent {
                Some(p) => toc.child_indices[p].len(),
                None => toc.roots.len(),
            };
            let ordinal = match position(siblings + 1, node) {
                Ok(ordinal) => ordinal,
                Err(e) => {
                    failure = Some(e);
                    return;
                }
            };
            let (path, level, parent_id) = match parent {
                Some(p) => {
                    let parent_item = &toc.items[p];
                    let mut path = parent_item.path.clone();
                    path.push(ordinal);
                    (path, parent_item.level + 1, Some(parent_item.id.clone()))
                }
                None => (vec![ordinal], 0, None),
            };

            let idx = toc.items.len();
            toc.items.push(TocItem {
                id: id.to_string(),
                node,
                kind: tag.to_string(),
                path,
                level,
                title: doc.title_content(node),
                title_text: doc.title_text(node),
                parent: parent_id,
                children: Vec::new(),
            });
            toc.child_indices.push(Vec::new());
            match parent {
                Some(p) => {
                    toc.items[p].children.push(id.to_string());
                    toc.child_indices[p].push(idx);
                }
                None => toc.roots.push(idx),
            }
            toc.by_id.entry(id.to_string()).or_insert(idx);
            toc.by_node.insert(node, idx);
        })?;
        if let Some(e) = failure {
            return Err(e);
        }
        tracing::debug!(
            "[Toc::build] {} entries, {} top-level",
            toc.items.len(),
            toc.roots.len()
        );
        Ok(toc)
    }

    pub fn get(&self, id: &str) -> Option<&TocItem> {
        self.by_id.get(id).map(|idx| &self.items[*idx])
    }

    pub fn get_by_node(&self, node: NodeId) -> Option<&TocItem> {
        self.by_node.get(&node).map(|idx| &self.items[*idx])
    }

    pub fn roots(&self) -> impl Iterator<Item = &TocItem> {
        self.roots.iter().map(|idx| &self.items[*idx])
    }

    /// ToC children of the item for `id`, in document order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &TocItem> {
        self.by_id
            .get(id)
            .map(|idx| self.child_indices[*idx].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.items[*idx])
    }

    /// Every item in document order.
    pub fn iter(&self) -> impl Iterator<Item = &TocItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// node -> its nearest enclosing division node.
#[derive(Debug, Clone, Default)]
pub struct DivisionMembership {
    divisions: HashMap<NodeId, NodeId>,
}

impl DivisionMembership {
    pub fn build(
        doc: &Document,
        schema: &TagSchema,
        parents: &ParentIndex,
    ) -> Result<DivisionMembership, AnnotateError> {
        let is_division = |node: NodeId| doc.tag(node).is_some_and(|tag| schema.is_division(tag));
        let mut divisions = HashMap::new();
        // Pre-order visits parents first, so each node inherits its parent's nearest division.
        walk(doc, doc.root(), |node, _| {
            let division = if is_division(node) {
                Some(node)
            } else {
                parents
                    .parent_of(node)
                    .and_then(|parent| divisions.get(&parent).copied())
            };
            if let Some(division) = division {
                divisions.insert(node, division);
            }
        })?;
        tracing::debug!(
            "[DivisionMembership::build] {} nodes inside a division",
            divisions.len()
        );
        Ok(DivisionMembership { divisions })
    }

    pub fn division_node_of(&self, node: NodeId) -> Option<NodeId> {
        self.divisions.get(&node).copied()
    }

    /// Identifier of the nearest enclosing division.
    pub fn division_of<'a>(&self, node: NodeId, ids: &'a IdAssignments) -> Option<&'a str> {
        self.division_node_of(node)
            .and_then(|division| ids.id_of(division))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ids::IdAllocator,
        schema::{Capability, DEFAULT_SCHEMA},
        tree::DocumentBuilder,
    };
    use test_log::test;

    struct Fixture {
        doc: Document,
        ids: IdAssignments,
        parents: ParentIndex,
    }

    fn index(doc: Document, schema: &TagSchema) -> Fixture {
        let mut allocator = IdAllocator::default();
        let ids = IdAssignments::build(&doc, schema, &mut allocator).unwrap();
        let parents = ParentIndex::build(&doc).unwrap();
        Fixture { doc, ids, parents }
    }

    /// book > (chapter "Intro", chapter > (section, section > subsection, p), appendix)
    fn book() -> (Document, Vec<NodeId>) {
        let mut b = DocumentBuilder::new();
        let root = b.element("book");
        let c1 = b.child(root, "chapter", &[("id", "intro")]);
        b.title(c1, "Intro");
        let c2 = b.child(root, "chapter", &[]);
        b.title(c2, "Methods");
        let s1 = b.child(c2, "section", &[]);
        let s2 = b.child(c2, "section", &[]);
        let ss = b.child(s2, "subsection", &[]);
        let p = b.child(c2, "p", &[]);
        let app = b.child(root, "appendix", &[]);
        (b.build(root), vec![c1, c2, s1, s2, ss, p, app])
    }

    #[test]
    fn test_toc_paths_and_levels() {
        let (doc, nodes) = book();
        let f = index(doc, &DEFAULT_SCHEMA);
        let toc = Toc::build(&f.doc, &DEFAULT_SCHEMA, &f.ids).unwrap();

        assert_eq!(toc.len(), 6);
        let paths: Vec<_> = toc.iter().map(|item| item.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec![1],
                vec![2],
                vec![2, 1],
                vec![2, 2],
                vec![2, 2, 1],
                vec![3]
            ]
        );
        for item in toc.iter() {
            assert_eq!(item.path.len(), item.level + 1);
        }

        let intro = toc.get("intro").unwrap();
        assert_eq!(intro.node, nodes[0]);
        assert_eq!(intro.title_text, "Intro");
        assert_eq!(intro.title.len(), 1);

        let methods = toc.get_by_node(nodes[1]).unwrap();
        assert_eq!(methods.id, "methods");
        assert_eq!(methods.children.len(), 2);
        let sub = toc.get_by_node(nodes[4]).unwrap();
        assert_eq!(sub.display_number(), "2.2.1");
        assert_eq!(sub.parent.as_deref(), toc.get_by_node(nodes[3]).map(|i| i.id.as_str()));
        assert_eq!(sub.kind, "subsection");

        assert_eq!(toc.roots().count(), 3);
        assert!(toc.get_by_node(nodes[5]).is_none());
    }

    #[test]
    fn test_sibling_numbering_is_contiguous() {
        let (doc, _) = book();
        let f = index(doc, &DEFAULT_SCHEMA);
        let toc = Toc::build(&f.doc, &DEFAULT_SCHEMA, &f.ids).unwrap();
        for item in toc.iter() {
            let lasts: Vec<u32> = toc
                .children(&item.id)
                .map(|child| *child.path.last().unwrap())
                .collect();
            let expected: Vec<u32> = (1..=lasts.len() as u32).collect();
            assert_eq!(lasts, expected);
        }
        let tops: Vec<u32> = toc.roots().map(|item| item.path[0]).collect();
        assert_eq!(tops, vec![1, 2, 3]);
    }

    #[test]
    fn test_toc_skips_non_eligible_intermediate_nodes() {
        // chapter > div > section: section is still the chapter's first ToC child
        let mut b = DocumentBuilder::new();
        let root = b.element("book");
        let chapter = b.child(root, "chapter", &[]);
        let wrapper = b.child(chapter, "div", &[]);
        let section = b.child(wrapper, "section", &[]);
        let f = index(b.build(root), &DEFAULT_SCHEMA);
        let toc = Toc::build(&f.doc, &DEFAULT_SCHEMA, &f.ids).unwrap();
        let item = toc.get_by_node(section).unwrap();
        assert_eq!(item.path, vec![1, 1]);
        assert_eq!(item.level, 1);
        assert_eq!(
            item.parent.as_deref(),
            toc.get_by_node(chapter).map(|i| i.id.as_str())
        );
    }

    #[test]
    fn test_toc_eligible_non_division() {
        let mut schema = TagSchema::builtin();
        schema.register("exercises", Capability::TocEligible.into());
        let mut b = DocumentBuilder::new();
        let root = b.element("book");
        let chapter = b.child(root, "chapter", &[]);
        let exercises = b.child(chapter, "exercises", &[]);
        let f = index(b.build(root), &schema);
        let toc = Toc::build(&f.doc, &schema, &f.ids).unwrap();
        assert_eq!(toc.get_by_node(exercises).unwrap().path, vec![1, 1]);

        let membership =
            DivisionMembership::build(&f.doc, &schema, &f.parents).unwrap();
        assert_eq!(membership.division_node_of(exercises), Some(chapter));
        assert_eq!(membership.division_of(exercises, &f.ids), f.ids.id_of(chapter));
    }

    #[test]
    fn test_division_membership() {
        let (doc, nodes) = book();
        let f = index(doc, &DEFAULT_SCHEMA);
        let membership =
            DivisionMembership::build(&f.doc, &DEFAULT_SCHEMA, &f.parents).unwrap();

        assert_eq!(membership.division_of(nodes[0], &f.ids), Some("intro"));
        assert_eq!(membership.division_node_of(nodes[5]), Some(nodes[1]));
        assert_eq!(membership.division_node_of(nodes[4]), Some(nodes[4]));
        assert_eq!(membership.division_node_of(f.doc.root()), None);
        // The chapter's title text leaf belongs to the chapter.
        let title = f.doc.title_of(nodes[0]).unwrap();
        assert_eq!(membership.division_of(title, &f.ids), Some("intro"));
    }

    #[test]
    fn test_duplicate_division_ids_stay_distinct() {
        let mut b = DocumentBuilder::new();
        let root = b.element("book");
        let c1 = b.child(root, "chapter", &[("id", "same")]);
        let d1 = b.child(c1, "definition", &[]);
        let c2 = b.child(root, "chapter", &[("id", "same")]);
        let d2 = b.child(c2, "definition", &[]);
        let f = index(b.build(root), &DEFAULT_SCHEMA);
        let toc = Toc::build(&f.doc, &DEFAULT_SCHEMA, &f.ids).unwrap();
        let membership = DivisionMembership::build(&f.doc, &DEFAULT_SCHEMA, &f.parents).unwrap();

        assert_eq!(membership.division_node_of(d1), Some(c1));
        assert_eq!(membership.division_node_of(d2), Some(c2));
        assert_eq!(membership.division_of(d2, &f.ids), Some("same"));
        assert_eq!(toc.get_by_node(c2).unwrap().path, vec![2]);
        assert_eq!(toc.get("same").unwrap().node, c1);
    }

    #[test]
    fn test_positions_past_u16_stay_contiguous() {
        let count = u16::MAX as usize + 2;
        let mut b = DocumentBuilder::new();
        let root = b.element("book");
        let chapter = b.child(root, "chapter", &[("id", "big")]);
        let mut last = chapter;
        for _ in 0..count {
            last = b.child(chapter, "section", &[]);
        }
        let f = index(b.build(root), &DEFAULT_SCHEMA);
        let toc = Toc::build(&f.doc, &DEFAULT_SCHEMA, &f.ids).unwrap();

        let item = toc.get_by_node(last).unwrap();
        assert_eq!(item.path, vec![1, count as u32]);
        assert_eq!(item.display_number(), format!("1.{count}"));
        let lasts: Vec<u32> = toc
            .children("big")
            .map(|child| *child.path.last().unwrap())
            .collect();
        assert_eq!(lasts, (1..=count as u32).collect::<Vec<_>>());
    }
}
