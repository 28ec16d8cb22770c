//! Depth-first document traversal.
//!
//! [`walk`] visits nodes in document pre-order using an explicit stack, so arbitrarily deep
//! documents cannot overflow the native stack. Each call starts from scratch; there is no shared
//! cursor. The walk also validates structure: a node reached twice (a cycle or a child shared
//! between two parents) or a child id outside the arena aborts with
//! [`AnnotateError::MalformedTree`], because every pass built on top of it assumes an acyclic,
//! single-rooted tree.

use crate::{
    error::AnnotateError,
    tree::{Document, Node, NodeId},
};

/// The ancestor chain of the node being visited.
///
/// Stored root-first; [`Ancestors::iter`] yields nearest-first.
#[derive(Debug, Clone, Copy)]
pub struct Ancestors<'a> {
    chain: &'a [NodeId],
}

impl<'a> Ancestors<'a> {
    pub fn parent(&self) -> Option<NodeId> {
        self.chain.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.chain.iter().rev().copied()
    }

    /// Number of ancestors, i.e. the depth of the visited node (root = 0).
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

enum Step {
    Enter(NodeId),
    Exit,
}

/// Visit every node reachable from `root`.
pub fn walk<F>(doc: &Document, root: NodeId, visit: F) -> Result<(), AnnotateError>
where
    F: FnMut(NodeId, Ancestors<'_>),
{
    walk_filtered(doc, root, |_| true, visit)
}

/// Visit every node reachable from `root` for which `filter` holds.
///
/// Filtered-out nodes are still descended into and still appear in their descendants' ancestor
/// chains.
pub fn walk_filtered<P, F>(
    doc: &Document,
    root: NodeId,
    mut filter: P,
    mut visit: F,
) -> Result<(), AnnotateError>
where
    P: FnMut(&Node) -> bool,
    F: FnMut(NodeId, Ancestors<'_>),
{
    if !doc.contains(root) {
        return Err(AnnotateError::MalformedTree(format!(
            "root {root} is not in the document arena"
        )));
    }
    let mut visited = vec![false; doc.len()];
    let mut path: Vec<NodeId> = Vec::new();
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Exit => {
                path.pop();
                continue;
            }
            Step::Enter(id) => id,
        };
        let Some(node) = doc.get(id) else {
            let parent = path.last().copied().unwrap_or(root);
            return Err(AnnotateError::dangling_child(parent, id));
        };
        if std::mem::replace(&mut visited[id.index()], true) {
            return Err(AnnotateError::revisited(id));
        }
        if filter(node) {
            visit(id, Ancestors { chain: &path });
        }
        path.push(id);
        stack.push(Step::Exit);
        stack.extend(node.children.iter().rev().map(|child| Step::Enter(*child)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DocumentBuilder;
    use test_log::test;

    fn sample() -> (Document, Vec<NodeId>) {
        // root > (a > (b, c), d)
        let mut builder = DocumentBuilder::new();
        let root = builder.element("root");
        let a = builder.child(root, "a", &[]);
        let b = builder.child(a, "b", &[]);
        let c = builder.child(a, "c", &[]);
        let d = builder.child(root, "d", &[]);
        (builder.build(root), vec![root, a, b, c, d])
    }

    #[test]
    fn test_walk_is_preorder_with_nearest_first_ancestors() {
        let (doc, ids) = sample();
        let mut seen = Vec::new();
        walk(&doc, doc.root(), |id, ancestors| {
            seen.push((id, ancestors.iter().collect::<Vec<_>>()));
        })
        .unwrap();

        let order: Vec<_> = seen.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, ids);
        // c's ancestors: a then root
        assert_eq!(seen[3].1, vec![ids[1], ids[0]]);
        assert!(seen[0].1.is_empty());
    }

    #[test]
    fn test_walk_is_restartable() {
        let (doc, _) = sample();
        let mut first = 0;
        let mut second = 0;
        walk(&doc, doc.root(), |_, _| first += 1).unwrap();
        walk(&doc, doc.root(), |_, _| second += 1).unwrap();
        assert_eq!(first, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_keeps_ancestor_chain() {
        let (doc, ids) = sample();
        let mut visited = Vec::new();
        walk_filtered(
            &doc,
            doc.root(),
            |node| node.tag == "b",
            |id, ancestors| visited.push((id, ancestors.parent(), ancestors.len())),
        )
        .unwrap();
        assert_eq!(visited, vec![(ids[2], Some(ids[1]), 2)]);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut builder = DocumentBuilder::new();
        let root = builder.element("root");
        let mut current = root;
        for _ in 0..100_000 {
            current = builder.child(current, "div", &[]);
        }
        let doc = builder.build(root);
        let mut max_depth = 0;
        walk(&doc, doc.root(), |_, ancestors| {
            max_depth = max_depth.max(ancestors.len())
        })
        .unwrap();
        assert_eq!(max_depth, 100_000);
    }

    #[test]
    fn test_cycle_is_fatal() {
        let mut builder = DocumentBuilder::new();
        let root = builder.element("root");
        let a = builder.child(root, "a", &[]);
        builder.append(a, root);
        let doc = builder.build(root);
        let err = walk(&doc, doc.root(), |_, _| {}).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_shared_child_is_fatal() {
        let mut builder = DocumentBuilder::new();
        let root = builder.element("root");
        let a = builder.child(root, "a", &[]);
        let b = builder.child(root, "b", &[]);
        let shared = builder.child(a, "shared", &[]);
        builder.append(b, shared);
        let doc = builder.build(root);
        assert_eq!(
            walk(&doc, doc.root(), |_, _| {}),
            Err(AnnotateError::revisited(shared))
        );
    }

    #[test]
    fn test_dangling_child_is_fatal() {
        let mut builder = DocumentBuilder::new();
        let root = builder.element("root");
        builder.append(root, NodeId(42));
        let doc = builder.build(root);
        assert_eq!(
            walk(&doc, doc.root(), |_, _| {}),
            Err(AnnotateError::dangling_child(root, NodeId(42)))
        );
    }
}
