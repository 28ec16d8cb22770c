//! Identifier allocation.
//!
//! [`IdAllocator`] hands out readable, collision-free identifiers. It works in two phases:
//! [`IdAllocator::declare`] only records a reservation in a pending set, and the pending set is
//! merged into the occurrence ledger at the start of every [`IdAllocator::allocate`] call. A
//! declared identifier therefore can never be generated later, regardless of how declarations
//! and allocations interleave.
//!
//! [`IdAssignments`] is the node-to-identifier table the annotation passes share: explicit `id`
//! attributes first, generated identifiers for refable nodes that lack one.

use std::collections::{BTreeSet, HashMap};

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    error::AnnotateError,
    schema::TagSchema,
    tree::{Document, NodeId},
    walk::walk,
};

/// Base used when no usable preferred name is given.
pub const DEFAULT_ID_BASE: &str = "id";

/// Normalize a name into an identifier-safe slug.
///
/// Diacritics are stripped, letters lowercased, whitespace and underscores become `-`, anything
/// else that isn't alphanumeric is dropped, and runs of `-` collapse.
pub fn to_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
        let mapped = if c.is_whitespace() || c == '_' || c == '-' {
            '-'
        } else if c.is_alphanumeric() {
            c
        } else {
            continue;
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.extend(mapped.to_lowercase());
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[derive(Debug, Clone)]
pub struct IdAllocator {
    /// Every taken identifier. For a base that has been disambiguated, the value is the last
    /// numeric suffix handed out for it.
    occurrences: HashMap<String, usize>,
    /// Declared but not yet merged into `occurrences`.
    pending: BTreeSet<String>,
    default_base: String,
}

impl Default for IdAllocator {
    fn default() -> Self {
        IdAllocator::with_default_base(DEFAULT_ID_BASE)
    }
}

impl IdAllocator {
    pub fn with_default_base(base: &str) -> Self {
        let slug = to_slug(base);
        IdAllocator {
            occurrences: HashMap::new(),
            pending: BTreeSet::new(),
            default_base: if slug.is_empty() {
                DEFAULT_ID_BASE.to_string()
            } else {
                slug
            },
        }
    }

    pub fn default_base(&self) -> &str {
        &self.default_base
    }

    /// Reserve `id`. Returns whether it was already taken, by an earlier declaration or by an
    /// earlier allocation.
    pub fn declare(&mut self, id: &str) -> bool {
        if self.is_taken(id) {
            return true;
        }
        self.pending.insert(id.to_string());
        false
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.occurrences.contains_key(id) || self.pending.contains(id)
    }

    /// Number of distinct identifiers taken so far, pending declarations included.
    pub fn len(&self) -> usize {
        self.occurrences.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce an identifier never issued or declared before.
    ///
    /// The slug of `preferred` is used when it is free; otherwise `-1`, `-2`, ... is appended,
    /// continuing from the last suffix used for that base.
    pub fn allocate(&mut self, preferred: Option<&str>) -> String {
        self.drain_pending();
        let base = preferred
            .map(to_slug)
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| self.default_base.clone());
        self.disambiguate(base)
    }

    fn drain_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::trace!(
            "[IdAllocator] merging {} declared identifiers into the ledger",
            self.pending.len()
        );
        for id in std::mem::take(&mut self.pending) {
            // Declarations are taken verbatim; `declare` already rejected duplicates.
            self.occurrences.entry(id).or_insert(0);
        }
    }

    fn disambiguate(&mut self, base: String) -> String {
        let Some(last) = self.occurrences.get(&base).copied() else {
            self.occurrences.insert(base.clone(), 0);
            return base;
        };
        let mut suffix = last;
        loop {
            suffix += 1;
            let candidate = format!("{base}-{suffix}");
            if !self.occurrences.contains_key(&candidate) {
                self.occurrences.insert(base, suffix);
                self.occurrences.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

/// Node identifiers, explicit or generated.
#[derive(Debug, Clone, Default)]
pub struct IdAssignments {
    by_node: HashMap<NodeId, String>,
    /// Owner of each identifier. With duplicate explicit ids the first node in document order
    /// keeps ownership.
    by_id: HashMap<String, NodeId>,
    generated: BTreeSet<NodeId>,
}

impl IdAssignments {
    /// Identify every node that can be referenced.
    ///
    /// Explicit `id` attributes are declared to `allocator` first, so generated identifiers
    /// (slugs of the title text, else of the tag) never shadow one written in the document.
    pub fn build(
        doc: &Document,
        schema: &TagSchema,
        allocator: &mut IdAllocator,
    ) -> Result<IdAssignments, AnnotateError> {
        let mut explicit = Vec::new();
        let mut missing = Vec::new();
        walk(doc, doc.root(), |node, _| {
            let Some(current) = doc.get(node) else {
                return;
            };
            if let Some(id) = current.explicit_id() {
                explicit.push((node, id));
            } else if schema.needs_id(&current.tag) {
                missing.push(node);
            }
        })?;

        let mut table = IdAssignments::default();
        for (node, id) in explicit {
            allocator.declare(id);
            if !table.insert_explicit(node, id) {
                tracing::warn!(
                    "[IdAssignments::build] duplicate id '{id}' on {node}, \
                     the first node in document order keeps it"
                );
            }
        }
        for node in missing {
            let title = doc.title_text(node);
            let preferred = if title.is_empty() {
                doc.tag(node)
            } else {
                Some(title.as_str())
            };
            let id = allocator.allocate(preferred);
            table.insert_generated(node, id);
        }
        tracing::debug!(
            "[IdAssignments::build] {} identified nodes ({} generated)",
            table.len(),
            table.generated.len()
        );
        Ok(table)
    }

    /// Record an explicit identifier. Returns `false` if another node already owns it.
    pub fn insert_explicit(&mut self, node: NodeId, id: &str) -> bool {
        self.by_node.insert(node, id.to_string());
        match self.by_id.get(id) {
            Some(owner) if *owner != node => false,
            _ => {
                self.by_id.insert(id.to_string(), node);
                true
            }
        }
    }

    pub fn insert_generated(&mut self, node: NodeId, id: String) {
        self.by_id.insert(id.clone(), node);
        self.by_node.insert(node, id);
        self.generated.insert(node);
    }

    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.by_node.get(&node).map(String::as_str)
    }

    pub fn owner_of(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// Whether `node` is the node an identifier resolves to.
    pub fn owns(&self, node: NodeId) -> bool {
        self.id_of(node)
            .and_then(|id| self.owner_of(id))
            .is_some_and(|owner| owner == node)
    }

    pub fn is_generated(&self, node: NodeId) -> bool {
        self.generated.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}
