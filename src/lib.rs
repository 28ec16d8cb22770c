//! # doc-annotator
//!
//! Derived, queryable structure for parsed documents.
//!
//! Given a document tree (chapters, sections, definitions, cross-references, list items) built by
//! some external parser, doc-annotator runs a fixed sequence of passes and exposes the results as
//! lookup tables a renderer can consume:
//!
//! - a **parent index** (node -> parent)
//! - **identifiers** for every referenceable node, explicit or generated
//! - **block numbers** for theorem-like blocks, restarting at each division
//! - a **table of contents** with hierarchical numbering paths (`[2, 1, 3]`)
//! - **division membership** (node -> nearest enclosing division)
//! - **cross-reference targets** (identifier -> title and display number)
//! - **list-item labels** cycling through label styles by nesting depth
//!
//! Rendering, markup parsing and schema validation are out of scope.
//!
//! ## Architecture
//!
//! - **[`tree`]**: Arena document (`Document`, `NodeId`, `DocumentBuilder`, serde form `DocNode`)
//! - **[`walk`]**: Explicit-stack pre-order traversal with ancestor chains
//! - **[`ids`]**: Slugs, the two-phase `IdAllocator`, node identifier assignment
//! - **[`schema`]**: Tag capabilities (`TagSchema`, `Capability`) and display names
//! - **[`parents`]**, **[`numbering`]**, **[`toc`]**, **[`xref`]**, **[`lists`]**: The passes
//! - **[`state`]**: `AnnotationState`, the façade owning the tree and all indices
//! - **[`config`]**: TOML configuration
//!
//! Every index is a side table keyed by `NodeId`; the tree itself is never modified.
//!
//! ## Quick Start
//!
//! ```rust
//! use doc_annotator::{state::AnnotationState, tree::DocumentBuilder};
//!
//! let mut builder = DocumentBuilder::new();
//! let book = builder.element("book");
//! let chapter = builder.child(book, "chapter", &[("id", "c1")]);
//! builder.title(chapter, "Groups");
//! let definition = builder.child(chapter, "definition", &[]);
//! let xref = builder.child(book, "xref", &[("ref", "c1")]);
//!
//! let mut state = AnnotationState::default();
//! state.set_root(builder.build(book))?;
//!
//! let target = state.ref_target_info(xref).unwrap();
//! assert_eq!(target.number.as_deref(), Some("1"));
//! assert_eq!(target.title_text, "Groups");
//!
//! let info = state.block_info(definition).unwrap();
//! assert_eq!(info.display_name, "Definition");
//! assert_eq!(info.display_number.as_deref(), Some("1.1"));
//! # Ok::<(), doc_annotator::AnnotateError>(())
//! ```
//!
//! ## Errors
//!
//! Structural incompleteness (dangling references, nodes outside any division, untitled nodes)
//! is normal and shows up as `None` from queries. The only failure is a malformed tree (cycle,
//! shared child, child id outside the arena), reported by
//! [`state::AnnotationState::set_root`] as [`AnnotateError::MalformedTree`].

pub mod config;
pub mod error;
pub mod ids;
pub mod lists;
pub mod numbering;
pub mod parents;
pub mod schema;
pub mod state;
#[cfg(test)]
mod tests;
pub mod toc;
pub mod tree;
pub mod walk;
pub mod xref;

pub use error::*;
