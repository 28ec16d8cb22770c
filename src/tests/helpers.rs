//! Shared test utilities for annotation-state testing

use crate::{
    state::AnnotationState,
    tree::{Document, DocumentBuilder, NodeId},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Handles into [`create_test_book`].
pub struct TestBook {
    pub doc: Document,
    pub chapter: NodeId,
    pub definition: NodeId,
    pub theorem: NodeId,
    pub section: NodeId,
    pub inner_definition: NodeId,
    pub xref: NodeId,
    pub broken_xref: NodeId,
    pub preface_para: NodeId,
}

/// root > (p, chapter#c1 "Groups" > (definition, theorem, section#s1 > definition), xref, xref)
pub fn create_test_book() -> TestBook {
    init_logging();

    let mut b = DocumentBuilder::new();
    let root = b.element("root");
    let preface_para = b.child(root, "p", &[]);
    let chapter = b.child(root, "chapter", &[("id", "c1")]);
    b.title(chapter, "Groups");
    let definition = b.child(chapter, "definition", &[]);
    let theorem = b.child(chapter, "theorem", &[]);
    let section = b.child(chapter, "section", &[("id", "s1")]);
    b.title(section, "Subgroups");
    let inner_definition = b.child(section, "definition", &[]);
    let xref = b.child(root, "xref", &[("ref", "c1")]);
    let broken_xref = b.child(root, "xref", &[("ref", "nowhere")]);

    TestBook {
        doc: b.build(root),
        chapter,
        definition,
        theorem,
        section,
        inner_definition,
        xref,
        broken_xref,
        preface_para,
    }
}

/// A default-schema state with the test book installed.
pub fn create_test_state() -> (AnnotationState, TestBook) {
    let book = create_test_book();
    let mut state = AnnotationState::default();
    state
        .set_root(book.doc.clone())
        .expect("test book is well formed");
    (state, book)
}
