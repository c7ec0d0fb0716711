//! Helpers shared by the box tree integration tests.
#![allow(dead_code)]

use koala_boxes::{
    BoxKind, BuildOptions, FormattingStructure, LayoutBox, build_document, check_structure,
    serialize,
};
use koala_common::net::InMemoryFetcher;
use koala_css::StyledDocument;
use serde_json::{Value, json};

/// Build a JSON document with no resources and check its structure.
pub fn build(document: Value) -> FormattingStructure {
    build_with(document, &InMemoryFetcher::new())
}

/// Build a JSON document with the given resources and check its structure.
pub fn build_with(document: Value, fetcher: &InMemoryFetcher) -> FormattingStructure {
    let document = StyledDocument::from_value(document).expect("valid document");
    let structure =
        build_document(&document, fetcher, &BuildOptions::default()).expect("build succeeds");
    check_structure(&structure.root).expect("well-formed box tree");
    structure
}

/// `<html><body>children</body></html>`
pub fn page(children: Value) -> Value {
    json!({"root": {"tag": "html", "children": [{"tag": "body", "children": children}]}})
}

/// The body box, under the root.
pub fn body(structure: &FormattingStructure) -> &LayoutBox {
    let html = &structure.root;
    assert_eq!(html.element_tag, "html");
    assert_eq!(html.kind, BoxKind::Block);
    assert_eq!(html.children.len(), 1);
    let body = &html.children[0];
    assert_eq!(body.element_tag, "body");
    assert_eq!(body.kind, BoxKind::Block);
    body
}

/// The serialized children of the body box.
pub fn body_children(structure: &FormattingStructure) -> Value {
    serde_json::to_value(serialize(&body(structure).children)).expect("serializable")
}

/// The table box of the first table wrapper in the body.
pub fn first_table(structure: &FormattingStructure) -> &LayoutBox {
    let wrapper = &body(structure).children[0];
    assert!(wrapper.is_table_wrapper);
    wrapper
        .children
        .iter()
        .find(|child| child.kind.is_table())
        .expect("table in wrapper")
}

/// A serialized text box.
pub fn text(tag: &str, text: &str) -> Value {
    json!({"tag": tag, "kind": "Text", "text": text})
}

/// A serialized box with children.
pub fn parent(tag: &str, kind: &str, children: Vec<Value>) -> Value {
    json!({"tag": tag, "kind": kind, "children": children})
}

/// A block holding a single line: `Block[Line[children]]`.
pub fn block_line(tag: &str, children: Vec<Value>) -> Value {
    parent(tag, "Block", vec![parent(tag, "Line", children)])
}
