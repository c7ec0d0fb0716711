//! Integration tests for generated content: counters, markers, footnotes,
//! cross-references and named strings.
//!
//! [CSS Generated Content Level 3](https://www.w3.org/TR/css-content-3/)
//! [CSS Lists Level 3](https://www.w3.org/TR/css-lists-3/)
//! [CSS GCPM](https://www.w3.org/TR/css-gcpm-3/)

mod common;

use common::{block_line, body, body_children, build, build_with, page, parent, text};
use koala_boxes::{BoxKind, LayoutBox, serialize_box};
use koala_common::net::InMemoryFetcher;
use koala_common::warning::take_warnings;
use serde_json::{Value, json};

/// `Inline tag::pseudo[Text tag::pseudo "content"]`
fn pseudo(tag: &str, pseudo: &str, content: &str) -> Value {
    let tag = format!("{tag}::{pseudo}");
    parent(&tag, "Inline", vec![text(&tag, content)])
}

/// A block whose only line holds an inside marker.
fn marked(tag: &str, marker: &str) -> Value {
    block_line(tag, vec![pseudo(tag, "marker", marker)])
}

// ---------------------------------------------------------------------------
// Counters
//
// [§ 4 Automatic Numbering With Counters](https://www.w3.org/TR/css-lists-3/#auto-numbering)
// ---------------------------------------------------------------------------

#[test]
fn test_counter_reset_and_increment() {
    let paragraphs: Vec<Value> = (1..=12)
        .map(|n| {
            let mut style = json!({"counter-increment": match n {
                1 => "none",
                2 => "p",
                _ => "p 2",
            }});
            match n {
                4 => style["counter-reset"] = json!("p 117 p"),
                7 => style["counter-reset"] = json!("p -13"),
                10 => style["counter-reset"] = json!("p 42"),
                _ => {}
            }
            json!({"tag": "p", "style": style, "before": {"content": "counter(p)"}})
        })
        .collect();
    let structure = build(page(Value::Array(paragraphs)));
    let expected: Vec<Value> = ["0", "1", "3", "2", "4", "6", "-11", "-9", "-7", "44", "46", "48"]
        .iter()
        .map(|value| block_line("p", vec![pseudo("p", "before", value)]))
        .collect();
    assert_eq!(body_children(&structure), Value::Array(expected));
}

#[test]
fn test_nested_lists_count_separately() {
    let li = || json!({"tag": "li"});
    let structure = build(page(json!([
        {"tag": "ol", "style": {"list-style-position": "inside"}, "children": [
            li(),
            li(),
            li(),
            {"tag": "li", "children": [
                {"tag": "ol", "children": [
                    li(),
                    {"tag": "li", "style": {"counter-increment": "none"}},
                    li()
                ]}
            ]},
            li()
        ]}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([parent(
            "ol",
            "Block",
            vec![
                marked("li", "1. "),
                marked("li", "2. "),
                marked("li", "3. "),
                parent(
                    "li",
                    "Block",
                    vec![
                        marked("li", "4. "),
                        parent(
                            "ol",
                            "Block",
                            vec![marked("li", "1. "), marked("li", "1. "), marked("li", "2. ")]
                        ),
                    ]
                ),
                marked("li", "5. "),
            ]
        )])
    );
}

#[test]
fn test_list_item_counter_scopes() {
    let item = |style: Value| {
        let mut item_style = json!({"display": "list-item", "list-style": "inside decimal"});
        if let (Some(item_style), Value::Object(extra)) = (item_style.as_object_mut(), style) {
            item_style.extend(extra);
        }
        json!({"tag": "p", "style": item_style})
    };
    let structure = build(page(json!([
        {"tag": "div", "children": [
            item(json!({})),
            item(json!({})),
            item(json!({"counter-reset": "list-item 7 list-item -56"}))
        ]},
        item(json!({}))
    ])));
    assert_eq!(
        body_children(&structure),
        json!([
            parent(
                "div",
                "Block",
                vec![marked("p", "1. "), marked("p", "2. "), marked("p", "-55. ")]
            ),
            marked("p", "1. "),
        ])
    );
}

#[test]
fn test_counters_of_nested_scopes() {
    let section = |children: Value| {
        json!({
            "tag": "div",
            "style": {"counter-reset": "s", "counter-increment": "s"},
            "before": {"content": "counters(s, '.')"},
            "children": children,
        })
    };
    let structure = build(page(json!([section(json!([section(json!([])), section(json!([]))]))])));
    let outer = &body(&structure).children[0];
    // The first child holds the `::before` box.
    let before_text = |layout_box: &LayoutBox| {
        layout_box.children[0]
            .descendants()
            .find(|child| child.kind == BoxKind::Text)
            .map(|child| child.text.clone())
    };
    assert_eq!(before_text(outer).as_deref(), Some("1"));
    assert_eq!(before_text(&outer.children[1]).as_deref(), Some("1.1"));
    assert_eq!(before_text(&outer.children[2]).as_deref(), Some("1.1"));
}

#[test]
fn test_outside_marker_is_an_absolute_block() {
    let structure = build(page(json!([{"tag": "ul", "children": [{"tag": "li", "children": ["a"]}]}])));
    let li = &body(&structure).children[0].children[0];
    let marker = &li.children[0];
    assert_eq!(marker.kind, BoxKind::Block);
    assert_eq!(marker.element_tag, "li::marker");
    assert!(marker.is_absolutely_positioned());
    assert_eq!(
        serde_json::to_value(serialize_box(li)).unwrap(),
        json!(parent(
            "li",
            "Block",
            vec![
                block_line("li::marker", vec![text("li::marker", "• ")]),
                block_line("li", vec![text("li", "a")]),
            ]
        ))
    );
}

#[test]
fn test_relative_content_images_without_base_url() {
    const SVG: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"></svg>"#;
    let _ = take_warnings();
    let fetcher = InMemoryFetcher::new()
        .with_resource("logo.svg", SVG)
        .with_resource("bullet.svg", SVG);
    let structure = build_with(
        page(json!([
            {"tag": "p", "before": {"content": "url(logo.svg)"}},
            {"tag": "ul", "children": [
                {"tag": "li", "style": {"list-style-image": "url(bullet.svg)"}, "children": ["a"]}
            ]}
        ])),
        &fetcher,
    );

    // Both images are still fetched, with their URLs as written.
    let images: Vec<&str> = body(&structure)
        .descendants()
        .filter_map(|layout_box| layout_box.replacement.as_ref())
        .map(|image| image.url())
        .collect();
    assert_eq!(images, ["logo.svg", "bullet.svg"]);

    let warnings = take_warnings();
    for url in ["logo.svg", "bullet.svg"] {
        let expected = format!("Relative URI reference without a base URI: \"{url}\"");
        assert!(
            warnings.iter().any(|warning| warning.contains(&expected)),
            "missing warning for {url}: {warnings:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Footnotes
//
// [§ 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
// ---------------------------------------------------------------------------

#[test]
fn test_footnote_leaves_a_call_behind() {
    let structure = build(page(json!([
        {"tag": "p", "children": [
            "Text",
            {"tag": "span", "style": {"float": "footnote"}, "children": ["Note"]},
            " more"
        ]}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([block_line(
            "p",
            vec![
                text("p", "Text"),
                pseudo("span", "footnote-call", "1"),
                text("p", " more"),
            ]
        )])
    );

    let [footnote] = structure.footnotes.as_slice() else {
        panic!("expected one footnote, got {}", structure.footnotes.len());
    };
    assert_eq!(
        serde_json::to_value(serialize_box(footnote)).unwrap(),
        block_line(
            "span",
            vec![pseudo("span", "footnote-marker", "1. "), text("span", "Note")]
        )
    );

    let call = &body(&structure).children[0].children[0].children[1];
    assert_eq!(call.footnote, Some(footnote.id));
}

#[test]
fn test_footnotes_are_numbered_in_order() {
    let note = |content: &str| json!({"tag": "span", "style": {"float": "footnote"}, "children": [content]});
    let structure = build(page(json!([{"tag": "p", "children": [note("a"), note("b")]}])));
    assert_eq!(structure.footnotes.len(), 2);
    assert_eq!(
        body_children(&structure),
        json!([block_line(
            "p",
            vec![
                pseudo("span", "footnote-call", "1"),
                pseudo("span", "footnote-call", "2"),
            ]
        )])
    );
}

// ---------------------------------------------------------------------------
// Cross-references and named strings
//
// [§ 5 Cross references](https://www.w3.org/TR/css-gcpm-3/#cross-references)
// ---------------------------------------------------------------------------

#[test]
fn test_target_counter_forward_reference() {
    let structure = build(page(json!([
        {"tag": "p", "before": {"content": "'see ' target-counter(url(#sec), h)"}},
        {"tag": "h2", "attrs": {"id": "sec"}, "style": {"counter-increment": "h 3"}, "children": ["Title"]}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([
            block_line("p", vec![pseudo("p", "before", "see 3")]),
            block_line("h2", vec![text("h2", "Title")]),
        ])
    );
}

#[test]
fn test_target_text_backward_reference() {
    let structure = build(page(json!([
        {"tag": "h2", "attrs": {"id": "intro"}, "children": ["Introduction"]},
        {"tag": "p", "before": {"content": "target-text(url(#intro))"}}
    ])));
    assert_eq!(
        body_children(&structure),
        json!([
            block_line("h2", vec![text("h2", "Introduction")]),
            block_line("p", vec![pseudo("p", "before", "Introduction")]),
        ])
    );
}

#[test]
fn test_string_set_and_bookmark_label() {
    let structure = build(page(json!([
        {
            "tag": "h1",
            "style": {"string-set": "title content(text)", "bookmark-level": "1"},
            "children": ["  Chapter  One "]
        },
        {"tag": "p", "children": ["body"]}
    ])));
    let body = body(&structure);
    let heading = &body.children[0];
    assert_eq!(heading.string_set, [("title".to_string(), "Chapter One".to_string())]);
    assert_eq!(heading.bookmark_label, "Chapter One");
    let paragraph = &body.children[1];
    assert!(paragraph.string_set.is_empty());
    assert!(paragraph.bookmark_label.is_empty());
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_serialized_shape() {
    let structure = build(page(json!([{"tag": "p", "before": {"content": "'» '"}, "children": ["hi"]}])));
    assert_eq!(
        serde_json::to_value(serialize_box(&structure.root)).unwrap(),
        json!({
            "tag": "html",
            "kind": "Block",
            "children": [{
                "tag": "body",
                "kind": "Block",
                "children": [{
                    "tag": "p",
                    "kind": "Block",
                    "children": [{
                        "tag": "p",
                        "kind": "Line",
                        "children": [
                            {
                                "tag": "p::before",
                                "kind": "Inline",
                                "children": [{"tag": "p::before", "kind": "Text", "text": "» "}],
                            },
                            {"tag": "p", "kind": "Text", "text": "hi"},
                        ],
                    }],
                }],
            }],
        })
    );
}
