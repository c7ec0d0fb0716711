//! HTML elements whose boxes need special care.
//!
//! [§ 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! Replaced elements become replaced boxes, or fall back to their alternate
//! content. Table columns get one box per spanned column.

use std::fmt::Write as _;
use std::rc::Rc;

use koala_common::image::Image;
use koala_common::url::resolve_url;
use koala_common::warning::warn_once;
use koala_dom::{DomTree, ElementData, NodeId};

use crate::box_kind::BoxKind;
use crate::content::{ContentContext, load_image};
use crate::layout_box::LayoutBox;

/// Apply the handler of the element's tag, if any.
///
/// Returns the boxes that replace `layout_box`: usually the box itself,
/// sometimes nothing or several boxes.
pub(crate) fn handle_element(
    context: &ContentContext<'_>,
    dom: &DomTree,
    node: NodeId,
    layout_box: LayoutBox,
) -> Vec<LayoutBox> {
    let Some(element) = dom.as_element(node) else {
        return vec![layout_box];
    };
    match element.tag_name.to_ascii_lowercase().as_str() {
        "img" => handle_img(context, element, layout_box),
        "embed" => handle_embed(context, element, &layout_box),
        "object" => handle_object(context, element, layout_box),
        "colgroup" => handle_colgroup(dom, node, element, layout_box),
        "col" => handle_col(element, layout_box),
        "svg" => handle_svg(dom, node, &layout_box),
        _ => vec![layout_box],
    }
}

/// [§ 2.5.1 Terminology](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// The absolute URL in an attribute. Relative references need a base.
fn url_attribute(element: &ElementData, name: &str, base_url: Option<&str>) -> Option<String> {
    let value = element.attribute(name)?.trim();
    if value.is_empty() {
        return None;
    }
    resolve_url(value, base_url)
        .map_err(|error| warn_once("BOXES", &error.to_string()))
        .ok()
}

/// The `type` attribute, used as a MIME type hint.
fn type_attribute(element: &ElementData) -> Option<&str> {
    element
        .attribute("type")
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
}

/// Wrap an image in a replaced box, block-level or inline-level as the
/// element's display says.
///
/// The replaced box takes over the element box's identity, named strings
/// and bookmark label.
fn make_replaced_box(layout_box: &LayoutBox, image: Rc<Image>) -> LayoutBox {
    let mut replaced = layout_box.copy_with_children(Vec::new());
    replaced.kind = if layout_box.style.display().is_block_outside() {
        BoxKind::BlockReplaced
    } else {
        BoxKind::InlineReplaced
    };
    replaced.replacement = Some(image);
    replaced
}

/// The element box showing its `alt` text, or nothing.
fn alt_text(element: &ElementData, mut layout_box: LayoutBox) -> Vec<LayoutBox> {
    match element.attribute("alt").filter(|alt| !alt.is_empty()) {
        Some(alt) => match LayoutBox::text_from(&layout_box, alt.to_string()) {
            Ok(text) => {
                layout_box.children = vec![text];
                vec![layout_box]
            }
            Err(_) => Vec::new(),
        },
        // The element represents nothing.
        None => Vec::new(),
    }
}

/// [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
///
/// The image, else the alt text.
fn handle_img(context: &ContentContext<'_>, element: &ElementData, layout_box: LayoutBox) -> Vec<LayoutBox> {
    if let Some(src) = url_attribute(element, "src", context.base_url)
        && let Some(image) = load_image(context, &src, None, layout_box.style.image_orientation())
    {
        return vec![make_replaced_box(&layout_box, image)];
    }
    alt_text(element, layout_box)
}

/// [§ 4.8.6 The embed element](https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-embed-element)
///
/// The image, without fallback.
fn handle_embed(context: &ContentContext<'_>, element: &ElementData, layout_box: &LayoutBox) -> Vec<LayoutBox> {
    url_attribute(element, "src", context.base_url)
        .and_then(|src| {
            load_image(
                context,
                &src,
                type_attribute(element),
                layout_box.style.image_orientation(),
            )
        })
        .map(|image| make_replaced_box(layout_box, image))
        .into_iter()
        .collect()
}

/// [§ 4.8.7 The object element](https://html.spec.whatwg.org/multipage/iframe-embed-object.html#the-object-element)
///
/// The image, else the element's children as fallback content.
fn handle_object(context: &ContentContext<'_>, element: &ElementData, layout_box: LayoutBox) -> Vec<LayoutBox> {
    let image = url_attribute(element, "data", context.base_url).and_then(|data| {
        load_image(
            context,
            &data,
            type_attribute(element),
            layout_box.style.image_orientation(),
        )
    });
    match image {
        Some(image) => vec![make_replaced_box(&layout_box, image)],
        None => vec![layout_box],
    }
}

/// The `span` attribute of `col` and `colgroup`, at least 1.
fn span_attribute(element: &ElementData) -> usize {
    usize::try_from(element.integer_attribute("span", 1)).unwrap_or(1)
}

/// [§ 4.9.3 The colgroup element](https://html.spec.whatwg.org/multipage/tables.html#the-colgroup-element)
///
/// "If the colgroup element contains no col elements, then the element
/// may have a span content attribute specified". It then spans that many
/// anonymous columns.
fn handle_colgroup(
    dom: &DomTree,
    node: NodeId,
    element: &ElementData,
    mut layout_box: LayoutBox,
) -> Vec<LayoutBox> {
    if layout_box.kind != BoxKind::TableColumnGroup {
        return vec![layout_box];
    }
    layout_box.span = span_attribute(element);
    let has_col = dom
        .element_children(node)
        .any(|child| dom.tag_name(child).is_some_and(|tag| tag.eq_ignore_ascii_case("col")));
    if !has_col {
        layout_box.children = (0..layout_box.span)
            .map(|_| LayoutBox::anonymous_from(BoxKind::TableColumn, &layout_box, Vec::new()))
            .collect();
    }
    vec![layout_box]
}

/// [§ 4.9.4 The col element](https://html.spec.whatwg.org/multipage/tables.html#the-col-element)
///
/// A column spanning several columns becomes that many column boxes with
/// the same style.
fn handle_col(element: &ElementData, mut layout_box: LayoutBox) -> Vec<LayoutBox> {
    if layout_box.kind != BoxKind::TableColumn {
        return vec![layout_box];
    }
    let span = span_attribute(element);
    if span <= 1 {
        return vec![layout_box];
    }
    layout_box.span = 1;
    let copies: Vec<LayoutBox> = (1..span).map(|_| layout_box.duplicate()).collect();
    std::iter::once(layout_box).chain(copies).collect()
}

/// [§ 4.8.16 SVG](https://html.spec.whatwg.org/multipage/embedded-content-other.html#svg-0)
///
/// An inline `<svg>` element is serialized and loaded as an image.
fn handle_svg(dom: &DomTree, node: NodeId, layout_box: &LayoutBox) -> Vec<LayoutBox> {
    let mut markup = String::new();
    serialize_markup(dom, node, true, &mut markup);
    match Image::from_bytes(
        "",
        markup.into_bytes(),
        Some("image/svg+xml"),
        layout_box.style.image_orientation(),
    ) {
        Ok(image) => vec![make_replaced_box(layout_box, Rc::new(image))],
        Err(err) => {
            warn_once("IMAGE", &format!("Failed to load inline SVG: {err}"));
            Vec::new()
        }
    }
}

/// Write the markup of a subtree. The outermost element gets the SVG
/// namespace when it declares none.
fn serialize_markup(dom: &DomTree, node: NodeId, outermost: bool, out: &mut String) {
    if let Some(text) = dom.as_text(node) {
        out.push_str(&escape(text, false));
        return;
    }
    let Some(element) = dom.as_element(node) else {
        return;
    };
    let _ = write!(out, "<{}", element.tag_name);
    if outermost && element.attribute("xmlns").is_none() {
        out.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
    }
    let mut attributes: Vec<_> = element.attrs.iter().collect();
    attributes.sort();
    for (name, value) in attributes {
        let _ = write!(out, " {name}=\"{}\"", escape(value, true));
    }
    out.push('>');
    for &child in dom.children(node) {
        serialize_markup(dom, child, false, out);
    }
    let _ = write!(out, "</{}>", element.tag_name);
}

/// [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
fn escape(text: &str, attribute_mode: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' if !attribute_mode => escaped.push_str("&lt;"),
            '>' if !attribute_mode => escaped.push_str("&gt;"),
            '"' if attribute_mode => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
