//! Turns a styled element tree into a formatting structure.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! The build runs in two phases:
//!
//! 1. A depth-first walk of the element tree creates one box per element
//!    (or none, or several), with the boxes of pseudo-elements, markers and
//!    footnote calls. Counters and quotes are threaded through a
//!    [`PageState`].
//! 2. Content that referenced a target not built yet is evaluated again,
//!    then the anonymous box passes (tables, flex and grid items, line
//!    boxes, block-in-inline splits) restructure the whole tree.

use std::rc::Rc;

use koala_common::image::ImageFetcher;
use koala_common::warning::warn_once;
use koala_css::{
    Anchor, Appearance, BuiltinCounterStyles, ComputedStyle, ContentValue, CounterStyleRenderer,
    Direction, DisplayValue, Float, FootnoteDisplay, LengthValue, ListStyleImage,
    ListStylePosition, ListStyleType, Overflow, Position, PseudoType, StyleLookup,
    StyledDocument, TransformFunction, Transforms, WhiteSpace,
};
use koala_dom::{DomTree, NodeId};

use crate::box_kind::BoxKind;
use crate::content::{self, ContentContext};
use crate::counters::{CounterTable, PageState};
use crate::error::BoxTreeError;
use crate::flex_grid::{flex_boxes, grid_boxes};
use crate::html::handle_element;
use crate::inline::{block_in_inline, inline_in_block};
use crate::layout_box::LayoutBox;
use crate::table::anonymous_table_boxes;
use crate::target::{PageReplay, TargetCollector};
use crate::text::{process_text_transform, process_whitespace};

/// Default nesting limit of [`BuildOptions`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Base for relative URLs in attributes and `url()` content.
    pub base_url: Option<String>,
    /// Deepest element nesting accepted before failing with
    /// [`BoxTreeError::TooDeep`].
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The result of a build.
#[derive(Debug)]
pub struct FormattingStructure {
    /// The box of the root element.
    pub root: LayoutBox,
    /// [§ 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
    ///
    /// Bodies of `float: footnote` elements, in document order. Each one is
    /// referenced by the `footnote` field of its `::footnote-call` box.
    pub footnotes: Vec<LayoutBox>,
    /// Anchors and the content waiting for their page counters.
    pub targets: TargetCollector,
}

impl FormattingStructure {
    /// Evaluate content again with page-based counter values, as asked by
    /// [`TargetCollector::cache_target_page_counters`].
    ///
    /// # Errors
    ///
    /// Fails only on internal invariant violations.
    pub fn replay(
        &mut self,
        context: &ContentContext<'_>,
        page_replay: &PageReplay,
    ) -> Result<(), BoxTreeError> {
        content::replay(
            context,
            &mut self.targets,
            &mut self.root,
            &mut self.footnotes,
            &page_replay.record,
            &page_replay.page_counter_values,
        )
    }
}

/// Style lookup used when the root element generates no box: the root is
/// a block and everything else is hidden.
struct RootFallback<'a> {
    styles: &'a dyn StyleLookup,
    root: NodeId,
}

impl StyleLookup for RootFallback<'_> {
    fn get(&self, node: NodeId, pseudo: Option<PseudoType>) -> Option<Rc<ComputedStyle>> {
        let mut style = self.styles.get(node, pseudo)?;
        Rc::make_mut(&mut style).display = Some(if node == self.root {
            DisplayValue::block()
        } else {
            DisplayValue::None
        });
        Some(style)
    }
}

/// Build the formatting structure of a styled document, with the built-in
/// counter styles.
///
/// The document's base URL is used when `options` gives none.
///
/// # Errors
///
/// See [`build_formatting_structure`].
pub fn build_document(
    document: &StyledDocument,
    fetcher: &dyn ImageFetcher,
    options: &BuildOptions,
) -> Result<FormattingStructure, BoxTreeError> {
    let mut options = options.clone();
    if options.base_url.is_none() {
        options.base_url.clone_from(&document.base_url);
    }
    build_formatting_structure(
        &document.dom,
        &document.styles,
        fetcher,
        &BuiltinCounterStyles,
        &options,
    )
}

/// Build the box tree of `dom`.
///
/// # Errors
///
/// - [`BoxTreeError::NoRootElement`] when the document has no element.
/// - [`BoxTreeError::TooDeep`] when elements nest deeper than
///   `options.max_depth`.
/// - [`BoxTreeError::InvariantViolation`] on internal errors.
pub fn build_formatting_structure(
    dom: &DomTree,
    styles: &dyn StyleLookup,
    fetcher: &dyn ImageFetcher,
    counter_styles: &dyn CounterStyleRenderer,
    options: &BuildOptions,
) -> Result<FormattingStructure, BoxTreeError> {
    let root = dom.document_element().ok_or(BoxTreeError::NoRootElement)?;
    let context = ContentContext {
        fetcher,
        counter_styles,
        base_url: options.base_url.as_deref(),
        page: None,
    };
    let fallback = RootFallback { styles, root };

    let mut targets = TargetCollector::new();
    targets.collect_anchors(dom, styles);

    let mut builder = BoxBuilder {
        dom,
        styles,
        context,
        max_depth: options.max_depth,
        targets,
        footnotes: Vec::new(),
    };

    // STEP 1: Build the boxes of the element tree.
    let mut root_box = match builder.element_to_box(&mut PageState::new(), root, 0)?.into_iter().next() {
        Some(root_box) => root_box,
        None => {
            // The root element generates no box: build an empty block
            // instead.
            builder.styles = &fallback;
            builder
                .element_to_box(&mut PageState::new(), root, 0)?
                .into_iter()
                .next()
                .ok_or_else(|| BoxTreeError::invariant("root fallback generated no box"))?
        }
    };
    let BoxBuilder {
        mut targets,
        mut footnotes,
        ..
    } = builder;

    // STEP 2: Content waiting for targets built later.
    for record in targets.pending_replays() {
        content::replay(
            &context,
            &mut targets,
            &mut root_box,
            &mut footnotes,
            &record,
            &CounterTable::new(),
        )?;
    }
    targets.finish_collecting();

    // STEP 3: Anonymous boxes.
    root_box.is_for_root_element = true;
    let mut root_box = create_anonymous_boxes(root_box)?;
    let footnotes = footnotes
        .into_iter()
        .map(create_anonymous_boxes)
        .collect::<Result<Vec<_>, _>>()?;
    set_viewport_overflow(&mut root_box);

    Ok(FormattingStructure {
        root: root_box,
        footnotes,
        targets,
    })
}

/// Create the anonymous boxes required by the layout rules, pass after
/// pass.
///
/// # Errors
///
/// Fails only on internal invariant violations.
pub fn create_anonymous_boxes(layout_box: LayoutBox) -> Result<LayoutBox, BoxTreeError> {
    let layout_box = anonymous_table_boxes(layout_box);
    let layout_box = flex_boxes(layout_box);
    let layout_box = grid_boxes(layout_box);
    let layout_box = inline_in_block(layout_box)?;
    block_in_inline(layout_box)
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
///
/// "UAs must apply the 'overflow' property set on the root element to the
/// viewport. When the root element is an HTML "html" element and its
/// 'overflow' property has the value 'visible', and the element has a
/// "body" element as a child, user agents must instead apply the
/// 'overflow' property from the first such child element to the viewport.
/// The element from which the value is propagated must have a used value
/// for 'overflow' of 'visible'."
fn set_viewport_overflow(root: &mut LayoutBox) {
    let body = if root.element_tag.eq_ignore_ascii_case("html")
        && root.style.overflow() == Overflow::Visible
    {
        root.children
            .iter()
            .position(|child| child.element_tag.eq_ignore_ascii_case("body"))
    } else {
        None
    };
    let chosen = match body {
        Some(index) => &mut root.children[index],
        None => &mut *root,
    };
    let overflow = chosen.style.overflow();
    chosen.style_mut().overflow = Some(Overflow::Visible);
    root.viewport_overflow = Some(overflow);
}

/// The box kind for `style`, warning when the display is not supported.
fn box_kind(style: &ComputedStyle, tag: &str) -> Option<BoxKind> {
    let display = style.display();
    let kind = BoxKind::for_display(display);
    if kind.is_none() {
        warn_once(
            "BOXES",
            &format!("ignored box {tag}: display property {display} not supported"),
        );
    }
    kind
}

/// Recursive element-to-box conversion.
struct BoxBuilder<'a> {
    dom: &'a DomTree,
    styles: &'a dyn StyleLookup,
    context: ContentContext<'a>,
    max_depth: usize,
    targets: TargetCollector,
    footnotes: Vec<LayoutBox>,
}

impl BoxBuilder<'_> {
    /// Convert an element and its children into boxes.
    ///
    /// Most elements give one box. `display: none` gives none, a `<col>`
    /// with a `span` gives several.
    ///
    /// ```text
    /// <p>Some <em>emphasised</em> text.</p>
    /// ```
    ///
    /// gives
    ///
    /// ```text
    /// Block[Text["Some "], Inline[Text["emphasised"]], Text[" text."]]
    /// ```
    fn element_to_box(
        &mut self,
        state: &mut PageState,
        node: NodeId,
        depth: usize,
    ) -> Result<Vec<LayoutBox>, BoxTreeError> {
        if depth > self.max_depth {
            return Err(BoxTreeError::TooDeep {
                limit: self.max_depth,
            });
        }
        let dom = self.dom;
        let Some(element) = dom.as_element(node) else {
            return Ok(Vec::new());
        };
        let tag = element.tag_name.as_str();
        let Some(mut style) = self.styles.get(node, None) else {
            return Ok(Vec::new());
        };
        if style.display().is_none() {
            return Ok(Vec::new());
        }

        // [§ 2.4 'footnote-display'](https://www.w3.org/TR/css-gcpm-3/#footnote-display)
        if style.float() == Float::Footnote {
            let display = match style.footnote_display() {
                FootnoteDisplay::Block => DisplayValue::block(),
                FootnoteDisplay::Inline | FootnoteDisplay::Compact => DisplayValue::inline(),
            };
            Rc::make_mut(&mut style).display = Some(display);
        }

        let Some(kind) = box_kind(&style, tag) else {
            return Ok(Vec::new());
        };
        let mut layout_box = LayoutBox::new(kind, Rc::clone(&style), Some((node, tag)), None, Vec::new());
        if kind == BoxKind::TableCell {
            // [§ 4.9.11 Attributes common to td and th elements](https://html.spec.whatwg.org/multipage/tables.html#attributes-common-to-td-and-th-elements)
            //
            // A rowspan of 0 spans the rest of the row group, and is resolved
            // once the rows are known.
            layout_box.colspan = usize::try_from(element.integer_attribute("colspan", 1)).unwrap_or(1);
            layout_box.rowspan = usize::try_from(element.integer_attribute("rowspan", 0)).unwrap_or(1);
        }

        // STEP 1: The element's own counters, then a scope for the
        // counters its children create.
        state.update_counters(&style);
        layout_box.first_letter_style = self.styles.get(node, Some(PseudoType::FirstLetter));
        layout_box.first_line_style = self.styles.get(node, Some(PseudoType::FirstLine));

        let mut has_marker = false;
        let children = {
            let mut scope = state.scope();
            let mut children = Vec::new();

            // STEP 2: ::marker and ::before.
            if style.display().is_list_item()
                && let Some(marker) = self.marker_to_box(&mut scope, node, tag, &style)?
            {
                has_marker = true;
                children.push(marker);
            }
            children.extend(self.before_after_to_box(&mut scope, node, tag, PseudoType::Before)?);

            // The counter values of a target are those after its ::before
            // and before its ::after.
            if let Anchor::Name(name) = style.anchor() {
                self.targets
                    .store_target(&name, &scope.counter_values, &mut layout_box);
            }

            // STEP 3: Children, merging adjacent text.
            for &child in dom.children(node) {
                if let Some(text) = dom.as_text(child) {
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(last) = children.last_mut()
                        && last.kind == BoxKind::Text
                    {
                        last.text.push_str(text);
                    } else {
                        children.push(LayoutBox::text_from(&layout_box, text.to_string())?);
                    }
                    continue;
                }
                let mut child_boxes = self.element_to_box(&mut scope, child, depth + 1)?;
                if child_boxes.first().is_some_and(LayoutBox::is_footnote) {
                    let footnote = child_boxes.remove(0);
                    child_boxes = self.footnote_call(&mut scope, child, footnote)?;
                }
                children.extend(child_boxes);
            }

            // STEP 4: ::after.
            children.extend(self.before_after_to_box(&mut scope, node, tag, PseudoType::After)?);
            children
        };

        layout_box.children = children;
        // [§ 5 'appearance'](https://www.w3.org/TR/css-ui-4/#appearance-switching)
        //
        // Native widgets are drawn by the renderer, not from their content.
        if style.appearance() != Appearance::None {
            layout_box.children.clear();
        }

        // STEP 5: Text processing and named strings.
        // Each element starts a new run; the trailing space flag is only
        // needed between siblings inside the subtree.
        let _trailing_collapsible_space = process_whitespace(&mut layout_box, false);
        let context = self.context;
        content::set_content_lists(
            &context,
            &mut self.targets,
            &mut layout_box,
            &style,
            &state.counter_values,
        )?;
        process_text_transform(&mut layout_box);

        // [§ 3.5 'list-style-position'](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
        //
        // "The size or contents of the marker box may affect the height of
        // the principal block box and/or the height of its first line box
        // ... this interaction is also not defined."
        //
        // A lone outside marker gets a zero width space so the line keeps
        // a height.
        if has_marker
            && layout_box.children.len() == 1
            && style.list_style_position() == ListStylePosition::Outside
        {
            let zero_width_space = LayoutBox::text_from(&layout_box, "\u{200b}".to_string())?;
            layout_box.children.push(zero_width_space);
        }

        // STEP 6: Footnote bodies start with their ::footnote-marker.
        if style.float() == Float::Footnote {
            if let Some(footnote) = state
                .counter_values
                .get_mut("footnote")
                .and_then(|values| values.last_mut())
            {
                *footnote = footnote.saturating_add(1);
            }
            if let Some(marker) = self.pseudo_content_box(state, node, tag, PseudoType::FootnoteMarker)? {
                layout_box.children.insert(0, marker);
            }
        }

        // STEP 7: Elements that need special care.
        Ok(handle_element(&self.context, dom, node, layout_box))
    }

    /// A `::footnote-marker` or `::footnote-call` box filled with its
    /// `content`.
    fn pseudo_content_box(
        &mut self,
        state: &mut PageState,
        node: NodeId,
        tag: &str,
        pseudo: PseudoType,
    ) -> Result<Option<LayoutBox>, BoxTreeError> {
        let Some(style) = self.styles.get(node, Some(pseudo)) else {
            return Ok(None);
        };
        let Some(kind) = box_kind(&style, &format!("{tag}::{pseudo}")) else {
            return Ok(None);
        };
        let mut pseudo_box = LayoutBox::new(kind, Rc::clone(&style), Some((node, tag)), Some(pseudo), Vec::new());
        let context = self.context;
        pseudo_box.children = content::content_to_boxes(
            &context,
            &mut self.targets,
            &style,
            &mut pseudo_box,
            &mut state.quote_depth,
            &state.counter_values,
        )?;
        Ok(Some(pseudo_box))
    }

    /// [§ 2.3 The footnote call](https://www.w3.org/TR/css-gcpm-3/#footnote-call)
    ///
    /// "A footnote call is left behind in the main text when the footnote
    /// is moved to the footnote area."
    ///
    /// The footnote body is moved to the footnote list and replaced by the
    /// boxes to leave in place.
    fn footnote_call(
        &mut self,
        state: &mut PageState,
        node: NodeId,
        mut footnote: LayoutBox,
    ) -> Result<Vec<LayoutBox>, BoxTreeError> {
        footnote.style_mut().float = Some(Float::None);
        let footnote_id = footnote.id;
        self.footnotes.push(footnote);
        let dom = self.dom;
        let tag = dom.tag_name(node).unwrap_or_default();
        let call = self.pseudo_content_box(state, node, tag, PseudoType::FootnoteCall)?;
        Ok(call
            .map(|mut call| {
                call.footnote = Some(footnote_id);
                call
            })
            .into_iter()
            .collect())
    }

    /// [§ 1 Generated content](https://www.w3.org/TR/css-content-3/#content-property)
    ///
    /// The box of `::before` or `::after`, when its `content` generates
    /// something.
    fn before_after_to_box(
        &mut self,
        state: &mut PageState,
        node: NodeId,
        tag: &str,
        pseudo: PseudoType,
    ) -> Result<Option<LayoutBox>, BoxTreeError> {
        // Pseudo-elements without a style have `content: none`.
        let Some(style) = self.styles.get(node, Some(pseudo)) else {
            return Ok(None);
        };
        if style.display().is_none()
            || matches!(
                style.content(),
                ContentValue::Normal | ContentValue::None | ContentValue::Inhibit
            )
        {
            return Ok(None);
        }
        let Some(kind) = box_kind(&style, &format!("{tag}::{pseudo}")) else {
            return Ok(None);
        };
        let mut pseudo_box = LayoutBox::new(kind, Rc::clone(&style), Some((node, tag)), Some(pseudo), Vec::new());

        state.update_counters(&style);

        let mut children = Vec::new();
        if style.display().is_list_item()
            && let Some(marker) = self.marker_to_box(state, node, tag, &style)?
        {
            children.push(marker);
        }
        let context = self.context;
        children.extend(content::content_to_boxes(
            &context,
            &mut self.targets,
            &style,
            &mut pseudo_box,
            &mut state.quote_depth,
            &state.counter_values,
        )?);
        pseudo_box.children = children;

        content::set_bookmark_label(
            &context,
            &mut self.targets,
            &mut pseudo_box,
            &style,
            &state.counter_values,
        )?;
        Ok(Some(pseudo_box))
    }

    /// [§ 3.2 Markers: the ::marker pseudo-element](https://www.w3.org/TR/css-lists-3/#marker-pseudo)
    ///
    /// The marker of a list item: its `content`, else the
    /// `list-style-image`, else the rendered `list-style-type`.
    fn marker_to_box(
        &mut self,
        state: &mut PageState,
        node: NodeId,
        tag: &str,
        parent_style: &ComputedStyle,
    ) -> Result<Option<LayoutBox>, BoxTreeError> {
        let Some(style) = self.styles.get(node, Some(PseudoType::Marker)) else {
            return Ok(None);
        };
        if style.display().is_none() {
            return Ok(None);
        }
        let Some(kind) = box_kind(&style, &format!("{tag}::marker")) else {
            return Ok(None);
        };
        let mut marker = LayoutBox::new(
            kind,
            Rc::clone(&style),
            Some((node, tag)),
            Some(PseudoType::Marker),
            Vec::new(),
        );
        let context = self.context;

        let mut children = Vec::new();
        if matches!(style.content(), ContentValue::Normal | ContentValue::Inhibit) {
            // [§ 3.2 Image markers](https://www.w3.org/TR/css-lists-3/#image-markers)
            if let ListStyleImage::Url(url) = style.list_style_image() {
                let url = content::resolve_image_url(&context, &url);
                if let Some(image) =
                    content::load_image(&context, &url, None, style.image_orientation())
                {
                    children.push(LayoutBox::replaced_from(&marker, image));
                }
            }
            // [§ 3.1 Text-based markers](https://www.w3.org/TR/css-lists-3/#text-markers)
            if children.is_empty() && style.list_style_type() != ListStyleType::None {
                let text = content::marker_text(&context, &style, &state.counter_values);
                if !text.is_empty() {
                    let mut text_box = LayoutBox::text_from(&marker, text)?;
                    text_box.style_mut().white_space = Some(WhiteSpace::PreWrap);
                    children.push(text_box);
                }
            }
        } else {
            children = content::content_to_boxes(
                &context,
                &mut self.targets,
                &style,
                &mut marker,
                &mut state.quote_depth,
                &state.counter_values,
            )?;
        }
        if children.is_empty() {
            return Ok(None);
        }

        // [§ 3.5 'list-style-position'](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
        //
        // "outside: The marker box is outside the principal block box."
        // It is placed next to the first line, on the start side.
        let outside = parent_style.list_style_position() == ListStylePosition::Outside;
        let kind = if outside { BoxKind::Block } else { BoxKind::Inline };
        let mut wrapper = LayoutBox::anonymous_from(kind, &marker, children);
        // Replays address the marker by id.
        wrapper.id = marker.id;
        wrapper.cached_counter_values = marker.cached_counter_values.take();
        wrapper.missing_link = marker.missing_link;
        if outside {
            let translate_x = if parent_style.direction() == Direction::Ltr {
                -100.0
            } else {
                100.0
            };
            let wrapper_style = wrapper.style_mut();
            wrapper_style.position = Some(Position::Absolute);
            wrapper_style.transform = Some(Transforms(vec![TransformFunction::Translate(
                LengthValue::Percent(translate_x),
                LengthValue::ZERO,
            )]));
        }
        Ok(Some(wrapper))
    }
}

#[cfg(test)]
mod tests {
    use koala_common::net::InMemoryFetcher;
    use serde_json::json;

    use super::*;

    fn build(document: serde_json::Value, options: &BuildOptions) -> Result<FormattingStructure, BoxTreeError> {
        let document = StyledDocument::from_value(document).unwrap();
        build_document(&document, &InMemoryFetcher::new(), options)
    }

    fn nested(depth: usize) -> serde_json::Value {
        let mut node = json!({"tag": "span"});
        for _ in 0..depth {
            node = json!({"tag": "span", "children": [node]});
        }
        json!({"root": {"tag": "html", "children": [node]}})
    }

    #[test]
    fn deep_trees_fail_cleanly() {
        let options = BuildOptions {
            max_depth: 16,
            ..BuildOptions::default()
        };
        assert!(build(nested(10), &options).is_ok());
        assert_eq!(
            build(nested(40), &options).unwrap_err(),
            BoxTreeError::TooDeep { limit: 16 }
        );
    }

    #[test]
    fn hidden_root_falls_back_to_an_empty_block() {
        let structure = build(
            json!({"root": {"tag": "html", "style": {"display": "none"}, "children": [{"tag": "p"}]}}),
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(structure.root.kind, BoxKind::Block);
        assert!(structure.root.is_for_root_element);
        assert!(structure.root.children.is_empty());
    }

    #[test]
    fn body_overflow_goes_to_the_viewport() {
        let structure = build(
            json!({"root": {"tag": "html", "children": [
                {"tag": "body", "style": {"overflow": "hidden"}}
            ]}}),
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(structure.root.viewport_overflow, Some(Overflow::Hidden));
        assert_eq!(structure.root.children[0].style.overflow(), Overflow::Visible);
    }

    #[test]
    fn appearance_drops_children() {
        let structure = build(
            json!({"root": {"tag": "html", "children": [
                {"tag": "div", "style": {"appearance": "auto"}, "children": ["text"]}
            ]}}),
            &BuildOptions::default(),
        )
        .unwrap();
        assert!(structure.root.children[0].children.is_empty());
    }
}
