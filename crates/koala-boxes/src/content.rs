//! Generated content: turns content lists into boxes and text.
//!
//! [§ 1 Inserting and replacing content](https://www.w3.org/TR/css-content-3/#content-property)
//!
//! "The content property dictates what is rendered inside an element or
//! pseudo-element."
//!
//! The same evaluator fills `::before`, `::after` and `::marker` boxes,
//! the named strings of `string-set` and `bookmark-label`.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use koala_common::image::{Image, ImageFetcher, ImageOrientation};
use koala_common::url::resolve_url;
use koala_common::warning::warn_once;
use koala_css::{
    BookmarkLevel, ComputedStyle, ContentToken, ContentValue, CounterStyleRenderer, Position,
    PseudoType, Quotes, WhiteSpace,
};
use unicode_categories::UnicodeCategories;

use crate::box_kind::BoxKind;
use crate::counters::{CounterTable, innermost};
use crate::error::BoxTreeError;
use crate::layout_box::{BoxId, LayoutBox};
use crate::page::PageContext;
use crate::target::{ReplayKey, ReplayRecord, TargetCollector, TargetLookup};

/// Collaborators of content evaluation.
#[derive(Clone, Copy)]
pub struct ContentContext<'a> {
    /// Loads `url()` images.
    pub fetcher: &'a dyn ImageFetcher,
    /// Renders `counter()` and markers.
    pub counter_styles: &'a dyn CounterStyleRenderer,
    /// Base for relative URLs.
    pub base_url: Option<&'a str>,
    /// Set when evaluating page-margin content.
    pub page: Option<&'a dyn PageContext>,
}

/// The boxes a replay may read: the box tree and the footnotes moved out
/// of it.
#[derive(Clone, Copy)]
pub(crate) struct BoxForest<'a> {
    pub root: &'a LayoutBox,
    pub footnotes: &'a [LayoutBox],
}

impl<'a> BoxForest<'a> {
    fn find(&self, id: BoxId) -> Option<&'a LayoutBox> {
        self.root
            .find(id)
            .or_else(|| self.footnotes.iter().find_map(|footnote| footnote.find(id)))
    }
}

/// Result of one evaluation.
#[derive(Debug, Default)]
pub(crate) struct Evaluation {
    /// `None` when nothing was produced, or the evaluation was abandoned
    /// for a pending target.
    pub boxes: Option<Vec<LayoutBox>>,
    missing_counters: BTreeSet<String>,
    missing_target_counters: BTreeMap<String, BTreeSet<String>>,
}

/// Resolve an image URL from a style value against the document base.
///
/// A relative URL with no base warns and is fetched as written.
pub(crate) fn resolve_image_url(context: &ContentContext<'_>, url: &str) -> String {
    resolve_url(url, context.base_url).unwrap_or_else(|error| {
        warn_once("BOXES", &error.to_string());
        url.to_string()
    })
}

/// Fetch an image, warning when it cannot be loaded.
pub(crate) fn load_image(
    context: &ContentContext<'_>,
    url: &str,
    mime_hint: Option<&str>,
    orientation: ImageOrientation,
) -> Option<Rc<Image>> {
    match context.fetcher.fetch_image(url, mime_hint, orientation) {
        Ok(image) => Some(image),
        Err(err) => {
            warn_once("IMAGE", &format!("failed to load image at \"{url}\": {err}"));
            None
        }
    }
}

/// Counter names used by the content but not in scope.
fn collect_missing_counter(name: &str, counters: &CounterTable, missing: &mut BTreeSet<String>) {
    if !counters.contains_key(name) {
        let _ = missing.insert(name.to_string());
    }
}

/// Evaluate `record.tokens` as children of `parent`.
///
/// Quote tokens read and update `quote_depth`. A reference to a target
/// that is not resolved yet abandons the whole list and records it for a
/// later replay: partial content is never produced.
pub(crate) fn compute_content_list(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    forest: Option<BoxForest<'_>>,
    record: &ReplayRecord,
    parent: &LayoutBox,
    counters: &CounterTable,
    quote_depth: &mut usize,
) -> Result<Evaluation, BoxTreeError> {
    let mut boxes: Vec<LayoutBox> = Vec::new();
    let mut missing_counters = BTreeSet::new();
    let mut missing_target_counters: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut has_text = false;
    let in_page_context = context.page.is_some();
    // Missing target counters are pointless in margin boxes.
    let collect_missing = targets.is_collecting() && !in_page_context;

    let mut add_text = |boxes: &mut Vec<LayoutBox>, text: &str| -> Result<(), BoxTreeError> {
        has_text = true;
        if text.is_empty() {
            return Ok(());
        }
        if let Some(last) = boxes.last_mut()
            && last.kind == BoxKind::Text
        {
            last.text.push_str(text);
            return Ok(());
        }
        boxes.push(LayoutBox::text_from(parent, text.to_string())?);
        Ok(())
    };

    for token in &record.tokens {
        match token {
            ContentToken::String(text) => add_text(&mut boxes, text)?,
            ContentToken::Url(url) => {
                // Named strings and bookmarks are text only.
                if record.key != ReplayKey::Content {
                    continue;
                }
                let url = resolve_image_url(context, url);
                if let Some(image) = load_image(context, &url, None, parent.style.image_orientation()) {
                    boxes.push(LayoutBox::replaced_from(parent, image));
                }
            }
            // Embedding internal references is impossible.
            ContentToken::InternalUrl(_) | ContentToken::Attr(_) => {}
            ContentToken::Content(part) => {
                // Simulate white space processing, normally done by layout.
                add_text(&mut boxes, extract_text(part, parent).trim())?;
            }
            ContentToken::StringFn { name, keyword } => match context.page {
                Some(page) => add_text(&mut boxes, &page.string_set_for(name, keyword))?,
                None => warn_once("BOXES", "\"string()\" is only allowed in page margins"),
            },
            ContentToken::Counter { name, style } => {
                if collect_missing {
                    collect_missing_counter(name, counters, &mut missing_counters);
                }
                if style == "none" {
                    continue;
                }
                let value = innermost(counters, name);
                add_text(&mut boxes, &context.counter_styles.render_value(value, style))?;
            }
            ContentToken::Counters { name, separator, style } => {
                if collect_missing {
                    collect_missing_counter(name, counters, &mut missing_counters);
                }
                if style == "none" {
                    continue;
                }
                let values = counters.get(name).map_or_else(|| vec![0], Clone::clone);
                let rendered: Vec<String> = values
                    .iter()
                    .map(|value| context.counter_styles.render_value(*value, style))
                    .collect();
                add_text(&mut boxes, &rendered.join(separator))?;
            }
            ContentToken::TargetCounter { anchor, name, style }
            | ContentToken::TargetCounters { anchor, name, style, .. } => {
                let TargetLookup::UpToDate {
                    counter_values,
                    page_counter_values,
                    ..
                } = targets.lookup_target(anchor, record)
                else {
                    return Ok(Evaluation::default());
                };
                if collect_missing && !counter_values.contains_key(name) {
                    let anchor_name = anchor.anchor_name().unwrap_or_default().to_string();
                    let _ = missing_target_counters
                        .entry(anchor_name)
                        .or_default()
                        .insert(name.clone());
                }
                // Page counters cached during pagination, overridden by the
                // target's own values.
                let mut local = page_counter_values;
                local.extend(counter_values);
                let values = local.get(name).map_or_else(|| vec![0], Clone::clone);
                let text = if let ContentToken::TargetCounters { separator, .. } = token {
                    let rendered: Vec<String> = values
                        .iter()
                        .map(|value| context.counter_styles.render_value(*value, style))
                        .collect();
                    rendered.join(separator)
                } else {
                    let value = values.last().copied().unwrap_or(0);
                    context.counter_styles.render_value(value, style)
                };
                add_text(&mut boxes, &text)?;
            }
            ContentToken::TargetText { anchor, part } => {
                let TargetLookup::UpToDate { target, .. } = targets.lookup_target(anchor, record)
                else {
                    return Ok(Evaluation::default());
                };
                // The target box may still be under construction during the
                // first pass: read it once the whole tree exists.
                let Some(forest) = forest else {
                    targets.defer(anchor, record);
                    return Ok(Evaluation::default());
                };
                let text = forest
                    .find(target)
                    .map(|target| extract_text(part, target))
                    .unwrap_or_default();
                add_text(&mut boxes, text.trim())?;
            }
            ContentToken::Quote { open, insert } => {
                let Some(quotes) = record.quotes.as_ref().filter(|q| **q != Quotes::None) else {
                    continue;
                };
                // [§ 3.2 Inserting quotes](https://www.w3.org/TR/css-content-3/#quotes-insert)
                //
                // "close-quote ... decrements the level of nesting for
                // quotes", never below zero.
                if !open {
                    *quote_depth = quote_depth.saturating_sub(1);
                }
                if *insert {
                    let pairs = quotes.pairs();
                    if let Some(pair) = pairs.get((*quote_depth).min(pairs.len().saturating_sub(1))) {
                        let text = if *open { &pair.0 } else { &pair.1 };
                        add_text(&mut boxes, text)?;
                    }
                }
                if *open {
                    *quote_depth += 1;
                }
            }
            ContentToken::Element { name, keyword } => {
                let Some(page) = context.page else {
                    warn_once("BOXES", "\"element()\" is only allowed in page margins");
                    continue;
                };
                let Some(running) = page.running_element_for(name, keyword) else {
                    continue;
                };
                let mut running = running.duplicate();
                running.style_mut().position = Some(Position::Static);
                if running.kind.is_parent() {
                    refill_running_content(context, targets, &mut running, quote_depth, counters)?;
                }
                boxes.push(running);
            }
            ContentToken::Leader(leader) => {
                if leader.is_empty() {
                    continue;
                }
                // [§ 2 Leaders](https://www.w3.org/TR/css-gcpm-3/#leaders)
                //
                // No break inside the leader, no whitespace removed from it.
                let mut text = LayoutBox::text_from(parent, leader.clone())?;
                text.style_mut().white_space = Some(WhiteSpace::Pre);
                let mut leader_box = LayoutBox::anonymous_from(BoxKind::Inline, parent, vec![text]);
                leader_box.style_mut().white_space = Some(WhiteSpace::Pre);
                leader_box.is_leader = true;
                boxes.push(leader_box);
            }
        }
    }

    if has_text || !boxes.is_empty() {
        return Ok(Evaluation {
            boxes: Some(boxes),
            missing_counters,
            missing_target_counters,
        });
    }
    Ok(Evaluation::default())
}

/// Evaluate the content of the generated boxes inside a running element
/// copied into a margin box.
fn refill_running_content(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    running: &mut LayoutBox,
    quote_depth: &mut usize,
    counters: &CounterTable,
) -> Result<(), BoxTreeError> {
    if !matches!(running.style.content(), ContentValue::Normal | ContentValue::None) {
        let style = Rc::clone(&running.style);
        running.children = content_to_boxes(context, targets, &style, running, quote_depth, counters)?;
        return Ok(());
    }
    for child in &mut running.children {
        refill_running_content(context, targets, child, quote_depth, counters)?;
    }
    Ok(())
}

/// Store what an evaluation produced and report its missing counters.
fn finish(
    targets: &mut TargetCollector,
    site: &mut LayoutBox,
    record: &ReplayRecord,
    evaluation: Evaluation,
) -> Option<Vec<LayoutBox>> {
    if evaluation.boxes.is_some() {
        targets.collect_missing_counters(
            site,
            record,
            evaluation.missing_counters,
            evaluation.missing_target_counters,
        );
    }
    evaluation.boxes
}

/// [§ 1.2 Replacing content](https://www.w3.org/TR/css-content-3/#content-property)
///
/// The children generated by the `content` of `style` inside `site`.
///
/// # Errors
///
/// Fails only on internal invariant violations.
pub(crate) fn content_to_boxes(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    style: &ComputedStyle,
    site: &mut LayoutBox,
    quote_depth: &mut usize,
    counters: &CounterTable,
) -> Result<Vec<LayoutBox>, BoxTreeError> {
    let tokens = match style.content() {
        ContentValue::List(tokens) => tokens,
        ContentValue::Normal | ContentValue::None | ContentValue::Inhibit => return Ok(Vec::new()),
    };
    let record = ReplayRecord {
        site: site.id,
        key: ReplayKey::Content,
        tokens,
        quotes: Some(style.quotes()),
        quote_depth: *quote_depth,
    };
    // Keep the counter values to make them available to margin boxes and
    // replays.
    if site.cached_counter_values.is_none() {
        site.cached_counter_values = Some(counters.clone());
    }
    let evaluation = compute_content_list(context, targets, None, &record, site, counters, quote_depth)?;
    Ok(finish(targets, site, &record, evaluation).unwrap_or_default())
}

/// Concatenated text of the top-level text boxes.
fn boxes_text(boxes: &[LayoutBox]) -> String {
    boxes
        .iter()
        .filter(|child| child.kind == BoxKind::Text)
        .map(|child| child.text.as_str())
        .collect()
}

fn apply_string_set(site: &mut LayoutBox, name: &str, boxes: Option<Vec<LayoutBox>>) {
    let Some(boxes) = boxes else {
        return;
    };
    let text = boxes_text(&boxes);
    site.string_set.retain(|(existing, _)| existing != name);
    site.string_set.push((name.to_string(), text));
}

fn apply_bookmark_label(site: &mut LayoutBox, boxes: Option<Vec<LayoutBox>>) {
    site.bookmark_label = boxes.map(|boxes| boxes_text(&boxes)).unwrap_or_default();
}

/// Evaluate a text-only content list for `site`.
fn evaluate_text_list(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    site: &mut LayoutBox,
    key: ReplayKey,
    tokens: Vec<ContentToken>,
    counters: &CounterTable,
) -> Result<Option<Vec<LayoutBox>>, BoxTreeError> {
    let record = ReplayRecord {
        site: site.id,
        key,
        tokens,
        quotes: None,
        quote_depth: 0,
    };
    if site.cached_counter_values.is_none() {
        site.cached_counter_values = Some(counters.clone());
    }
    let evaluation = compute_content_list(context, targets, None, &record, site, counters, &mut 0)?;
    Ok(finish(targets, site, &record, evaluation))
}

/// [§ 1.1 Setting named strings](https://www.w3.org/TR/css-gcpm-3/#setting-named-strings-the-string-set-pro)
/// and [§ 3.1 'bookmark-label'](https://www.w3.org/TR/css-gcpm-3/#bookmark-label)
///
/// Fill the named strings and the bookmark label of `site` from `style`.
/// The label is only computed for boxes with a `bookmark-level`.
///
/// # Errors
///
/// Fails only on internal invariant violations.
pub(crate) fn set_content_lists(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    site: &mut LayoutBox,
    style: &ComputedStyle,
    counters: &CounterTable,
) -> Result<(), BoxTreeError> {
    for (name, tokens) in style.string_set().0 {
        let key = ReplayKey::StringSet(name.clone());
        let boxes = evaluate_text_list(context, targets, site, key, tokens, counters)?;
        apply_string_set(site, &name, boxes);
    }
    set_bookmark_label(context, targets, site, style, counters)
}

/// [§ 3.1 'bookmark-label'](https://www.w3.org/TR/css-gcpm-3/#bookmark-label)
///
/// Only boxes with a `bookmark-level` get a label.
///
/// # Errors
///
/// Fails only on internal invariant violations.
pub(crate) fn set_bookmark_label(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    site: &mut LayoutBox,
    style: &ComputedStyle,
    counters: &CounterTable,
) -> Result<(), BoxTreeError> {
    if style.bookmark_level() == BookmarkLevel::None {
        return Ok(());
    }
    let tokens = style.bookmark_label().0;
    let boxes =
        evaluate_text_list(context, targets, site, ReplayKey::BookmarkLabel, tokens, counters)?;
    apply_bookmark_label(site, boxes);
    Ok(())
}

/// Evaluate a recorded content list again and store the result in its
/// box.
///
/// `page_counters` are mixed under the counter values cached on the box.
/// A box that is no longer in the tree is skipped.
///
/// # Errors
///
/// Fails only on internal invariant violations.
pub(crate) fn replay(
    context: &ContentContext<'_>,
    targets: &mut TargetCollector,
    root: &mut LayoutBox,
    footnotes: &mut [LayoutBox],
    record: &ReplayRecord,
    page_counters: &CounterTable,
) -> Result<(), BoxTreeError> {
    let evaluation = {
        let forest = BoxForest {
            root: &*root,
            footnotes: &*footnotes,
        };
        let Some(site) = forest.find(record.site) else {
            return Ok(());
        };
        let mut counters = page_counters.clone();
        if let Some(cached) = &site.cached_counter_values {
            counters.extend(cached.iter().map(|(name, values)| (name.clone(), values.clone())));
        }
        let mut quote_depth = record.quote_depth;
        compute_content_list(
            context,
            targets,
            Some(forest),
            record,
            site,
            &counters,
            &mut quote_depth,
        )?
    };

    let site = match root.find_mut(record.site) {
        Some(site) => site,
        None => match footnotes
            .iter_mut()
            .find_map(|footnote| footnote.find_mut(record.site))
        {
            Some(site) => site,
            None => return Ok(()),
        },
    };
    let boxes = finish(targets, site, record, evaluation);
    match &record.key {
        ReplayKey::Content => {
            let children = boxes.unwrap_or_default();
            match site.children.as_mut_slice() {
                [line] if line.kind == BoxKind::Line => line.children = children,
                _ => site.children = children,
            }
        }
        ReplayKey::StringSet(name) => apply_string_set(site, name, boxes),
        ReplayKey::BookmarkLabel => apply_bookmark_label(site, boxes),
    }
    Ok(())
}

/// The text of a box: its own text, or the text of the descendant text
/// boxes not generated by `::before`, `::after` or `::marker`.
#[must_use]
pub(crate) fn box_text(layout_box: &LayoutBox) -> String {
    if layout_box.kind == BoxKind::Text {
        return layout_box.text.clone();
    }
    layout_box
        .descendants()
        .filter(|child| {
            child.kind == BoxKind::Text
                && !matches!(
                    child.pseudo_type,
                    Some(PseudoType::Before | PseudoType::After | PseudoType::Marker)
                )
        })
        .map(|child| child.text.as_str())
        .collect()
}

/// [§ 1.1 content()](https://www.w3.org/TR/css-gcpm-3/#content-function-header)
///
/// `text`/`content`: the text of the box. `before`/`after`: the text of
/// the generated pseudo-element. `first-letter`: the first letter with its
/// surrounding punctuation.
#[must_use]
pub(crate) fn extract_text(part: &str, layout_box: &LayoutBox) -> String {
    match part {
        "before" | "after" => {
            let pseudo = if part == "before" { PseudoType::Before } else { PseudoType::After };
            layout_box
                .descendants()
                .filter(|child| child.pseudo_type == Some(pseudo) && !child.kind.is_parent())
                .map(box_text)
                .collect()
        }
        "first-letter" => {
            // [§ 7.2 ::first-letter](https://www.w3.org/TR/css-pseudo-4/#first-letter-pattern)
            //
            // "Punctuation (i.e, characters that belong to the Punctuation
            // (P*) Unicode general category class) that precedes or follows
            // the first letter should be included".
            let mut first_letter = String::new();
            let mut found = false;
            for letter in box_text(layout_box).chars() {
                if !is_first_letter_punctuation(letter) {
                    if found {
                        break;
                    }
                    found = true;
                }
                first_letter.push(letter);
            }
            first_letter
        }
        _ => box_text(layout_box),
    }
}

/// Ps, Pe, Pi, Pf and Po.
fn is_first_letter_punctuation(c: char) -> bool {
    c.is_punctuation_open()
        || c.is_punctuation_close()
        || c.is_punctuation_initial_quote()
        || c.is_punctuation_final_quote()
        || c.is_punctuation_other()
}

/// [§ 3.2 Markers](https://www.w3.org/TR/css-lists-3/#marker-pseudo)
///
/// The text of a `::marker` without `content`: `list-style-type` rendered
/// with the innermost `list-item` counter.
#[must_use]
pub(crate) fn marker_text(
    context: &ContentContext<'_>,
    style: &ComputedStyle,
    counters: &CounterTable,
) -> String {
    context
        .counter_styles
        .render_marker(&style.list_style_type(), innermost(counters, "list-item"))
}
