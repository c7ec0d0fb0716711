//! White space processing and text transformation of text boxes.
//!
//! [§ 4 White Space Processing & Control Characters](https://www.w3.org/TR/css-text-3/#white-space-processing)
//! [§ 2 Transforming Text](https://www.w3.org/TR/css-text-3/#transforming)

use koala_css::{Hyphens, TextTransform};
use unicode_categories::UnicodeCategories;

use crate::box_kind::BoxKind;
use crate::layout_box::LayoutBox;

/// Normalize the white space of one text run.
///
/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
fn normalize_white_space(text: &str, collapse_spaces: bool, collapse_new_lines: bool) -> String {
    // STEP 1: Normalize line feeds.
    //
    // [§ 4.1 The White Space Processing Rules](https://www.w3.org/TR/css-text-3/#white-space-rules)
    // "CSS normalizes ... carriage return (U+000D) followed by a line feed
    // (U+000A) ... into a single line feed".
    let mut text = text.replace("\r\n", "\n").replace('\r', "\n");

    if collapse_spaces {
        // STEP 2: "Any sequence of collapsible spaces and tabs immediately
        // preceding or following a segment break is removed."
        let segments: Vec<&str> = text.split('\n').collect();
        let last = segments.len().saturating_sub(1);
        text = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut segment = *segment;
                if i > 0 {
                    segment = segment.trim_start_matches([' ', '\t']);
                }
                if i < last {
                    segment = segment.trim_end_matches([' ', '\t']);
                }
                segment
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    if collapse_new_lines {
        // STEP 3: Collapsible segment breaks become spaces.
        text = text.replace('\n', " ");
    }

    if collapse_spaces {
        // STEP 4: "Every collapsible tab is converted to a collapsible space
        // (U+0020)" and "Any collapsible space immediately following another
        // collapsible space ... is collapsed".
        let mut collapsed = String::with_capacity(text.len());
        let mut in_run = false;
        for c in text.chars() {
            if matches!(c, ' ' | '\t') {
                if !in_run {
                    collapsed.push(' ');
                }
                in_run = true;
            } else {
                collapsed.push(c);
                in_run = false;
            }
        }
        text = collapsed;
    }
    text
}

/// Collapse and transform white space in the text boxes of a subtree,
/// according to `white-space`.
///
/// `following_collapsible_space` tells whether the text before this box
/// ended with a collapsible space; a leading space is then removed. The
/// return value is the same flag for the text after the box.
pub fn process_whitespace(layout_box: &mut LayoutBox, mut following_collapsible_space: bool) -> bool {
    if layout_box.kind == BoxKind::Text {
        if layout_box.text.is_empty() {
            return following_collapsible_space;
        }
        let white_space = layout_box.style.white_space();
        let collapse_spaces = white_space.collapses_spaces();
        let mut text = normalize_white_space(
            &layout_box.text,
            collapse_spaces,
            white_space.collapses_new_lines(),
        );
        if collapse_spaces {
            let ends_with_space = text.ends_with(' ');
            if following_collapsible_space && text.starts_with(' ') {
                let _ = text.remove(0);
                layout_box.leading_collapsible_space = true;
            }
            following_collapsible_space = ends_with_space;
        } else {
            following_collapsible_space = false;
        }
        layout_box.text = text;
    } else {
        let in_flow = layout_box.is_in_normal_flow();
        for child in &mut layout_box.children {
            if matches!(child.kind, BoxKind::Text | BoxKind::Inline) {
                let child_collapsible_space = process_whitespace(child, following_collapsible_space);
                if in_flow && child.is_in_normal_flow() {
                    following_collapsible_space = child_collapsible_space;
                }
            } else if child.is_in_normal_flow() {
                following_collapsible_space = false;
            }
        }
    }
    following_collapsible_space && !layout_box.is_running()
}

/// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
///
/// "capitalize: Puts the first typographic letter unit of each word, if
/// lowercase, in titlecase". Words start at the first letter or number
/// after a separator; punctuation does not start a new word.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut letter_found = false;
    let mut capitalized = String::with_capacity(text.len());
    for letter in text.chars() {
        if !letter_found && (letter.is_letter() || letter.is_number()) {
            letter_found = true;
            capitalized.extend(letter.to_uppercase());
            continue;
        }
        if letter.is_separator() {
            letter_found = false;
        }
        capitalized.push(letter);
    }
    capitalized
}

/// "full-width: Puts all typographic character units in fullwidth form."
///
/// ASCII printable characters map to the Halfwidth and Fullwidth Forms
/// block, the space to the ideographic space and the hyphen to the minus
/// sign.
fn full_width(c: char) -> char {
    match c {
        ' ' => '\u{3000}',
        '-' => '\u{2212}',
        '\u{21}'..='\u{7f}' => char::from_u32(u32::from(c) + 0xfee0).unwrap_or(c),
        _ => c,
    }
}

/// Apply `text-transform` and `hyphens: none` to the text boxes of a
/// subtree. Running elements are left alone.
pub fn process_text_transform(layout_box: &mut LayoutBox) {
    if layout_box.kind == BoxKind::Text {
        let mut text = match layout_box.style.text_transform() {
            TextTransform::None => std::mem::take(&mut layout_box.text),
            TextTransform::Uppercase => layout_box.text.to_uppercase(),
            TextTransform::Lowercase => layout_box.text.to_lowercase(),
            TextTransform::Capitalize => capitalize(&layout_box.text),
            TextTransform::FullWidth => layout_box.text.chars().map(full_width).collect(),
        };
        // [§ 6.1 'hyphens'](https://www.w3.org/TR/css-text-3/#hyphens-property)
        //
        // "none: Words are not hyphenated, even if characters inside the
        // word explicitly define hyphenation opportunities."
        if layout_box.style.hyphens() == Hyphens::None {
            text = text.replace('\u{ad}', "");
        }
        layout_box.text = text;
    } else if !layout_box.is_running() {
        for child in &mut layout_box.children {
            if matches!(child.kind, BoxKind::Text | BoxKind::Inline) {
                process_text_transform(child);
            }
        }
    }
}
