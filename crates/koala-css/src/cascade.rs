//! CSS Cascading and Style Computation
//!
//! This module implements the parts of
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//! that apply once declarations are known: origin layering, CSS-wide
//! keywords, shorthand expansion and the computed-value fixups
//! (`attr()` substitution, blockification).

use koala_common::warning::warn_once;
use koala_dom::ElementData;

use crate::error::StyleError;
use crate::style::content::resolve_attr_tokens;
use crate::style::parse::{ValueToken, tokenize};
use crate::style::{
    Anchor, BorderStyle, Color, ComputedStyle, ContentValue, DisplayValue, Float,
    InnerDisplayType, LengthValue,
};

/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
///
/// Apply declarations in order; a later declaration of the same property
/// wins. Invalid declarations are reported and ignored.
pub fn apply_declarations<'a>(
    style: &mut ComputedStyle,
    parent: Option<&ComputedStyle>,
    declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
    for (name, value) in declarations {
        if let Err(err) = apply_declaration(style, parent, name, value) {
            warn_once("CSS", &err.to_string());
        }
    }
}

/// Apply one declaration, expanding shorthands and the CSS-wide keywords.
///
/// # Errors
///
/// Returns a [`StyleError`] when the property is unknown or the value is
/// invalid; the style is then left untouched.
pub fn apply_declaration(
    style: &mut ComputedStyle,
    parent: Option<&ComputedStyle>,
    name: &str,
    value: &str,
) -> Result<(), StyleError> {
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim();
    let longhands = expand_shorthand(&name, value)?;

    // [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
    match value.to_ascii_lowercase().as_str() {
        "initial" => {
            for (longhand, _) in &longhands {
                style.reset_property(longhand);
            }
            return Ok(());
        }
        "inherit" => {
            for (longhand, _) in &longhands {
                match parent {
                    Some(parent) => style.inherit_property(longhand, parent),
                    // "If there is no parent element, the inherit keyword
                    // computes to the initial value."
                    None => style.reset_property(longhand),
                }
            }
            return Ok(());
        }
        // [§ 7.3.3 unset](https://www.w3.org/TR/css-cascade-4/#inherit-initial)
        "unset" => {
            for (longhand, _) in &longhands {
                match parent {
                    Some(parent) if ComputedStyle::is_inherited(longhand) => {
                        style.inherit_property(longhand, parent);
                    }
                    _ => style.reset_property(longhand),
                }
            }
            return Ok(());
        }
        _ => {}
    }

    // Validate everything before touching the style.
    let mut expanded = style.clone();
    for (longhand, longhand_value) in &longhands {
        match longhand_value {
            Some(longhand_value) => expanded.set_property(longhand, longhand_value)?,
            None => expanded.reset_property(longhand),
        }
    }
    *style = expanded;
    Ok(())
}

/// Longhands set by a declaration; `None` resets the longhand to its
/// initial value.
type Longhands = Vec<(String, Option<String>)>;

/// [§ 1.4 Shorthand properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
///
/// "Some properties are shorthand properties, meaning that they allow
/// authors to specify the values of several properties with a single
/// property."
fn expand_shorthand(name: &str, value: &str) -> Result<Longhands, StyleError> {
    let invalid = || StyleError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    };
    let keyword = ["initial", "inherit", "unset"].contains(&value.to_ascii_lowercase().as_str());
    let components = || -> Result<Vec<String>, StyleError> {
        let tokens = tokenize(value).map_err(|_| invalid())?;
        Ok(tokens.iter().map(ValueToken::to_string).collect())
    };

    let longhands = match name {
        "margin" | "padding" => box_sides(name, "", &components()?, keyword).ok_or_else(invalid)?,
        "border-style" | "border-width" | "border-color" => {
            let suffix = name.trim_start_matches("border");
            box_sides("border", suffix, &components()?, keyword).ok_or_else(invalid)?
        }
        "border" => {
            let parts = border_parts(&components()?, keyword).ok_or_else(invalid)?;
            SIDES
                .iter()
                .flat_map(|side| side_longhands(side, &parts))
                .collect()
        }
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let parts = border_parts(&components()?, keyword).ok_or_else(invalid)?;
            side_longhands(name.trim_start_matches("border-"), &parts)
        }
        "list-style" => list_style(&components()?, keyword).ok_or_else(invalid)?,
        _ => vec![(name.to_string(), Some(value.to_string()))],
    };
    Ok(longhands)
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom margins are set to the first value
/// and the right and left margins are set to the second. If there are three
/// values, the top is set to the first value, the left and right are set to
/// the second, and the bottom is set to the third. If there are four values,
/// they apply to the top, right, bottom, and left, respectively."
fn box_sides(prefix: &str, suffix: &str, values: &[String], keyword: bool) -> Option<Longhands> {
    let [top, right, bottom, left] = if keyword {
        [None, None, None, None]
    } else {
        let v = |i: usize| Some(values[i].clone());
        match values.len() {
            1 => [v(0), v(0), v(0), v(0)],
            2 => [v(0), v(1), v(0), v(1)],
            3 => [v(0), v(1), v(2), v(1)],
            4 => [v(0), v(1), v(2), v(3)],
            _ => return None,
        }
    };
    Some(
        SIDES
            .iter()
            .zip([top, right, bottom, left])
            .map(|(side, value)| (format!("{prefix}-{side}{suffix}"), value))
            .collect(),
    )
}

/// The `(width, style, color)` parts of a `border` shorthand.
type BorderParts = [Option<String>; 3];

/// [§ 8.5.4 Border shorthand properties](https://www.w3.org/TR/CSS2/box.html#border-shorthand-properties)
///
/// "Value: [ <border-width> || <border-style> || <border-top-color> ]"
///
/// Omitted parts are reset to their initial values.
fn border_parts(values: &[String], keyword: bool) -> Option<BorderParts> {
    let mut parts: BorderParts = [None, None, None];
    if keyword {
        return Some(parts);
    }
    if values.is_empty() || values.len() > 3 {
        return None;
    }
    for value in values {
        let slot = if value.parse::<LengthValue>().is_ok() {
            0
        } else if value.parse::<BorderStyle>().is_ok() {
            1
        } else if value.parse::<Color>().is_ok() {
            2
        } else {
            return None;
        };
        if parts[slot].is_some() {
            return None;
        }
        parts[slot] = Some(value.clone());
    }
    Some(parts)
}

fn side_longhands(side: &str, [width, style, color]: &BorderParts) -> Longhands {
    vec![
        (format!("border-{side}-width"), width.clone()),
        (format!("border-{side}-style"), style.clone()),
        (format!("border-{side}-color"), color.clone()),
    ]
}

/// [§ 3.4 list-style](https://www.w3.org/TR/css-lists-3/#list-style-property)
///
/// "Value: <'list-style-position'> || <'list-style-image'> || <'list-style-type'>"
///
/// A lone `none` sets both the image and the type to `none`.
fn list_style(values: &[String], keyword: bool) -> Option<Longhands> {
    let mut position = None;
    let mut image = None;
    let mut kind = None;
    let mut nones = 0;
    if !keyword {
        for value in values {
            let lower = value.to_ascii_lowercase();
            if lower == "none" {
                nones += 1;
            } else if (lower == "inside" || lower == "outside") && position.is_none() {
                position = Some(value.clone());
            } else if lower.starts_with("url(") && image.is_none() {
                image = Some(value.clone());
            } else if kind.is_none() {
                kind = Some(value.clone());
            } else {
                return None;
            }
        }
    }
    let none = || Some("none".to_string());
    match nones {
        0 => {}
        1 if image.is_none() => image = none(),
        1 if kind.is_none() => kind = none(),
        2 if image.is_none() && kind.is_none() => {
            image = none();
            kind = none();
        }
        _ => return None,
    }
    Some(vec![
        ("list-style-position".to_string(), position),
        ("list-style-image".to_string(), image),
        ("list-style-type".to_string(), kind),
    ])
}

/// Substitute `attr()` references with the element's attribute values.
///
/// [§ 7.7 Attribute References](https://www.w3.org/TR/css-values-5/#attr-notation)
pub fn resolve_attributes(style: &mut ComputedStyle, element: &ElementData) {
    let attribute = |name: &str| element.attribute(name);
    if let Some(ContentValue::List(tokens)) = &mut style.content {
        resolve_attr_tokens(tokens, &attribute);
    }
    if let Some(string_set) = &mut style.string_set {
        for (_, tokens) in &mut string_set.0 {
            resolve_attr_tokens(tokens, &attribute);
        }
    }
    if let Some(label) = &mut style.bookmark_label {
        resolve_attr_tokens(&mut label.0, &attribute);
    }
    if let Some(Anchor::Attr(name)) = &style.anchor {
        style.anchor = Some(match element.attribute(name).map(str::trim) {
            Some(value) if !value.is_empty() => Anchor::Name(value.to_string()),
            _ => Anchor::None,
        });
    }
}

/// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
///
/// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
///
/// Blockify the display of absolutely positioned and floated elements, of
/// the root element and of flex and grid items. `float: footnote` is
/// handled when boxes are built.
pub fn blockify(style: &mut ComputedStyle, is_root: bool, parent_display: Option<DisplayValue>) {
    let display = style.display();
    if display.is_none() {
        return;
    }
    let floated = matches!(style.float(), Float::Left | Float::Right);
    let in_flex_or_grid = matches!(
        parent_display,
        Some(DisplayValue::Pair {
            inner: InnerDisplayType::Flex | InnerDisplayType::Grid,
            ..
        })
    );
    if floated || style.position().is_absolutely_positioned() || is_root || in_flex_or_grid {
        style.display = Some(display.blockified());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AutoLength, ColorValue, ListStyleType};

    #[test]
    fn expands_margin_shorthand() {
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, None, "margin", "1px auto 3px").unwrap();
        assert_eq!(style.margin_top(), AutoLength::Length(LengthValue::Px(1.0)));
        assert_eq!(style.margin_right(), AutoLength::Auto);
        assert_eq!(style.margin_bottom(), AutoLength::Length(LengthValue::Px(3.0)));
        assert_eq!(style.margin_left(), AutoLength::Auto);
    }

    #[test]
    fn border_shorthand_resets_omitted_parts() {
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, None, "border-top-color", "red").unwrap();
        apply_declaration(&mut style, None, "border", "2px solid").unwrap();
        assert_eq!(style.border_top_style(), BorderStyle::Solid);
        assert_eq!(style.border_left_width(), LengthValue::Px(2.0));
        assert_eq!(style.border_top_color(), Color::CurrentColor);
    }

    #[test]
    fn border_side_shorthand_accepts_any_order() {
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, None, "border-left", "lime 5px dashed").unwrap();
        assert_eq!(style.border_left_style(), BorderStyle::Dashed);
        assert_eq!(
            style.border_left_color(),
            Color::Rgba(ColorValue::rgb(0, 255, 0))
        );
        assert_eq!(style.border_top_style(), BorderStyle::None);
    }

    #[test]
    fn invalid_shorthand_leaves_style_untouched() {
        let mut style = ComputedStyle::default();
        assert!(apply_declaration(&mut style, None, "border", "2px wobbly").is_err());
        assert_eq!(style, ComputedStyle::default());
    }

    #[test]
    fn list_style_none() {
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, None, "list-style", "none").unwrap();
        assert_eq!(style.list_style_type(), ListStyleType::None);
    }

    #[test]
    fn inherit_keyword_copies_parent_value() {
        let mut parent = ComputedStyle::default();
        apply_declaration(&mut parent, None, "display", "table").unwrap();
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, Some(&parent), "display", "inherit").unwrap();
        assert_eq!(style.display(), parent.display());
    }

    #[test]
    fn blockifies_floats_and_flex_items() {
        let mut style = ComputedStyle::default();
        apply_declaration(&mut style, None, "display", "inline-table").unwrap();
        apply_declaration(&mut style, None, "float", "left").unwrap();
        blockify(&mut style, false, None);
        assert_eq!(style.display().to_string(), "block table");

        let mut item = ComputedStyle::default();
        blockify(&mut item, false, Some("inline-flex".parse().unwrap()));
        assert_eq!(item.display(), DisplayValue::block());
    }
}
