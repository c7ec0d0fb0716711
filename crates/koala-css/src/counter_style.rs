//! Counter styles.
//!
//! [CSS Counter Styles Level 3](https://www.w3.org/TR/css-counter-styles-3/)

use crate::style::ListStyleType;

/// Turns counter values into text.
pub trait CounterStyleRenderer {
    /// [§ 4.1 counter()](https://www.w3.org/TR/css-lists-3/#counter-functions)
    ///
    /// The representation of `value` in the counter style `style`.
    fn render_value(&self, value: i32, style: &str) -> String;

    /// [§ 3.1 Marker text](https://www.w3.org/TR/css-lists-3/#text-markers)
    ///
    /// The text of a `::marker` for the given `list-style-type`, suffix
    /// included. Empty for `none`.
    fn render_marker(&self, list_style_type: &ListStyleType, value: i32) -> String;
}

/// The predefined counter styles of
/// [§ 6 Simple Predefined Counter Styles](https://www.w3.org/TR/css-counter-styles-3/#simple-counter-styles).
///
/// Unknown style names fall back to `decimal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCounterStyles;

/// [§ 6.4 Symbolic: disc, circle, square](https://www.w3.org/TR/css-counter-styles-3/#simple-symbolic)
fn symbol(style: &str) -> Option<&'static str> {
    match style {
        "disc" => Some("\u{2022}"),
        "circle" => Some("\u{25e6}"),
        "square" => Some("\u{25aa}"),
        "disclosure-open" => Some("\u{25be}"),
        "disclosure-closed" => Some("\u{25b8}"),
        _ => None,
    }
}

/// [§ 3.1.5 additive](https://www.w3.org/TR/css-counter-styles-3/#additive-system)
///
/// Roman numerals are only defined on 1 to 3999.
fn roman(value: i32) -> Option<String> {
    const SYMBOLS: [(i32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if !(1..=3999).contains(&value) {
        return None;
    }
    let mut rest = value;
    let mut result = String::new();
    for (weight, symbol) in SYMBOLS {
        while rest >= weight {
            result.push_str(symbol);
            rest -= weight;
        }
    }
    Some(result)
}

/// [§ 3.1.3 alphabetic](https://www.w3.org/TR/css-counter-styles-3/#alphabetic-system)
///
/// "the first symbol is used for 1, the second for 2, ... then the first
/// symbol twice". Undefined below 1.
fn alphabetic(value: i32, symbols: &[char]) -> Option<String> {
    if value < 1 {
        return None;
    }
    let base = i32::try_from(symbols.len()).ok()?;
    let mut rest = value;
    let mut reversed = Vec::new();
    while rest > 0 {
        rest -= 1;
        let index = usize::try_from(rest % base).ok()?;
        reversed.push(symbols[index]);
        rest /= base;
    }
    Some(reversed.into_iter().rev().collect())
}

const LATIN: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

impl CounterStyleRenderer for BuiltinCounterStyles {
    fn render_value(&self, value: i32, style: &str) -> String {
        let rendered = match style {
            "none" => return String::new(),
            "decimal-leading-zero" => Some(if value < 0 {
                format!("-{:02}", value.unsigned_abs())
            } else {
                format!("{value:02}")
            }),
            "lower-roman" => roman(value),
            "upper-roman" => roman(value).map(|roman| roman.to_uppercase()),
            "lower-alpha" | "lower-latin" => alphabetic(value, &LATIN),
            "upper-alpha" | "upper-latin" => {
                alphabetic(value, &LATIN).map(|alpha| alpha.to_uppercase())
            }
            "lower-greek" => alphabetic(value, &GREEK),
            other => symbol(other).map(str::to_string),
        };
        // [§ 2 Defining Custom Counter Styles](https://www.w3.org/TR/css-counter-styles-3/#counter-style-range)
        // "the value is instead represented using the fallback counter style"
        rendered.unwrap_or_else(|| value.to_string())
    }

    fn render_marker(&self, list_style_type: &ListStyleType, value: i32) -> String {
        match list_style_type {
            ListStyleType::None => String::new(),
            ListStyleType::String(string) => string.clone(),
            // "suffix: ' '" for symbolic styles, "'. '" for the others.
            ListStyleType::Named(name) => match symbol(name) {
                Some(symbol) => format!("{symbol} "),
                None => format!("{}. ", self.render_value(value, name)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_numeric_styles() {
        let styles = BuiltinCounterStyles;
        assert_eq!(styles.render_value(7, "decimal"), "7");
        assert_eq!(styles.render_value(7, "decimal-leading-zero"), "07");
        assert_eq!(styles.render_value(1994, "upper-roman"), "MCMXCIV");
        assert_eq!(styles.render_value(4000, "lower-roman"), "4000");
        assert_eq!(styles.render_value(28, "lower-alpha"), "ab");
        assert_eq!(styles.render_value(0, "upper-latin"), "0");
        assert_eq!(styles.render_value(2, "lower-greek"), "β");
        assert_eq!(styles.render_value(3, "none"), "");
        assert_eq!(styles.render_value(3, "unknown-style"), "3");
    }

    #[test]
    fn renders_markers() {
        let styles = BuiltinCounterStyles;
        assert_eq!(styles.render_marker(&ListStyleType::default(), 1), "\u{2022} ");
        assert_eq!(
            styles.render_marker(&ListStyleType::Named("decimal".to_string()), 3),
            "3. "
        );
        assert_eq!(
            styles.render_marker(&ListStyleType::String("-".to_string()), 3),
            "-"
        );
        assert_eq!(styles.render_marker(&ListStyleType::None, 3), "");
    }
}
