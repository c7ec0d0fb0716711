//! CSS value types: lengths, colors, transforms and small numeric properties.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use std::fmt;
use std::str::FromStr;

use super::parse::{ValueToken, split_commas, tokenize};

/// User agent default font size, used to resolve `em` when nothing else is known.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in". Other absolute units are converted to px.
    Px(f64),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f64),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f64),
}

impl LengthValue {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Get the value in pixels, resolving `em` against the default font
    /// size. Percentages cannot be resolved without layout and give 0.
    #[must_use]
    pub fn to_px(&self) -> f64 {
        match self {
            Self::Px(px) => *px,
            Self::Em(em) => em * DEFAULT_FONT_SIZE_PX,
            Self::Percent(_) => 0.0,
        }
    }

    /// Build a length from a single component value.
    ///
    /// "For zero lengths the unit identifier is optional."
    #[must_use]
    pub fn from_token(token: &ValueToken) -> Option<Self> {
        match token {
            ValueToken::Number { value, .. } if *value == 0.0 => Some(Self::ZERO),
            ValueToken::Percentage(value) => Some(Self::Percent(*value)),
            ValueToken::Dimension { value, unit } => {
                // [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
                let px = match unit.as_str() {
                    "px" => *value,
                    "in" => value * 96.0,
                    "cm" => value * 96.0 / 2.54,
                    "mm" => value * 96.0 / 25.4,
                    "q" => value * 96.0 / 101.6,
                    "pt" => value * 96.0 / 72.0,
                    "pc" => value * 16.0,
                    "em" | "rem" => return Some(Self::Em(*value)),
                    _ => return None,
                };
                Some(Self::Px(px))
            }
            _ => None,
        }
    }
}

impl Default for LengthValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for LengthValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            // [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
            [ValueToken::Ident(ident)] => match ident.to_ascii_lowercase().as_str() {
                "thin" => Ok(Self::Px(1.0)),
                "medium" => Ok(Self::Px(3.0)),
                "thick" => Ok(Self::Px(5.0)),
                _ => Err(s.to_string()),
            },
            [token] => Self::from_token(token).ok_or_else(|| s.to_string()),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for LengthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Em(em) => write!(f, "{em}em"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// A length that can also be 'auto' (for margins and offsets).
/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoLength {
    /// A specific length value.
    Length(LengthValue),
    /// The 'auto' keyword - resolved during layout.
    Auto,
}

impl AutoLength {
    /// Whether this is the `auto` keyword.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl FromStr for AutoLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match tokenize(s)?.as_slice() {
            [token] => LengthValue::from_token(token)
                .map(Self::Length)
                .ok_or_else(|| s.to_string()),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for AutoLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(length) => write!(f, "{length}"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// [§ 6.3 transparent](https://www.w3.org/TR/css-color-4/#transparent-color)
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // "The three-digit RGB notation (#RGB) is converted into six-digit form
        // (#RRGGBB) by replicating digits, not by adding zeros."
        let channel = |i: usize, width: usize| -> Option<u8> {
            let digits = hex.get(i * width..(i + 1) * width)?;
            u8::from_str_radix(&digits.repeat(3 - width), 16).ok()
        };
        match hex.len() {
            3 | 4 => Some(Self {
                r: channel(0, 1)?,
                g: channel(1, 1)?,
                b: channel(2, 1)?,
                a: if hex.len() == 4 { channel(3, 1)? } else { 255 },
            }),
            6 | 8 => Some(Self {
                r: channel(0, 2)?,
                g: channel(1, 2)?,
                b: channel(2, 2)?,
                a: if hex.len() == 8 { channel(3, 2)? } else { 255 },
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    /// "CSS defines a large set of named colors..."
    ///
    /// The 16 basic HTML colors, `orange`, `gray`/`grey` and `transparent`.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "lime" => Self::rgb(0, 255, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "maroon" => Self::rgb(128, 0, 0),
            "navy" => Self::rgb(0, 0, 128),
            "olive" => Self::rgb(128, 128, 0),
            "purple" => Self::rgb(128, 0, 128),
            "silver" => Self::rgb(192, 192, 192),
            "teal" => Self::rgb(0, 128, 128),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// A specified color: either a concrete color or `currentcolor`.
///
/// [§ 6.4 The currentcolor keyword](https://www.w3.org/TR/css-color-4/#currentcolor-color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// "The keyword currentcolor represents value of the color property on
    /// the same element."
    #[default]
    CurrentColor,
    /// A resolved sRGB color.
    Rgba(ColorValue),
}

impl Color {
    /// Resolve `currentcolor` against the element's `color`.
    #[must_use]
    pub const fn resolve(self, current: ColorValue) -> ColorValue {
        match self {
            Self::CurrentColor => current,
            Self::Rgba(color) => color,
        }
    }

    /// Build a color from a single component value.
    #[must_use]
    pub fn from_token(token: &ValueToken) -> Option<Self> {
        match token {
            ValueToken::Hash(hex) => ColorValue::from_hex(hex).map(Self::Rgba),
            ValueToken::Ident(ident) if ident.eq_ignore_ascii_case("currentcolor") => {
                Some(Self::CurrentColor)
            }
            ValueToken::Ident(ident) => ColorValue::from_named(ident).map(Self::Rgba),
            ValueToken::Function { name, args } if name == "rgb" || name == "rgba" => {
                parse_rgb_function(args).map(Self::Rgba)
            }
            _ => None,
        }
    }
}

/// [§ 5.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
fn parse_rgb_function(args: &[ValueToken]) -> Option<ColorValue> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |token: &ValueToken, scale: f64| -> Option<u8> {
        let value = match token {
            ValueToken::Number { value, .. } => value * scale,
            ValueToken::Percentage(percent) => percent * 2.55,
            _ => return None,
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let channels: Vec<&ValueToken> = args
        .iter()
        .filter(|t| !matches!(t, ValueToken::Comma | ValueToken::Delim('/')))
        .collect();
    match channels.as_slice() {
        [r, g, b] => Some(ColorValue::rgb(to_u8(r, 1.0)?, to_u8(g, 1.0)?, to_u8(b, 1.0)?)),
        [r, g, b, a] => Some(ColorValue {
            r: to_u8(r, 1.0)?,
            g: to_u8(g, 1.0)?,
            b: to_u8(b, 1.0)?,
            a: to_u8(a, 255.0)?,
        }),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            [token] => Self::from_token(token).ok_or_else(|| s.to_string()),
            _ => Err(s.to_string()),
        }
    }
}

impl FromStr for ColorValue {
    type Err = String;

    /// Parse a concrete color; `currentcolor` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Color>()? {
            Color::Rgba(color) => Ok(color),
            Color::CurrentColor => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentColor => f.write_str("currentcolor"),
            Self::Rgba(color) => f.write_str(&color.to_hex_string()),
        }
    }
}

/// [§ 7 Transform functions](https://www.w3.org/TR/css-transforms-1/#transform-functions)
#[derive(Debug, Clone, PartialEq)]
pub enum TransformFunction {
    /// `translate(tx, ty)`, also `translateX()` and `translateY()`
    Translate(LengthValue, LengthValue),
    /// `scale(sx, sy)`
    Scale(f64, f64),
    /// `rotate(angle)`, in degrees
    Rotate(f64),
}

/// [§ 5 The transform property](https://www.w3.org/TR/css-transforms-1/#transform-property)
///
/// An empty list is `none`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transforms(pub Vec<TransformFunction>);

impl FromStr for Transforms {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if let [ValueToken::Ident(ident)] = tokens.as_slice()
            && ident.eq_ignore_ascii_case("none")
        {
            return Ok(Self::default());
        }
        let mut functions = Vec::new();
        for token in &tokens {
            let ValueToken::Function { name, args } = token else {
                return Err(s.to_string());
            };
            let args = split_commas(args);
            let length = |i: usize| -> Option<LengthValue> {
                match args.get(i)? {
                    [token] => LengthValue::from_token(token),
                    _ => None,
                }
            };
            let number = |i: usize| -> Option<f64> {
                match args.get(i)? {
                    [ValueToken::Number { value, .. }] => Some(*value),
                    _ => None,
                }
            };
            let function = match (name.as_str(), args.len()) {
                ("translate", 1) => length(0).map(|x| TransformFunction::Translate(x, LengthValue::ZERO)),
                ("translate", 2) => length(0).zip(length(1)).map(|(x, y)| TransformFunction::Translate(x, y)),
                ("translatex", 1) => length(0).map(|x| TransformFunction::Translate(x, LengthValue::ZERO)),
                ("translatey", 1) => length(0).map(|y| TransformFunction::Translate(LengthValue::ZERO, y)),
                ("scale", 1) => number(0).map(|k| TransformFunction::Scale(k, k)),
                ("scale", 2) => number(0).zip(number(1)).map(|(x, y)| TransformFunction::Scale(x, y)),
                ("rotate", 1) => match args[0] {
                    [ValueToken::Dimension { value, unit }] if unit == "deg" => {
                        Some(TransformFunction::Rotate(*value))
                    }
                    [ValueToken::Dimension { value, unit }] if unit == "turn" => {
                        Some(TransformFunction::Rotate(value * 360.0))
                    }
                    _ => None,
                },
                _ => None,
            };
            functions.push(function.ok_or_else(|| s.to_string())?);
        }
        Ok(Self(functions))
    }
}

/// [§ 6 The transform-origin property](https://www.w3.org/TR/css-transforms-1/#transform-origin-property)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOrigin {
    /// Horizontal offset.
    pub x: LengthValue,
    /// Vertical offset.
    pub y: LengthValue,
}

impl Default for TransformOrigin {
    /// "Initial: 50% 50%"
    fn default() -> Self {
        Self {
            x: LengthValue::Percent(50.0),
            y: LengthValue::Percent(50.0),
        }
    }
}

impl FromStr for TransformOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = |token: &ValueToken| -> Option<(LengthValue, Option<bool>)> {
            // (offset, Some(true) if horizontal-only, Some(false) if vertical-only)
            match token.as_ident()?.to_ascii_lowercase().as_str() {
                "left" => Some((LengthValue::Percent(0.0), Some(true))),
                "right" => Some((LengthValue::Percent(100.0), Some(true))),
                "top" => Some((LengthValue::Percent(0.0), Some(false))),
                "bottom" => Some((LengthValue::Percent(100.0), Some(false))),
                "center" => Some((LengthValue::Percent(50.0), None)),
                _ => None,
            }
        };
        let component = |token: &ValueToken| {
            keyword(token).or_else(|| LengthValue::from_token(token).map(|length| (length, None)))
        };
        let tokens = tokenize(s)?;
        let mut origin = Self::default();
        match tokens.as_slice() {
            [single] => {
                let (value, axis) = component(single).ok_or_else(|| s.to_string())?;
                if axis == Some(false) {
                    origin.y = value;
                } else {
                    origin.x = value;
                }
            }
            [first, second, ..] => {
                let (first, first_axis) = component(first).ok_or_else(|| s.to_string())?;
                let (second, second_axis) = component(second).ok_or_else(|| s.to_string())?;
                if first_axis == Some(false) || second_axis == Some(true) {
                    origin.x = second;
                    origin.y = first;
                } else {
                    origin.x = first;
                    origin.y = second;
                }
            }
            [] => return Err(s.to_string()),
        }
        Ok(origin)
    }
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Lower the baseline of the box to the proper position for subscripts"
    Sub,
    /// "Raise the baseline of the box to the proper position for superscripts"
    Super,
    /// "Align the top of the box with the top of the parent's content area"
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content area"
    TextBottom,
    /// "Align the vertical midpoint of the box with the baseline of the parent
    /// box plus half the x-height of the parent."
    Middle,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line box."
    Bottom,
    /// "Raise (positive value) or lower (negative value) the box by this distance."
    Length(LengthValue),
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Self::Baseline,
            "sub" => Self::Sub,
            "super" => Self::Super,
            "text-top" => Self::TextTop,
            "text-bottom" => Self::TextBottom,
            "middle" => Self::Middle,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => Self::Length(s.parse()?),
        };
        Ok(value)
    }
}

/// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZIndex {
    /// "The stack level of the generated box in the current stacking context is 0."
    #[default]
    Auto,
    /// "This integer is the stack level of the generated box"
    Integer(i32),
}

impl FromStr for ZIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        value.parse().map(Self::Integer).map_err(|_| s.to_string())
    }
}

/// [§ 3.2 'opacity'](https://www.w3.org/TR/css-color-4/#transparency)
///
/// "Any values outside the range 0.0 (fully transparent) to 1.0 (fully
/// opaque) will be clamped to this range."
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(pub f64);

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

impl FromStr for Opacity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match tokenize(s)?.as_slice() {
            [ValueToken::Number { value, .. }] => Ok(Self(value.clamp(0.0, 1.0))),
            [ValueToken::Percentage(value)] => Ok(Self((value / 100.0).clamp(0.0, 1.0))),
            _ => Err(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lengths() {
        assert_eq!("3px".parse(), Ok(LengthValue::Px(3.0)));
        assert_eq!("0".parse(), Ok(LengthValue::ZERO));
        assert_eq!("medium".parse(), Ok(LengthValue::Px(3.0)));
        assert_eq!("-100%".parse(), Ok(LengthValue::Percent(-100.0)));
        assert_eq!("auto".parse(), Ok(AutoLength::Auto));
        assert!("3".parse::<LengthValue>().is_err());
    }

    #[test]
    fn parses_colors() {
        assert_eq!("#f00".parse(), Ok(Color::Rgba(ColorValue::rgb(255, 0, 0))));
        assert_eq!("lime".parse(), Ok(Color::Rgba(ColorValue::rgb(0, 255, 0))));
        assert_eq!("currentColor".parse(), Ok(Color::CurrentColor));
        assert_eq!(
            "rgb(0, 0, 255)".parse(),
            Ok(Color::Rgba(ColorValue::rgb(0, 0, 255)))
        );
        assert!("#ggg".parse::<Color>().is_err());
    }

    #[test]
    fn parses_transforms() {
        assert_eq!(
            "translate(-100%, 0)".parse(),
            Ok(Transforms(vec![TransformFunction::Translate(
                LengthValue::Percent(-100.0),
                LengthValue::ZERO
            )]))
        );
        assert_eq!("none".parse(), Ok(Transforms::default()));
        assert!("skew(10deg)".parse::<Transforms>().is_err());
    }

    #[test]
    fn parses_transform_origin_keywords() {
        let origin: TransformOrigin = "top left".parse().unwrap();
        assert_eq!(origin.x, LengthValue::Percent(0.0));
        assert_eq!(origin.y, LengthValue::Percent(0.0));
    }
}
