//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."

use koala_common::image::ImageOrientation;

use super::content::{
    Anchor, BookmarkLabel, BookmarkLevel, ContentValue, CounterIncrement, CounterValues,
    ListStyleImage, ListStyleType, Quotes, StringSet,
};
use super::display::DisplayValue;
use super::keywords::{
    Appearance, BorderCollapse, BorderStyle, BreakBetween, BreakInside, CaptionSide, Clear,
    Direction, Float, FootnoteDisplay, Hyphens, ListStylePosition, Overflow, Position,
    TextTransform, WhiteSpace,
};
use super::values::{
    AutoLength, Color, ColorValue, LengthValue, Opacity, TransformOrigin, Transforms,
    VerticalAlign, ZIndex,
};
use crate::error::StyleError;

/// A physical box side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All sides in `top right bottom left` order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

/// Declares every supported property once: its CSS name, field, type,
/// initial value, whether it is inherited and whether it belongs to the
/// table wrapper box.
macro_rules! computed_style {
    ($(
        $(#[$doc:meta])*
        $css:literal $field:ident: $ty:ty = $initial:expr, inherited: $inherited:literal, wrapper: $wrapper:literal;
    )*) => {
        /// Computed styles for an element or a box.
        ///
        /// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
        ///
        /// All values are Option - None means "not set" (use the initial value).
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct ComputedStyle {
            $(
                $(#[$doc])*
                pub $field: Option<$ty>,
            )*
        }

        impl ComputedStyle {
            $(
                #[doc = concat!("The computed `", $css, "`, or its initial value.")]
                #[must_use]
                pub fn $field(&self) -> $ty {
                    self.$field.clone().unwrap_or_else(|| $initial)
                }
            )*

            /// Every supported property name.
            pub const PROPERTY_NAMES: &'static [&'static str] = &[$($css),*];

            /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
            ///
            /// "Inherited properties ... take their value from the parent
            /// element's computed value". Everything else starts at its
            /// initial value.
            #[must_use]
            pub fn inherit_from(parent: &Self) -> Self {
                let mut style = Self::default();
                $(
                    if $inherited {
                        style.$field.clone_from(&parent.$field);
                    }
                )*
                style
            }

            /// Whether a property is inherited by default.
            #[must_use]
            pub fn is_inherited(name: &str) -> bool {
                match name {
                    $($css => $inherited,)*
                    _ => false,
                }
            }

            /// Parse and set a longhand property.
            ///
            /// # Errors
            ///
            /// Returns [`StyleError::UnknownProperty`] for unsupported names and
            /// [`StyleError::InvalidValue`] when the value does not parse.
            pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), StyleError> {
                let invalid = || StyleError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                };
                match name {
                    $(
                        $css => {
                            self.$field = Some(value.parse::<$ty>().map_err(|_| invalid())?);
                        }
                    )*
                    _ => return Err(StyleError::UnknownProperty(name.to_string())),
                }
                Ok(())
            }

            /// [§ 7.3.1 inherit](https://www.w3.org/TR/css-cascade-4/#inherit)
            ///
            /// "The inherit keyword causes the property to take the computed
            /// value of the element's parent." Unknown names are ignored.
            pub fn inherit_property(&mut self, name: &str, parent: &Self) {
                match name {
                    $($css => self.$field.clone_from(&parent.$field),)*
                    _ => {}
                }
            }

            /// [§ 7.3.1 initial](https://www.w3.org/TR/css-cascade-4/#initial)
            ///
            /// Reset a property to its initial value. Unknown names are ignored.
            pub fn reset_property(&mut self, name: &str) {
                match name {
                    $($css => self.$field = None,)*
                    _ => {}
                }
            }

            /// [§ 3.1 Table wrapper box](https://www.w3.org/TR/css-tables-3/#table-wrapper-box)
            ///
            /// "The computed values of properties 'position', 'float',
            /// 'margin-*', 'top', 'right', 'bottom', and 'left' on the table
            /// element are used on the table wrapper box and not the table
            /// box; all other values of non-inheritable properties are used
            /// on the table box and not the table wrapper box."
            ///
            /// `self` is the wrapper's style; moved properties are reset to
            /// their initial values on `table`.
            pub fn move_table_wrapper_properties(&mut self, table: &mut Self) {
                $(
                    if $wrapper {
                        self.$field = table.$field.take();
                    }
                )*
            }
        }
    };
}

computed_style! {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    "display" display: DisplayValue = DisplayValue::inline(), inherited: false, wrapper: false;
    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    "float" float: Float = Float::None, inherited: false, wrapper: true;
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    "position" position: Position = Position::Static, inherited: false, wrapper: true;
    /// [§ 2.4 'footnote-display'](https://www.w3.org/TR/css-gcpm-3/#footnote-display)
    "footnote-display" footnote_display: FootnoteDisplay = FootnoteDisplay::Block, inherited: false, wrapper: false;
    /// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
    "white-space" white_space: WhiteSpace = WhiteSpace::Normal, inherited: true, wrapper: false;
    /// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
    "text-transform" text_transform: TextTransform = TextTransform::None, inherited: true, wrapper: false;
    /// [§ 6.1 'hyphens'](https://www.w3.org/TR/css-text-3/#hyphens-property)
    "hyphens" hyphens: Hyphens = Hyphens::Manual, inherited: true, wrapper: false;
    /// [§ 2.1 'direction'](https://www.w3.org/TR/css-writing-modes-4/#direction)
    "direction" direction: Direction = Direction::Ltr, inherited: true, wrapper: false;
    /// [§ 5 'appearance'](https://www.w3.org/TR/css-ui-4/#appearance-switching)
    "appearance" appearance: Appearance = Appearance::None, inherited: false, wrapper: false;
    /// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    "overflow" overflow: Overflow = Overflow::Visible, inherited: false, wrapper: true;
    /// [§ 1.2 'content'](https://www.w3.org/TR/css-content-3/#content-property)
    "content" content: ContentValue = ContentValue::Normal, inherited: false, wrapper: false;
    /// [§ 3.1 'quotes'](https://www.w3.org/TR/css-content-3/#quotes-property)
    "quotes" quotes: Quotes = Quotes::Auto, inherited: true, wrapper: false;
    /// [§ 4.2 'counter-reset'](https://www.w3.org/TR/css-lists-3/#counter-reset)
    "counter-reset" counter_reset: CounterValues = CounterValues::default(), inherited: false, wrapper: true;
    /// [§ 4.2 'counter-set'](https://www.w3.org/TR/css-lists-3/#increment-counter)
    "counter-set" counter_set: CounterValues = CounterValues::default(), inherited: false, wrapper: true;
    /// [§ 4.2 'counter-increment'](https://www.w3.org/TR/css-lists-3/#increment-counter)
    "counter-increment" counter_increment: CounterIncrement = CounterIncrement::Auto, inherited: false, wrapper: true;
    /// [§ 3.1 'list-style-type'](https://www.w3.org/TR/css-lists-3/#text-markers)
    "list-style-type" list_style_type: ListStyleType = ListStyleType::default(), inherited: true, wrapper: false;
    /// [§ 3.3 'list-style-position'](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
    "list-style-position" list_style_position: ListStylePosition = ListStylePosition::Outside, inherited: true, wrapper: false;
    /// [§ 3.2 'list-style-image'](https://www.w3.org/TR/css-lists-3/#image-markers)
    "list-style-image" list_style_image: ListStyleImage = ListStyleImage::None, inherited: true, wrapper: false;
    /// [§ 1.1 'string-set'](https://www.w3.org/TR/css-gcpm-3/#setting-named-strings-the-string-set-pro)
    "string-set" string_set: StringSet = StringSet::default(), inherited: false, wrapper: false;
    /// [§ 3.1 'bookmark-label'](https://www.w3.org/TR/css-gcpm-3/#bookmark-label)
    "bookmark-label" bookmark_label: BookmarkLabel = BookmarkLabel::default(), inherited: false, wrapper: false;
    /// [§ 3.2 'bookmark-level'](https://www.w3.org/TR/css-gcpm-3/#bookmark-level)
    "bookmark-level" bookmark_level: BookmarkLevel = BookmarkLevel::None, inherited: false, wrapper: false;
    /// Link target name.
    "anchor" anchor: Anchor = Anchor::None, inherited: false, wrapper: false;
    /// [§ 17.4.1 'caption-side'](https://www.w3.org/TR/CSS2/tables.html#caption-position)
    "caption-side" caption_side: CaptionSide = CaptionSide::Top, inherited: true, wrapper: false;
    /// [§ 17.6 'border-collapse'](https://www.w3.org/TR/CSS2/tables.html#borders)
    "border-collapse" border_collapse: BorderCollapse = BorderCollapse::Separate, inherited: true, wrapper: false;
    /// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
    "border-top-style" border_top_style: BorderStyle = BorderStyle::None, inherited: false, wrapper: false;
    /// Right border style.
    "border-right-style" border_right_style: BorderStyle = BorderStyle::None, inherited: false, wrapper: false;
    /// Bottom border style.
    "border-bottom-style" border_bottom_style: BorderStyle = BorderStyle::None, inherited: false, wrapper: false;
    /// Left border style.
    "border-left-style" border_left_style: BorderStyle = BorderStyle::None, inherited: false, wrapper: false;
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    /// "Initial: medium"
    "border-top-width" border_top_width: LengthValue = LengthValue::Px(3.0), inherited: false, wrapper: false;
    /// Right border width.
    "border-right-width" border_right_width: LengthValue = LengthValue::Px(3.0), inherited: false, wrapper: false;
    /// Bottom border width.
    "border-bottom-width" border_bottom_width: LengthValue = LengthValue::Px(3.0), inherited: false, wrapper: false;
    /// Left border width.
    "border-left-width" border_left_width: LengthValue = LengthValue::Px(3.0), inherited: false, wrapper: false;
    /// [§ 8.5.2 Border color](https://www.w3.org/TR/CSS2/box.html#border-color-properties)
    /// "Initial: currentcolor"
    "border-top-color" border_top_color: Color = Color::CurrentColor, inherited: false, wrapper: false;
    /// Right border color.
    "border-right-color" border_right_color: Color = Color::CurrentColor, inherited: false, wrapper: false;
    /// Bottom border color.
    "border-bottom-color" border_bottom_color: Color = Color::CurrentColor, inherited: false, wrapper: false;
    /// Left border color.
    "border-left-color" border_left_color: Color = Color::CurrentColor, inherited: false, wrapper: false;
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    "color" color: ColorValue = ColorValue::BLACK, inherited: true, wrapper: false;
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    "margin-top" margin_top: AutoLength = AutoLength::Length(LengthValue::ZERO), inherited: false, wrapper: true;
    /// Right margin.
    "margin-right" margin_right: AutoLength = AutoLength::Length(LengthValue::ZERO), inherited: false, wrapper: true;
    /// Bottom margin.
    "margin-bottom" margin_bottom: AutoLength = AutoLength::Length(LengthValue::ZERO), inherited: false, wrapper: true;
    /// Left margin.
    "margin-left" margin_left: AutoLength = AutoLength::Length(LengthValue::ZERO), inherited: false, wrapper: true;
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    "padding-top" padding_top: LengthValue = LengthValue::ZERO, inherited: false, wrapper: false;
    /// Right padding.
    "padding-right" padding_right: LengthValue = LengthValue::ZERO, inherited: false, wrapper: false;
    /// Bottom padding.
    "padding-bottom" padding_bottom: LengthValue = LengthValue::ZERO, inherited: false, wrapper: false;
    /// Left padding.
    "padding-left" padding_left: LengthValue = LengthValue::ZERO, inherited: false, wrapper: false;
    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    "width" width: AutoLength = AutoLength::Auto, inherited: false, wrapper: false;
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    "top" top: AutoLength = AutoLength::Auto, inherited: false, wrapper: true;
    /// Right offset.
    "right" right: AutoLength = AutoLength::Auto, inherited: false, wrapper: true;
    /// Bottom offset.
    "bottom" bottom: AutoLength = AutoLength::Auto, inherited: false, wrapper: true;
    /// Left offset.
    "left" left: AutoLength = AutoLength::Auto, inherited: false, wrapper: true;
    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    "clear" clear: Clear = Clear::None, inherited: false, wrapper: true;
    /// [§ 3.1 'break-before'](https://www.w3.org/TR/css-break-3/#break-between)
    "break-before" break_before: BreakBetween = BreakBetween::Auto, inherited: false, wrapper: true;
    /// [§ 3.1 'break-after'](https://www.w3.org/TR/css-break-3/#break-between)
    "break-after" break_after: BreakBetween = BreakBetween::Auto, inherited: false, wrapper: true;
    /// [§ 3.2 'break-inside'](https://www.w3.org/TR/css-break-3/#break-within)
    "break-inside" break_inside: BreakInside = BreakInside::Auto, inherited: false, wrapper: true;
    /// [§ 3.2 'opacity'](https://www.w3.org/TR/css-color-4/#transparency)
    "opacity" opacity: Opacity = Opacity::default(), inherited: false, wrapper: true;
    /// [§ 5 'transform'](https://www.w3.org/TR/css-transforms-1/#transform-property)
    "transform" transform: Transforms = Transforms::default(), inherited: false, wrapper: true;
    /// [§ 6 'transform-origin'](https://www.w3.org/TR/css-transforms-1/#transform-origin-property)
    "transform-origin" transform_origin: TransformOrigin = TransformOrigin::default(), inherited: false, wrapper: true;
    /// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
    "vertical-align" vertical_align: VerticalAlign = VerticalAlign::Baseline, inherited: false, wrapper: true;
    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    "z-index" z_index: ZIndex = ZIndex::Auto, inherited: false, wrapper: true;
    /// [§ 5.1 'image-orientation'](https://www.w3.org/TR/css-images-3/#the-image-orientation)
    "image-orientation" image_orientation: ImageOrientation = ImageOrientation::FromImage, inherited: true, wrapper: false;
}

impl ComputedStyle {
    /// The computed border style of one side.
    #[must_use]
    pub fn border_style(&self, side: Side) -> BorderStyle {
        match side {
            Side::Top => self.border_top_style(),
            Side::Right => self.border_right_style(),
            Side::Bottom => self.border_bottom_style(),
            Side::Left => self.border_left_style(),
        }
    }

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    ///
    /// The computed border width in pixels: "the computed border width is
    /// zero" when the style is `none` or `hidden`.
    #[must_use]
    pub fn border_width(&self, side: Side) -> f64 {
        if matches!(self.border_style(side), BorderStyle::None | BorderStyle::Hidden) {
            return 0.0;
        }
        let width = match side {
            Side::Top => self.border_top_width(),
            Side::Right => self.border_right_width(),
            Side::Bottom => self.border_bottom_width(),
            Side::Left => self.border_left_width(),
        };
        width.to_px()
    }

    /// The border color of one side with `currentcolor` resolved.
    #[must_use]
    pub fn border_color(&self, side: Side) -> ColorValue {
        let color = match side {
            Side::Top => self.border_top_color(),
            Side::Right => self.border_right_color(),
            Side::Bottom => self.border_bottom_color(),
            Side::Left => self.border_left_color(),
        };
        color.resolve(self.color())
    }

    /// Style for an anonymous box: inherited properties from `parent`,
    /// initial values for the rest.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box. Non-inherited properties have their initial value."
    #[must_use]
    pub fn anonymous_from(parent: &Self) -> Self {
        Self::inherit_from(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_properties_use_initial_values() {
        let style = ComputedStyle::default();
        assert_eq!(style.display(), DisplayValue::inline());
        assert_eq!(style.border_top_width(), LengthValue::Px(3.0));
        assert!((style.border_width(Side::Top) - 0.0).abs() < f64::EPSILON);
        assert_eq!(style.counter_increment(), CounterIncrement::Auto);
    }

    #[test]
    fn inherits_only_inherited_properties() {
        let mut parent = ComputedStyle::default();
        parent.set_property("white-space", "pre").unwrap();
        parent.set_property("display", "block").unwrap();
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.white_space(), WhiteSpace::Pre);
        assert_eq!(child.display(), DisplayValue::inline());
    }

    #[test]
    fn rejects_invalid_values() {
        let mut style = ComputedStyle::default();
        assert_eq!(
            style.set_property("display", "tabel"),
            Err(StyleError::InvalidValue {
                name: "display".to_string(),
                value: "tabel".to_string()
            })
        );
        assert!(matches!(
            style.set_property("colour", "red"),
            Err(StyleError::UnknownProperty(_))
        ));
    }

    #[test]
    fn moves_wrapper_properties() {
        let mut table = ComputedStyle::default();
        table.set_property("margin-top", "1px").unwrap();
        table.set_property("padding-top", "2px").unwrap();
        let mut wrapper = ComputedStyle::default();
        wrapper.move_table_wrapper_properties(&mut table);
        assert_eq!(wrapper.margin_top(), AutoLength::Length(LengthValue::Px(1.0)));
        assert_eq!(table.margin_top(), AutoLength::Length(LengthValue::ZERO));
        assert_eq!(table.padding_top(), LengthValue::Px(2.0));
        assert_eq!(wrapper.padding_top(), LengthValue::ZERO);
    }

    #[test]
    fn border_width_reads_style_and_color() {
        let mut style = ComputedStyle::default();
        style.set_property("border-left-style", "solid").unwrap();
        style.set_property("border-left-width", "thick").unwrap();
        style.set_property("color", "red").unwrap();
        assert!((style.border_width(Side::Left) - 5.0).abs() < f64::EPSILON);
        assert_eq!(style.border_color(Side::Left), ColorValue::rgb(255, 0, 0));
    }

    #[test]
    fn property_names_are_unique() {
        let names: std::collections::HashSet<_> = ComputedStyle::PROPERTY_NAMES.iter().collect();
        assert_eq!(names.len(), ComputedStyle::PROPERTY_NAMES.len());
        assert!(ComputedStyle::PROPERTY_NAMES.contains(&"counter-reset"));
        assert!(
            ComputedStyle::PROPERTY_NAMES
                .iter()
                .filter(|name| ComputedStyle::is_inherited(name))
                .all(|name| *name != "display")
        );
    }
}
