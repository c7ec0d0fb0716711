//! Integration tests for CSS style types.

use koala_css::{
    AutoLength, BuiltinCounterStyles, ColorValue, ComputedStyle, ContentToken, ContentValue,
    CounterStyleRenderer, DisplayValue, LengthValue, ListStyleType, Side,
};

#[test]
fn test_color_from_hex_6() {
    let color = ColorValue::from_hex("#ff0000").unwrap();
    assert_eq!(
        color,
        ColorValue {
            r: 255,
            g: 0,
            b: 0,
            a: 255
        }
    );
}

#[test]
fn test_color_from_hex_mixed_case() {
    let color = ColorValue::from_hex("#FfA500").unwrap();
    assert_eq!(color, ColorValue::rgb(255, 165, 0));
}

#[test]
fn test_color_from_hex_with_alpha() {
    let color = ColorValue::from_hex("#0000ff80").unwrap();
    assert_eq!(color.a, 0x80);
    assert_eq!(color.to_hex_string(), "#0000ff80");
}

#[test]
fn test_color_from_named() {
    assert_eq!(ColorValue::from_named("BLACK"), Some(ColorValue::BLACK));
    assert_eq!(ColorValue::from_named("transparent"), Some(ColorValue::TRANSPARENT));
    assert_eq!(ColorValue::from_named("unknown"), None);
}

#[test]
fn test_absolute_units_convert_to_px() {
    // [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    // "1in = 2.54cm = 96px", "1pt = 1/72th of 1in"
    assert_eq!("1in".parse(), Ok(LengthValue::Px(96.0)));
    assert_eq!("72pt".parse(), Ok(LengthValue::Px(96.0)));
    assert_eq!("2em".parse::<LengthValue>().unwrap().to_px(), 32.0);
}

#[test]
fn test_auto_length() {
    // [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
    let auto: AutoLength = "auto".parse().unwrap();
    assert!(auto.is_auto());
    let len: AutoLength = "20px".parse().unwrap();
    assert_eq!(len, AutoLength::Length(LengthValue::Px(20.0)));
}

#[test]
fn test_display_round_trips_through_text() {
    for keyword in ["block flow", "inline flow-root", "block flow list-item", "table-cell"] {
        let display: DisplayValue = keyword.parse().unwrap();
        assert_eq!(display.to_string(), keyword);
    }
}

#[test]
fn test_content_with_every_counter_function() {
    let content: ContentValue =
        "counters(section, '.', upper-roman) target-counter(url(#x), page) leader(space)"
            .parse()
            .unwrap();
    let ContentValue::List(tokens) = content else {
        panic!("expected a content list");
    };
    assert_eq!(
        tokens[0],
        ContentToken::Counters {
            name: "section".to_string(),
            separator: ".".to_string(),
            style: "upper-roman".to_string(),
        }
    );
    assert!(matches!(&tokens[1], ContentToken::TargetCounter { name, .. } if name == "page"));
    assert_eq!(tokens[2], ContentToken::Leader(" ".to_string()));
}

#[test]
fn test_border_width_is_zero_without_style() {
    let mut style = ComputedStyle::default();
    style.set_property("border-top-width", "10px").unwrap();
    assert_eq!(style.border_width(Side::Top), 0.0);
    style.set_property("border-top-style", "double").unwrap();
    assert_eq!(style.border_width(Side::Top), 10.0);
}

#[test]
fn test_counter_styles() {
    let styles = BuiltinCounterStyles;
    assert_eq!(styles.render_value(-3, "decimal-leading-zero"), "-03");
    assert_eq!(styles.render_value(27, "upper-alpha"), "AA");
    assert_eq!(
        styles.render_marker(&ListStyleType::Named("circle".to_string()), 1),
        "\u{25e6} "
    );
}
