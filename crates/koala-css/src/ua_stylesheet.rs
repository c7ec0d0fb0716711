//! User-Agent Stylesheet
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! [CSS Cascading § 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//!
//! UA rules have the lowest priority in the cascade: any author declaration
//! overrides a UA declaration. Only type selectors, the universal selector
//! and bare pseudo-element selectors are used, so rules are indexed by
//! selector text instead of being matched.

use std::collections::HashMap;
use std::sync::OnceLock;

/// [WHATWG HTML § 15.3 Rendering: Suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// Default CSS rules for HTML elements, restricted to the properties that
/// shape the box tree.
const UA_CSS: &str = r#"
/* [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements) */
/* "The following elements must have their 'display' property set to 'none'." */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
/* "The following elements must have their 'display' property set to 'block'." */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp {
    display: block;
}

/* "listing, plaintext, pre, xmp { white-space: pre; }" */
listing, plaintext, pre, xmp {
    white-space: pre;
}

/* [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists) */
li {
    display: list-item;
}

ol {
    list-style-type: decimal;
}

ul, menu, dir {
    list-style-type: disc;
}

/* [CSS Lists § 4.5 The Implicit list-item Counter](https://www.w3.org/TR/css-lists-3/#list-item-counter) */
ol, ul, menu, dir {
    counter-reset: list-item;
}

/* [§ 15.3.8 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2) */
table {
    display: table;
    border-collapse: separate;
}

caption {
    display: table-caption;
}

colgroup {
    display: table-column-group;
}

col {
    display: table-column;
}

thead {
    display: table-header-group;
}

tbody {
    display: table-row-group;
}

tfoot {
    display: table-footer-group;
}

tr {
    display: table-row;
}

td, th {
    display: table-cell;
}

/* [CSS GCPM § 5 Cross references](https://www.w3.org/TR/css-gcpm-3/#cross-references) */
* {
    anchor: attr(id);
}

/* [CSS GCPM § 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes) */
::footnote-call {
    content: counter(footnote);
    vertical-align: super;
}

::footnote-marker {
    content: counter(footnote) ". ";
    list-style-position: inside;
}
"#;

/// Declarations indexed by selector (`p`, `*`, `::marker`).
type UaRules = HashMap<String, Vec<(String, String)>>;

fn ua_rules() -> &'static UaRules {
    static RULES: OnceLock<UaRules> = OnceLock::new();
    RULES.get_or_init(|| parse_rules(UA_CSS))
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
///
/// A minimal rule reader for the stylesheet above: comments are dropped,
/// each `selectors { declarations }` block is split on commas and
/// semicolons.
fn parse_rules(css: &str) -> UaRules {
    let mut without_comments = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        without_comments.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        rest = match after.find("*/") {
            Some(end) => &after[end + 2..],
            None => "",
        };
    }
    without_comments.push_str(rest);

    let mut rules = UaRules::new();
    for block in without_comments.split('}') {
        let Some((selectors, body)) = block.split_once('{') else {
            continue;
        };
        let declarations: Vec<(String, String)> = body
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();
        for selector in selectors.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            rules
                .entry(selector.to_string())
                .or_default()
                .extend(declarations.iter().cloned());
        }
    }
    rules
}

/// UA declarations for an element, in cascade order (universal rules
/// first).
pub fn ua_declarations(tag_name: &str) -> impl Iterator<Item = (&'static str, &'static str)> {
    let rules = ua_rules();
    ["*", tag_name]
        .into_iter()
        .filter_map(move |selector| rules.get(selector))
        .flatten()
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

/// UA declarations for a pseudo-element, `selector` being `::marker` and
/// the like.
pub fn ua_pseudo_declarations(selector: &str) -> impl Iterator<Item = (&'static str, &'static str)> {
    ua_rules()
        .get(selector)
        .into_iter()
        .flatten()
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_use_table_display() {
        let declarations: Vec<_> = ua_declarations("td").collect();
        assert!(declarations.contains(&("display", "table-cell")));
        assert!(declarations.contains(&("anchor", "attr(id)")));
    }

    #[test]
    fn comments_are_not_selectors() {
        assert!(ua_rules().keys().all(|selector| !selector.contains("/*")));
        assert!(ua_declarations("span").all(|(name, _)| name == "anchor"));
    }

    #[test]
    fn footnote_call_has_counter_content() {
        let declarations: Vec<_> = ua_pseudo_declarations("::footnote-call").collect();
        assert!(declarations.contains(&("content", "counter(footnote)")));
    }
}
