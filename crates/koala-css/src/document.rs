//! Styled documents loaded from JSON.
//!
//! A document is `{ "base_url"?: string, "root": Node }`, where a node is
//! either a string (a text node) or an element object:
//!
//! ```json
//! { "tag": "p", "attrs": {"id": "x"}, "style": {"display": "list-item"},
//!   "before": {"content": "'» '"}, "children": ["text", {"tag": "em"}] }
//! ```
//!
//! Declarations are kebab-case property names mapped to CSS value strings.
//! Computed styles are produced while the tree is built: UA defaults, then
//! the element's declarations, on top of what the parent passes down.

use koala_dom::{AttributesMap, DomTree, NodeId};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cascade::{apply_declarations, blockify, resolve_attributes};
use crate::error::StyleError;
use crate::lookup::{PseudoType, StyleMap};
use crate::style::ComputedStyle;
use crate::ua_stylesheet::{ua_declarations, ua_pseudo_declarations};

/// Declarations in source order.
type Declarations = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct DocumentSource {
    #[serde(default)]
    base_url: Option<String>,
    root: NodeSource,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeSource {
    Text(String),
    Element(Box<ElementSource>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ElementSource {
    tag: String,
    #[serde(default)]
    attrs: AttributesMap,
    #[serde(default)]
    style: Declarations,
    before: Option<Declarations>,
    after: Option<Declarations>,
    marker: Option<Declarations>,
    first_letter: Option<Declarations>,
    first_line: Option<Declarations>,
    footnote_call: Option<Declarations>,
    footnote_marker: Option<Declarations>,
    #[serde(default)]
    children: Vec<NodeSource>,
}

impl ElementSource {
    fn pseudo(&self, pseudo: PseudoType) -> Option<&Declarations> {
        match pseudo {
            PseudoType::Before => self.before.as_ref(),
            PseudoType::After => self.after.as_ref(),
            PseudoType::Marker => self.marker.as_ref(),
            PseudoType::FirstLetter => self.first_letter.as_ref(),
            PseudoType::FirstLine => self.first_line.as_ref(),
            PseudoType::FootnoteCall => self.footnote_call.as_ref(),
            PseudoType::FootnoteMarker => self.footnote_marker.as_ref(),
        }
    }
}

/// An element tree together with the computed styles of its elements.
#[derive(Debug, Clone, Default)]
pub struct StyledDocument {
    /// The element tree.
    pub dom: DomTree,
    /// Computed styles by node and pseudo-element.
    pub styles: StyleMap,
    /// Base URL for resolving relative references.
    pub base_url: Option<String>,
}

impl StyledDocument {
    /// Parse a styled document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Document`] for malformed JSON or an unexpected
    /// shape, and [`StyleError::NoRootElement`] when the root is text.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let source: DocumentSource =
            serde_json::from_str(json).map_err(|err| StyleError::Document(err.to_string()))?;
        Self::from_source(source)
    }

    /// Build a styled document from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`StyledDocument::from_json`].
    pub fn from_value(value: Value) -> Result<Self, StyleError> {
        let source: DocumentSource =
            serde_json::from_value(value).map_err(|err| StyleError::Document(err.to_string()))?;
        Self::from_source(source)
    }

    fn from_source(source: DocumentSource) -> Result<Self, StyleError> {
        let NodeSource::Element(root) = source.root else {
            return Err(StyleError::NoRootElement);
        };
        let mut document = Self {
            dom: DomTree::new(),
            styles: StyleMap::new(),
            base_url: source.base_url,
        };
        document.load_element(NodeId::ROOT, None, &root);
        Ok(document)
    }

    /// Append `source` under `parent` and compute its styles, then recurse.
    fn load_element(
        &mut self,
        parent: NodeId,
        parent_style: Option<&ComputedStyle>,
        source: &ElementSource,
    ) {
        let id = self
            .dom
            .append_element(parent, &source.tag, source.attrs.clone());
        let tag_name = source.tag.to_ascii_lowercase();

        // STEP 1: Start from inherited values.
        let mut style = parent_style.map_or_else(ComputedStyle::default, ComputedStyle::inherit_from);

        // STEP 2: UA origin, then author declarations.
        apply_declarations(&mut style, parent_style, ua_declarations(&tag_name));
        apply_declarations(&mut style, parent_style, declarations(&source.style));

        // STEP 3: Computed-value fixups.
        if let Some(element) = self.dom.as_element(id) {
            resolve_attributes(&mut style, element);
        }
        blockify(
            &mut style,
            parent_style.is_none(),
            parent_style.map(ComputedStyle::display),
        );

        // STEP 4: Pseudo-elements inherit from the element.
        // "::before" and "::after" only exist when declared.
        for pseudo in PseudoType::ALL {
            let declared = source.pseudo(pseudo);
            if declared.is_none() && matches!(pseudo, PseudoType::Before | PseudoType::After) {
                continue;
            }
            let mut pseudo_style = ComputedStyle::inherit_from(&style);
            apply_declarations(
                &mut pseudo_style,
                Some(&style),
                ua_pseudo_declarations(&format!("::{pseudo}")),
            );
            if let Some(declared) = declared {
                apply_declarations(&mut pseudo_style, Some(&style), declarations(declared));
            }
            if let Some(element) = self.dom.as_element(id) {
                resolve_attributes(&mut pseudo_style, element);
            }
            self.styles.insert(id, Some(pseudo), pseudo_style);
        }

        for child in &source.children {
            match child {
                NodeSource::Text(text) => {
                    let _ = self.dom.append_text(id, text);
                }
                NodeSource::Element(element) => self.load_element(id, Some(&style), element),
            }
        }
        self.styles.insert(id, None, style);
    }
}

/// String-valued declarations; other JSON values are skipped.
fn declarations(map: &Declarations) -> impl Iterator<Item = (&str, &str)> + '_ {
    map.iter().filter_map(|(name, value)| match value {
        Value::String(value) => Some((name.as_str(), value.as_str())),
        _ => None,
    })
}
