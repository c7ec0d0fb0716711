//! Element tree consumed by the Koala box-tree builder.
//!
//! The builder only reads the tree: it walks elements in
//! [tree order](https://dom.spec.whatwg.org/#concept-tree-order), reads tag
//! names and attributes, and collects text. Trees are built once by the
//! styled-document loader and never mutated afterwards.
//!
//! # Design
//!
//! Nodes live in a single arena and refer to each other by [`NodeId`]. The
//! builder keys styles, anchors and generated boxes by these ids.

use std::collections::HashMap;

/// Attribute names and values of one element.
pub type AttributesMap = HashMap<String, String>;

/// Index of a node in its [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node, parent of the document element.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node holds.
    pub node_type: NodeType,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent".
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// The node kinds a styled document can hold.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document itself, always [`NodeId::ROOT`].
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    ///
    /// Raw text: white space is processed on the boxes, not here.
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    ///
    /// Comments generate no box.
    Comment(String),
}

/// Tag name and attributes of an element.
///
/// NOTE: Namespaces are not modelled. Inline `svg` is recognised by its
/// local name.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased local name.
    pub tag_name: String,
    /// Attributes, with their values unmodified.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// The raw value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// [§ 2.3.4.1 Signed integers](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#signed-integers)
    ///
    /// Read an integer attribute, clamped to at least `minimum`.
    ///
    /// A missing or unparsable value gives 1, the default of every
    /// span-like table attribute (`span`, `colspan`, `rowspan`).
    #[must_use]
    pub fn integer_attribute(&self, name: &str, minimum: i32) -> i32 {
        self.attribute(name)
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map_or(1, |value| value.max(minimum))
    }
}

/// An arena of nodes rooted at a document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The node with `id`, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the document node included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Add a node as the last child of `parent`. The node is still created
    /// when `parent` is not in the tree, but stays detached.
    fn append(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        let attached = parent.0 < self.nodes.len();
        self.nodes.push(Node {
            node_type,
            parent: attached.then_some(parent),
            children: Vec::new(),
        });
        if attached {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Append an element to `parent`. The tag name is lowercased.
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str, attrs: AttributesMap) -> NodeId {
        let data = ElementData {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        };
        self.append(parent, NodeType::Element(data))
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeType::Text(text.to_string()))
    }

    /// Append a comment to `parent`.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeType::Comment(text.to_string()))
    }

    /// The parent of a node, `None` for the document and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// The children of a node, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// The element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some())
    }

    /// [§ 4.2.6 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
    ///
    /// "In tree order is preorder, depth-first traversal of a tree."
    ///
    /// `id` followed by all its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// The element data of an element node.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// The data of a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|element| element.tag_name.as_str())
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Preorder iterator over a subtree, see [`DomTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}
