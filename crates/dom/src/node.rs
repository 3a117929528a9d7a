//! DOM node model.
//!
//! All nodes live in an `Arena<Node>` and are referenced by `NodeId` (a typed
//! generational index). The tree structure is encoded via parent/child/sibling
//! links stored directly on each node.

use crate::style::InlineStyle;

/// A handle into the arena that uniquely identifies a DOM node.
pub type NodeId = arena::Id<Node>;

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// A single attribute on an element (e.g. `href="#intro"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element data
// ---------------------------------------------------------------------------

/// Data specific to element nodes.
///
/// `class` and `style` are held in their parsed forms (`classes`, `style`)
/// and are not duplicated in `attrs`; [`ElementData::attr`] still answers
/// for them.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementData {
    pub tag_name: String,
    pub attrs: Vec<Attr>,
    /// Cached `id` attribute value for fast lookup.
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub style: InlineStyle,
}

impl ElementData {
    /// Build element data, splitting `class` and `style` out of `attrs`.
    /// Tag names are stored lowercase.
    pub fn new(tag_name: &str, attrs: Vec<Attr>) -> Self {
        let mut elem = Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::with_capacity(attrs.len()),
            id: None,
            classes: Vec::new(),
            style: InlineStyle::default(),
        };
        for attr in attrs {
            elem.set_attr(&attr.name, &attr.value);
        }
        elem
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match name {
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "style" if !self.style.is_empty() => Some(self.style.css_text()),
            _ => self
                .attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.clone()),
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "class" => {
                self.classes = value.split_whitespace().map(String::from).collect();
                return;
            }
            "style" => {
                self.style = InlineStyle::parse(value);
                return;
            }
            "id" => self.id = Some(value.to_string()),
            _ => {}
        }
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attr::new(name, value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// `classList.add`. Returns `true` if the class was not already present.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    /// `classList.remove`. Returns `true` if the class was present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }
}

// ---------------------------------------------------------------------------
// Node data (variant per node type)
// ---------------------------------------------------------------------------

/// The payload that distinguishes different kinds of DOM nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text { data: String },
    Comment { data: String },
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single node in the DOM tree.
///
/// Tree links (`parent`, `first_child`, …) form an intrusive doubly-linked
/// child list so that insertions and removals are O(1).
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,

    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Create a new detached node.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}
