//! DOM tree operations.
//!
//! The [`Dom`] struct owns an `Arena<Node>` and provides tree-manipulation
//! methods that keep the intrusive parent/child/sibling links consistent.

use arena::Arena;

use crate::node::{Attr, ElementData, Node, NodeData, NodeId};
use crate::selector::SelectorList;

// ---------------------------------------------------------------------------
// Dom
// ---------------------------------------------------------------------------

/// The complete DOM tree. A document node is created up front and is the
/// root every query starts from.
pub struct Dom {
    pub nodes: Arena<Node>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let document = nodes.insert(Node::new(NodeData::Document));
        Self { nodes, document }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    // =======================================================================
    // Node creation
    // =======================================================================

    pub fn create_element(&mut self, tag_name: &str, attrs: Vec<Attr>) -> NodeId {
        let elem = ElementData::new(tag_name, attrs);
        self.nodes.insert(Node::new(NodeData::Element(elem)))
    }

    /// Convenience: create an element with no attributes.
    pub fn create_html_element(&mut self, tag_name: &str) -> NodeId {
        self.create_element(tag_name, Vec::new())
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Text {
            data: data.to_string(),
        }))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Comment {
            data: data.to_string(),
        }))
    }

    // =======================================================================
    // Tree mutation
    // =======================================================================

    /// Append `child` as the last child of `parent`.
    ///
    /// If `child` already has a parent it is first removed from its current
    /// position.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child).is_some() {
            self.detach(child);
        }

        let old_last = self.nodes.get(parent).and_then(|n| n.last_child);

        if let Some(old_last_node) = old_last.and_then(|id| self.nodes.get_mut(id)) {
            old_last_node.next_sibling = Some(child);
        }

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = old_last;
            child_node.next_sibling = None;
        }

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = Some(child);
            }
            parent_node.last_child = Some(child);
        }
    }

    /// Remove `child` from `parent`'s child list; a no-op if it is not a child
    /// of `parent`. The child becomes a detached root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Detach `node` and free it together with its whole subtree.
    /// Ids into the removed subtree go stale.
    pub fn remove_subtree(&mut self, node: NodeId) {
        self.detach(node);
        for id in self.descendants(node) {
            self.nodes.remove(id);
        }
        self.nodes.remove(node);
    }

    /// Detach a node from its parent without freeing it.
    fn detach(&mut self, node_id: NodeId) {
        let (parent_id, prev, next) = match self.nodes.get(node_id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if let Some(prev_node) = prev.and_then(|id| self.nodes.get_mut(id)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|id| self.nodes.get_mut(id)) {
            next_node.prev_sibling = prev;
        }

        if let Some(parent_node) = parent_id.and_then(|id| self.nodes.get_mut(id)) {
            if parent_node.first_child == Some(node_id) {
                parent_node.first_child = next;
            }
            if parent_node.last_child == Some(node_id) {
                parent_node.last_child = prev;
            }
        }

        if let Some(node) = self.nodes.get_mut(node_id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Nearest ancestor that is an element (the document node is skipped).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|&p| self.element(p).is_some())
    }

    /// Immediate children of `parent` in document order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(parent).and_then(|n| n.first_child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.nodes.get(id).and_then(|n| n.next_sibling);
        }
        out
    }

    /// Ancestors from the direct parent up to (and including) the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.parent(id);
        }
        out
    }

    /// All descendants of `node` in pre-order (document order), not including
    /// `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Whether `node` is attached under the document.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.document || self.ancestors(node).last() == Some(&self.document)
    }

    // =======================================================================
    // Element access
    // =======================================================================

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.nodes.get(node).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(node).and_then(Node::as_element_mut)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class))
    }

    /// Returns `true` if the class was newly added.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.add_class(class))
    }

    /// Returns `true` if the class was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        self.element_mut(node).is_some_and(|e| e.remove_class(class))
    }

    pub fn style_property(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.style.get(name))
    }

    pub fn set_style_property(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(node) {
            e.style.set(name, value);
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| match &self.nodes.get(id)?.data {
                NodeData::Text { data } => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    // =======================================================================
    // Queries
    // =======================================================================

    /// The `<html>` element, if present.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.document)
            .into_iter()
            .find(|&id| self.element(id).is_some())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.root_section("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.root_section("body")
    }

    fn root_section(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    /// First element with the given `id` attribute under `root` (inclusive).
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// `querySelectorAll`: matching elements strictly below `root`, in
    /// document order, each reported once.
    pub fn query_selector_all(&self, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| selectors.matches(self, n))
            .collect()
    }

    /// `querySelector`: the first match in document order.
    pub fn query_selector(&self, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&n| selectors.matches(self, n))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
