//! Block flow layout.
//!
//! A deliberately small stand-in for a layout engine: every rendered element
//! is a block stacked below its previous sibling at the full width of its
//! parent. Heights come from, in order, the `height` / `data-height`
//! attributes, the children's stacked heights, or a per-tag default.
//! Elements with inline `position: fixed` are taken out of flow and pinned
//! to the viewport origin.
//!
//! The host can override any element's box with [`Layout::set_override`],
//! which is how tests pin exact geometry.

use std::collections::HashMap;

use dom::{Dom, NodeData, NodeId};
use geometry::Rect;

/// Height of one line of text.
pub const LINE_HEIGHT: f64 = 24.0;
/// Height of an `<img>` without a `height` attribute.
pub const DEFAULT_IMAGE_HEIGHT: f64 = 240.0;

const NON_RENDERED: &[&str] = &["head", "title", "meta", "link", "script", "style", "template"];

/// Document-space boxes for every rendered element.
#[derive(Debug, Default)]
pub struct Layout {
    boxes: HashMap<NodeId, Rect>,
    overrides: HashMap<NodeId, Rect>,
    document_height: f64,
}

impl Layout {
    /// Box of `node` in document coordinates.
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.overrides
            .get(&node)
            .or_else(|| self.boxes.get(&node))
            .copied()
    }

    /// Height of the laid-out content (bottom of the lowest in-flow box).
    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    /// Pin `node` to `rect` regardless of flow. Survives re-layout.
    pub fn set_override(&mut self, node: NodeId, rect: Rect) {
        self.overrides.insert(node, rect);
        self.document_height = self.document_height.max(rect.bottom());
    }

    pub fn forget(&mut self, node: NodeId) {
        self.boxes.remove(&node);
        self.overrides.remove(&node);
    }

    /// Recompute every box from the tree.
    pub fn compute(&mut self, dom: &Dom, width: f64) {
        self.boxes.clear();
        let mut y = 0.0;
        for child in dom.children(dom.document()) {
            y += self.flow(dom, child, 0.0, y, width);
        }
        let mut bottom = y;
        for rect in self.overrides.values() {
            bottom = bottom.max(rect.bottom());
        }
        self.document_height = bottom;
    }

    /// Lay out `node` at `(x, y)` and return the height it occupies in flow.
    fn flow(&mut self, dom: &Dom, node: NodeId, x: f64, y: f64, width: f64) -> f64 {
        let Some(n) = dom.nodes.get(node) else {
            return 0.0;
        };
        let elem = match &n.data {
            NodeData::Text { data } if !data.trim().is_empty() => return LINE_HEIGHT,
            NodeData::Element(elem) => elem,
            _ => return 0.0,
        };
        if NON_RENDERED.contains(&elem.tag_name.as_str()) {
            return 0.0;
        }

        let own_width = numeric_attr(elem.attr("width")).unwrap_or(width).min(width);

        if elem.style.get("position") == Some("fixed") {
            let h = elem
                .style
                .get("height")
                .and_then(|v| v.strip_suffix("px"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0);
            self.boxes.insert(node, Rect::new(0.0, 0.0, width, h));
            return 0.0;
        }

        let mut content = 0.0;
        for child in dom.children(node) {
            content += self.flow(dom, child, x, y + content, own_width);
        }

        let height = numeric_attr(elem.attr("height"))
            .or_else(|| numeric_attr(elem.attr("data-height")))
            .unwrap_or(if elem.tag_name == "img" {
                DEFAULT_IMAGE_HEIGHT
            } else {
                content
            });

        self.boxes.insert(node, Rect::new(x, y, own_width, height));
        height
    }
}

fn numeric_attr(value: Option<String>) -> Option<f64> {
    let value = value?;
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;

    fn page_dom() -> (Dom, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let html = dom.create_html_element("html");
        let head = dom.create_html_element("head");
        let title = dom.create_html_element("title");
        let body = dom.create_html_element("body");
        let header = dom.create_element("header", vec![Attr::new("data-height", "80")]);
        let p = dom.create_html_element("p");
        let text = dom.create_text("Hello");
        let img = dom.create_element("img", vec![Attr::new("width", "400"), Attr::new("height", "300")]);
        dom.append_child(dom.document(), html);
        dom.append_child(html, head);
        dom.append_child(head, title);
        dom.append_child(html, body);
        dom.append_child(body, header);
        dom.append_child(body, p);
        dom.append_child(p, text);
        dom.append_child(body, img);
        (dom, head, header, p, img)
    }

    #[test]
    fn blocks_stack_vertically() {
        let (dom, head, header, p, img) = page_dom();
        let mut layout = Layout::default();
        layout.compute(&dom, 1000.0);

        assert_eq!(layout.rect(head), None);
        assert_eq!(layout.rect(header), Some(Rect::new(0.0, 0.0, 1000.0, 80.0)));
        assert_eq!(layout.rect(p), Some(Rect::new(0.0, 80.0, 1000.0, LINE_HEIGHT)));
        assert_eq!(layout.rect(img), Some(Rect::new(0.0, 104.0, 400.0, 300.0)));
        assert_eq!(layout.document_height(), 404.0);
    }

    #[test]
    fn override_wins_and_extends_document() {
        let (dom, _, header, _, _) = page_dom();
        let mut layout = Layout::default();
        layout.set_override(header, Rect::new(0.0, 2000.0, 100.0, 100.0));
        layout.compute(&dom, 1000.0);
        assert_eq!(layout.rect(header), Some(Rect::new(0.0, 2000.0, 100.0, 100.0)));
        assert_eq!(layout.document_height(), 2100.0);
    }

    #[test]
    fn fixed_elements_leave_flow() {
        let (mut dom, _, header, p, _) = page_dom();
        let body = dom.body().unwrap();
        let bar = dom.create_element("div", vec![Attr::new("style", "position: fixed; height: 3px")]);
        dom.append_child(body, bar);
        let mut layout = Layout::default();
        layout.compute(&dom, 1000.0);
        assert_eq!(layout.rect(bar), Some(Rect::new(0.0, 0.0, 1000.0, 3.0)));
        assert_eq!(layout.rect(header).unwrap().y, 0.0);
        assert_eq!(layout.rect(p).unwrap().y, 80.0);
        assert_eq!(layout.document_height(), 404.0);
    }
}
