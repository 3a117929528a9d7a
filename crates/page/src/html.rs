//! Markup loading.
//!
//! Parses markup with `tl` and converts it into a [`Dom`], then normalizes
//! the result to the `html > (head, body)` skeleton a script can rely on.
//! Metadata tags found outside `<head>` at the top level move into it;
//! everything else lands in `<body>`.

use dom::{Attr, Dom, NodeId};

use crate::error::PageError;

const HEAD_TAGS: &[&str] = &["title", "meta", "link", "style", "base"];

/// Parse `source` into a normalized document.
pub fn parse_document(source: &str) -> Result<Dom, PageError> {
    let vdom = tl::parse(source, tl::ParserOptions::default())
        .map_err(|e| PageError::Html(format!("{e:?}")))?;
    let parser = vdom.parser();

    let mut dom = Dom::new();
    let mut top = Vec::new();
    for handle in vdom.children() {
        if let Some(node) = convert(&mut dom, *handle, parser) {
            top.push(node);
        }
    }

    normalize(&mut dom, top);
    Ok(dom)
}

fn convert(dom: &mut Dom, handle: tl::NodeHandle, parser: &tl::Parser) -> Option<NodeId> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            // `<!DOCTYPE html>` and friends.
            if name.starts_with('!') {
                return None;
            }
            let attrs = tag
                .attributes()
                .iter()
                .map(|(key, value)| Attr::new(&key, value.as_deref().unwrap_or("")))
                .collect();
            let elem = dom.create_element(&name, attrs);
            for child in tag.children().top().iter() {
                if let Some(child) = convert(dom, *child, parser) {
                    dom.append_child(elem, child);
                }
            }
            Some(elem)
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if text.trim().is_empty() {
                None
            } else {
                Some(dom.create_text(&text))
            }
        }
        tl::Node::Comment(bytes) => Some(dom.create_comment(&bytes.as_utf8_str())),
    }
}

/// Ensure `document > html > (head, body)` and file `top` into it.
fn normalize(dom: &mut Dom, top: Vec<NodeId>) {
    let doc = dom.document();
    let existing_html = top.iter().copied().find(|&n| dom.tag_name(n) == Some("html"));
    let html = existing_html.unwrap_or_else(|| dom.create_html_element("html"));
    dom.append_child(doc, html);

    let children = if existing_html.is_some() { dom.children(html) } else { Vec::new() };
    let find = |dom: &Dom, tag: &str| children.iter().copied().find(|&n| dom.tag_name(n) == Some(tag));
    let head = find(dom, "head").unwrap_or_else(|| dom.create_html_element("head"));
    let body = find(dom, "body").unwrap_or_else(|| dom.create_html_element("body"));

    // Re-append in canonical order; stray children of <html> go to <body>.
    let strays: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&n| n != head && n != body)
        .collect();
    dom.append_child(html, head);
    dom.append_child(html, body);

    let loose = top.into_iter().filter(|&n| Some(n) != existing_html);
    for node in strays.into_iter().chain(loose) {
        let is_meta = dom.tag_name(node).is_some_and(|t| HEAD_TAGS.contains(&t));
        let in_head = dom.parent(node) == Some(head);
        if is_meta && !in_head {
            dom.append_child(head, node);
        } else if dom.element(node).is_some() || dom.nodes.get(node).is_some_and(|n| n.is_text()) {
            dom.append_child(body, node);
        }
    }
}
