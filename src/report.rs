//! Plain-text summary of the page state a run leaves behind.

use std::fmt;

use dom::NodeId;
use interact::Options;
use page::Page;

/// One element of interest with its classes and selected inline styles.
#[derive(Debug, PartialEq)]
pub struct ElementLine {
    pub label: String,
    pub classes: Vec<String>,
    pub styles: Vec<(String, String)>,
}

#[derive(Debug, PartialEq)]
pub struct Report {
    pub scroll_y: f64,
    pub max_scroll: f64,
    pub elements: Vec<ElementLine>,
}

const SHOWN_STYLES: &[&str] = &["opacity", "transform", "cursor", "width"];

impl Report {
    pub fn collect(page: &Page, options: &Options) -> Self {
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut push = |found: Vec<NodeId>| {
            for node in found {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        };
        // Selectors have already been validated by installation.
        let selectors = [
            options.header.selector.as_str(),
            "body",
            options.reveal.selector.as_str(),
            options.images.selector.as_str(),
            ".scroll-progress",
        ];
        for selector in selectors {
            push(page.query_selector_all(selector).unwrap_or_default());
        }

        let elements = nodes
            .into_iter()
            .filter_map(|node| {
                let elem = page.dom().element(node)?;
                let mut label = elem.tag_name.clone();
                if let Some(id) = &elem.id {
                    label.push('#');
                    label.push_str(id);
                }
                let styles = SHOWN_STYLES
                    .iter()
                    .filter_map(|&name| Some((name.to_string(), elem.style.get(name)?.to_string())))
                    .collect();
                Some(ElementLine {
                    label,
                    classes: elem.classes.clone(),
                    styles,
                })
            })
            .collect();

        Self {
            scroll_y: page.scroll_y(),
            max_scroll: page.max_scroll(),
            elements,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scroll: {}/{}", self.scroll_y, self.max_scroll)?;
        for line in &self.elements {
            write!(f, "{}", line.label)?;
            for class in &line.classes {
                write!(f, ".{class}")?;
            }
            for (name, value) in &line.styles {
                write!(f, " {name}={value:?}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
