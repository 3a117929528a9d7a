//! Companion stylesheet.
//!
//! The classes the other behaviors toggle only have a visual effect with
//! these rules in place.

use dom::Attr;
use page::Page;
use tracing::debug;

use crate::{Behavior, Detach, Result};

pub const STYLESHEET: &str = "
.visible {
  opacity: 1 !important;
  transform: translateY(0) !important;
}

.loaded {
  animation: fadeIn 0.4s ease;
}

@keyframes fadeIn {
  from { opacity: 0; }
  to { opacity: 1; }
}

header.scrolled {
  box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
}

main img {
  transition: transform 0.3s cubic-bezier(0.4, 0, 0.2, 1) !important;
  transform-style: preserve-3d;
}
";

/// Appends a `<style data-interact>` element holding [`STYLESHEET`] to the
/// document head. A document without a head gets no stylesheet.
#[derive(Clone, Copy, Debug, Default)]
pub struct StyleInjector;

impl Behavior for StyleInjector {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let Some(head) = page.dom().head() else {
            debug!("no head, skipping stylesheet");
            return Ok(detach);
        };
        let dom = page.dom_mut();
        let style = dom.create_element("style", vec![Attr::new("data-interact", "")]);
        let text = dom.create_text(STYLESHEET);
        dom.append_child(style, text);
        dom.append_child(head, style);
        detach.node(style);
        Ok(detach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog;
    use dom::Dom;
    use page::PageOptions;

    #[test]
    fn stylesheet_lands_in_head() {
        let mut page = catalog();
        let _detach = StyleInjector.attach(&mut page).unwrap();
        let style = page.query_selector("head > style[data-interact]").unwrap().unwrap();
        let css = page.dom().text_content(style);
        assert!(css.contains("header.scrolled"));
        assert!(css.contains("@keyframes fadeIn"));
        assert!(css.contains("transform-style: preserve-3d"));
    }

    #[test]
    fn styles_do_not_shift_layout() {
        let mut page = catalog();
        let before = page.scroll_height();
        let _detach = StyleInjector.attach(&mut page).unwrap();
        page.relayout();
        assert_eq!(page.scroll_height(), before);
    }

    #[test]
    fn headless_document_skips_injection() {
        let mut page = Page::new(Dom::new(), PageOptions::default());
        let detach = StyleInjector.attach(&mut page).unwrap();
        assert!(detach.is_empty());
        assert!(page.query_selector("style").unwrap().is_none());
    }
}
