//! Smooth same-page anchor scrolling.

use dom::{Event, ListenerOptions};
use page::{Page, ScrollBehavior};
use tracing::debug;

use crate::options::AnchorOptions;
use crate::{select_all, Behavior, Detach, Result};

/// Replaces the jump of a same-page link with a smooth scroll that brings
/// the target's top edge to the top of the viewport.
///
/// The link's `href` is used as a selector. A fragment that does not parse
/// (a bare `#`) or matches nothing leaves the page where it is.
#[derive(Clone, Debug, Default)]
pub struct SmoothAnchors {
    options: AnchorOptions,
}

impl SmoothAnchors {
    pub fn new(options: AnchorOptions) -> Self {
        Self { options }
    }
}

impl Behavior for SmoothAnchors {
    fn name(&self) -> &'static str {
        "anchors"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let behavior = if self.options.smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        };

        for anchor in select_all(page, self.name(), &self.options.selector)? {
            detach.listener(page.add_event_listener(
                anchor,
                "click",
                ListenerOptions::PERSISTENT,
                move |page: &mut Page, event: &mut Event| {
                    event.prevent_default();
                    let Some(href) = page.dom().element(anchor).and_then(|e| e.attr("href")) else {
                        return;
                    };
                    match page.query_selector(&href) {
                        Ok(Some(target)) => {
                            page.scroll_into_view(target, behavior);
                        }
                        Ok(None) => debug!(%href, "anchor target not found"),
                        Err(err) => debug!(%href, %err, "anchor href is not a selector"),
                    }
                },
            ));
        }
        Ok(detach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{by_id, catalog};

    fn attached() -> (Page, Detach) {
        let mut page = catalog();
        let detach = SmoothAnchors::default().attach(&mut page).unwrap();
        (page, detach)
    }

    #[test]
    fn click_scrolls_smoothly_to_target_top() {
        let (mut page, _detach) = attached();
        let link = by_id(&page, "to-c");

        assert!(!page.click(link), "default navigation is prevented");
        assert!(page.is_scrolling());
        assert_eq!(page.scroll_y(), 0.0);

        page.settle();
        // `c` is laid out at y = 1204.
        assert_eq!(page.scroll_y(), 1204.0);
        let c = by_id(&page, "c");
        assert_eq!(page.bounding_client_rect(c).unwrap().y, 0.0);
    }

    #[test]
    fn target_near_the_bottom_is_clamped() {
        let mut page = catalog();
        let _detach = SmoothAnchors::default().attach(&mut page).unwrap();
        let pic2 = by_id(&page, "pic2");
        page.dom_mut().element_mut(pic2).unwrap().set_attr("id", "tail");
        let link = by_id(&page, "to-c");
        page.dom_mut().element_mut(link).unwrap().set_attr("href", "#tail");

        page.click(link);
        page.settle();
        assert_eq!(page.scroll_y(), page.max_scroll());
    }

    #[test]
    fn missing_target_leaves_scroll_alone() {
        let (mut page, _detach) = attached();
        page.scroll_to(300.0, ScrollBehavior::Instant);
        let gone = by_id(&page, "gone");

        assert!(!page.click(gone));
        page.settle();
        assert_eq!(page.scroll_y(), 300.0);
    }

    #[test]
    fn bare_hash_is_a_quiet_noop() {
        let (mut page, _detach) = attached();
        page.scroll_to(300.0, ScrollBehavior::Instant);
        let bare = by_id(&page, "bare");

        assert!(!page.click(bare));
        page.settle();
        assert_eq!(page.scroll_y(), 300.0);
    }

    #[test]
    fn instant_mode_jumps() {
        let mut page = catalog();
        let _detach = SmoothAnchors::new(AnchorOptions {
            smooth: false,
            ..AnchorOptions::default()
        })
        .attach(&mut page)
        .unwrap();
        page.click(by_id(&page, "to-c"));
        assert!(!page.is_scrolling());
        assert_eq!(page.scroll_y(), 1204.0);
    }

    #[test]
    fn every_fragment_link_is_wired() {
        let (page, detach) = attached();
        // home, to-c, bare, gone
        assert_eq!(detach.listeners().len(), 4);
        assert_eq!(page.listener_count(), 4);
    }
}
