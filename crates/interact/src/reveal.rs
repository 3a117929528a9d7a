//! Reveal-on-intersect.
//!
//! Content elements start hidden and shifted down, each with a transition
//! delay one stagger step longer than the previous. The first time an element
//! is seen intersecting the (bottom-inset) viewport it gets the reveal class
//! and is no longer observed, so a reveal happens at most once per element.

use page::{IntersectionEntry, ObserverId, ObserverOptions, Page};
use tracing::{debug, trace};

use crate::options::RevealOptions;
use crate::{css_number, select_all, Behavior, Detach, Result};

#[derive(Clone, Debug, Default)]
pub struct Reveal {
    options: RevealOptions,
}

impl Reveal {
    pub fn new(options: RevealOptions) -> Self {
        Self { options }
    }

    /// Inline `transition` for the element at `index` in document order.
    pub fn transition(&self, index: usize) -> String {
        let duration = css_number(self.options.duration_s);
        let delay = css_number(index as f64 * self.options.stagger_ms / 1000.0);
        format!("opacity {duration}s ease {delay}s, transform {duration}s ease {delay}s")
    }
}

impl Behavior for Reveal {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let targets = select_all(page, self.name(), &self.options.selector)?;
        if targets.is_empty() {
            debug!(selector = %self.options.selector, "nothing to reveal");
            return Ok(detach);
        }

        let class = self.options.class.clone();
        let observer = page.create_observer(
            ObserverOptions {
                threshold: self.options.threshold,
                root_margin: self.options.root_margin,
            },
            move |page: &mut Page, entries: &[IntersectionEntry], me: ObserverId| {
                for entry in entries.iter().filter(|e| e.is_intersecting) {
                    trace!(target = ?entry.target, ratio = entry.intersection_ratio, "revealed");
                    page.dom_mut().add_class(entry.target, &class);
                    page.unobserve(me, entry.target);
                }
            },
        );
        detach.observer(observer);

        let offset = format!("translateY({}px)", css_number(self.options.offset_px));
        for (index, &target) in targets.iter().enumerate() {
            let dom = page.dom_mut();
            dom.set_style_property(target, "opacity", "0");
            dom.set_style_property(target, "transform", &offset);
            dom.set_style_property(target, "transition", &self.transition(index));
            page.observe(observer, target);
        }
        debug!(count = targets.len(), "reveal targets observed");
        Ok(detach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{by_id, catalog};
    use page::{ScrollBehavior, FRAME_MS};

    fn attached() -> (Page, Detach) {
        let mut page = catalog();
        let detach = Reveal::default().attach(&mut page).unwrap();
        (page, detach)
    }

    fn visible(page: &Page, id: &str) -> bool {
        page.dom().has_class(by_id(page, id), "visible")
    }

    #[test]
    fn targets_start_hidden_with_staggered_delays() {
        let (page, _detach) = attached();
        let order = ["a", "h", "b", "pic1", "c", "pic2"];
        for (index, id) in order.iter().enumerate() {
            let node = by_id(&page, id);
            assert_eq!(page.dom().style_property(node, "opacity"), Some("0"));
            assert_eq!(page.dom().style_property(node, "transform"), Some("translateY(20px)"));
            let delay = ["0", "0.1", "0.2", "0.3", "0.4", "0.5"][index];
            assert_eq!(
                page.dom().style_property(node, "transition").map(str::to_string),
                Some(format!("opacity 0.6s ease {delay}s, transform 0.6s ease {delay}s")),
            );
        }
    }

    #[test]
    fn first_frame_reveals_what_is_on_screen() {
        let (mut page, _detach) = attached();
        assert!(!visible(&page, "a"), "no reveal before a frame");

        page.advance(FRAME_MS);
        // `b` shows 46 of its 400px above the 50px bottom inset: 11.5%.
        for id in ["a", "h", "b"] {
            assert!(visible(&page, id), "{id}");
        }
        for id in ["pic1", "c", "pic2"] {
            assert!(!visible(&page, id), "{id}");
        }
    }

    #[test]
    fn scrolling_reveals_the_rest() {
        let (mut page, _detach) = attached();
        page.settle();
        page.scroll_to(400.0, ScrollBehavior::Instant);
        assert!(visible(&page, "pic1"));
        assert!(!visible(&page, "c"));

        page.scroll_to(1400.0, ScrollBehavior::Instant);
        assert!(visible(&page, "c"));
        assert!(visible(&page, "pic2"));
    }

    #[test]
    fn below_threshold_does_not_reveal() {
        let (mut page, _detach) = attached();
        page.settle();
        // pic1 spans 904..1204; the inset root ends at 364 + 550 = 914, so
        // 10 of 300px (3%) are visible.
        page.scroll_to(364.0, ScrollBehavior::Instant);
        assert!(!visible(&page, "pic1"));
    }

    #[test]
    fn reveal_is_one_shot() {
        let (mut page, detach) = attached();
        page.settle();
        let a = by_id(&page, "a");
        assert!(visible(&page, "a"));

        page.scroll_to(1400.0, ScrollBehavior::Instant);
        page.scroll_to(0.0, ScrollBehavior::Instant);
        assert!(visible(&page, "a"), "leaving the viewport keeps the class");
        assert_eq!(
            page.dom().style_property(a, "transition"),
            Some("opacity 0.6s ease 0s, transform 0.6s ease 0s"),
        );

        // Every target has been revealed and unobserved.
        page.scroll_to(1400.0, ScrollBehavior::Instant);
        detach.run(&mut page);
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn unobserves_after_reveal() {
        let (mut page, detach) = attached();
        let observer = detach.observers()[0];
        let a = by_id(&page, "a");
        let pic2 = by_id(&page, "pic2");
        assert!(page.is_observing(observer, a));

        page.settle();
        assert!(!page.is_observing(observer, a));
        assert!(page.is_observing(observer, pic2));
    }

    #[test]
    fn custom_stagger() {
        let reveal = Reveal::new(RevealOptions {
            stagger_ms: 250.0,
            duration_s: 1.0,
            ..RevealOptions::default()
        });
        assert_eq!(reveal.transition(3), "opacity 1s ease 0.75s, transform 1s ease 0.75s");
    }

    #[test]
    fn empty_selection_is_a_noop() {
        let mut page = crate::testing::load("<p>plain</p>");
        let detach = Reveal::default().attach(&mut page).unwrap();
        assert!(detach.is_empty());
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn bad_selector_is_an_error() {
        let mut page = catalog();
        let err = Reveal::new(RevealOptions {
            selector: "main >".into(),
            ..RevealOptions::default()
        })
        .attach(&mut page)
        .unwrap_err();
        assert!(err.to_string().starts_with("reveal:"), "{err}");
    }
}
