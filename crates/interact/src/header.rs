//! Header shadow on scroll.

use dom::{Event, ListenerOptions};
use page::Page;
use tracing::debug;

use crate::options::HeaderOptions;
use crate::{select_one, Behavior, Detach, Result};

/// Toggles a class on the page header depending on whether the page has
/// scrolled past a threshold.
#[derive(Clone, Debug, Default)]
pub struct HeaderShadow {
    options: HeaderOptions,
}

impl HeaderShadow {
    pub fn new(options: HeaderOptions) -> Self {
        Self { options }
    }
}

impl Behavior for HeaderShadow {
    fn name(&self) -> &'static str {
        "header"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let Some(header) = select_one(page, self.name(), &self.options.selector)? else {
            debug!(selector = %self.options.selector, "no header, skipping shadow");
            return Ok(detach);
        };

        let threshold = self.options.threshold;
        let class = self.options.class.clone();
        let window = page.window();
        detach.listener(page.add_event_listener(
            window,
            "scroll",
            ListenerOptions::PASSIVE,
            move |page: &mut Page, _: &mut Event| {
                if page.scroll_y() > threshold {
                    page.dom_mut().add_class(header, &class);
                } else {
                    page.dom_mut().remove_class(header, &class);
                }
            },
        ));
        Ok(detach)
    }
}
