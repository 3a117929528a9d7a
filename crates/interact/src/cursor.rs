//! Pointer cursor over interactive elements.

use dom::{Event, ListenerOptions, NodeId};
use page::Page;
use tracing::debug;

use crate::options::CursorOptions;
use crate::{select_all, Behavior, Detach, Result};

/// Sets the body's inline `cursor` to `pointer` while the pointer is over a
/// link, button or image, and back to `default` when it leaves one. Each
/// element writes unconditionally, so the last enter or leave wins.
#[derive(Clone, Debug, Default)]
pub struct CursorAffordance {
    options: CursorOptions,
}

impl CursorAffordance {
    pub fn new(options: CursorOptions) -> Self {
        Self { options }
    }
}

fn set_body_cursor(page: &mut Page, body: NodeId, cursor: &str) {
    page.dom_mut().set_style_property(body, "cursor", cursor);
}

impl Behavior for CursorAffordance {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let Some(body) = page.dom().body() else {
            debug!("no body, skipping cursor affordance");
            return Ok(detach);
        };

        for el in select_all(page, self.name(), &self.options.selector)? {
            detach.listener(page.add_event_listener(
                el,
                "mouseenter",
                ListenerOptions::PERSISTENT,
                move |page: &mut Page, _: &mut Event| set_body_cursor(page, body, "pointer"),
            ));
            detach.listener(page.add_event_listener(
                el,
                "mouseleave",
                ListenerOptions::PERSISTENT,
                move |page: &mut Page, _: &mut Event| set_body_cursor(page, body, "default"),
            ));
        }
        Ok(detach)
    }
}
