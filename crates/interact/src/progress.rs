//! Scroll-progress bar.

use dom::{Attr, Event, ListenerOptions};
use page::Page;
use tracing::debug;

use crate::options::ProgressOptions;
use crate::{Behavior, Detach, Result};

pub const BAR_CLASS: &str = "scroll-progress";

/// Initial inline style of the bar.
pub const BAR_STYLE: &str = "position: fixed; top: 0; left: 0; height: 3px; \
    background: linear-gradient(90deg, #e94560, #ff6b8a); width: 0%; \
    z-index: 9999; transition: width 0.1s ease";

/// Share of the scrollable range already scrolled, in percent.
///
/// A page that cannot scroll has no range; the result is `NaN` unless
/// `clamp_unscrollable` asks for `0`.
pub fn progress_percent(
    scroll_y: f64,
    scroll_height: f64,
    client_height: f64,
    clamp_unscrollable: bool,
) -> f64 {
    let range = scroll_height - client_height;
    if clamp_unscrollable && range <= 0.0 {
        return 0.0;
    }
    scroll_y / range * 100.0
}

/// A fixed 3px bar along the top of the viewport whose width tracks how far
/// the page has been scrolled.
#[derive(Clone, Debug, Default)]
pub struct ScrollProgress {
    options: ProgressOptions,
}

impl ScrollProgress {
    pub fn new(options: ProgressOptions) -> Self {
        Self { options }
    }
}

impl Behavior for ScrollProgress {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let Some(body) = page.dom().body() else {
            debug!("no body, skipping progress bar");
            return Ok(detach);
        };

        let bar = page.dom_mut().create_element(
            "div",
            vec![Attr::new("class", BAR_CLASS), Attr::new("style", BAR_STYLE)],
        );
        page.dom_mut().append_child(body, bar);
        detach.node(bar);

        let clamp = self.options.clamp_unscrollable;
        let window = page.window();
        detach.listener(page.add_event_listener(
            window,
            "scroll",
            ListenerOptions::PASSIVE,
            move |page: &mut Page, _: &mut Event| {
                let percent =
                    progress_percent(page.scroll_y(), page.scroll_height(), page.client_height(), clamp);
                page.dom_mut().set_style_property(bar, "width", &format!("{percent}%"));
            },
        ));
        Ok(detach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog, load};
    use page::ScrollBehavior;

    fn bar(page: &Page) -> dom::NodeId {
        page.query_selector(".scroll-progress").unwrap().unwrap()
    }

    fn width(page: &Page) -> Option<&str> {
        page.dom().style_property(bar(page), "width")
    }

    #[test]
    fn bar_is_appended_to_body_with_its_style() {
        let mut page = catalog();
        let _detach = ScrollProgress::default().attach(&mut page).unwrap();
        let bar = bar(&page);
        let body = page.dom().body().unwrap();
        assert_eq!(page.dom().children(body).last(), Some(&bar));

        let style = &page.dom().element(bar).unwrap().style;
        assert_eq!(style.get("position"), Some("fixed"));
        assert_eq!(style.get("height"), Some("3px"));
        assert_eq!(style.get("background"), Some("linear-gradient(90deg, #e94560, #ff6b8a)"));
        assert_eq!(style.get("width"), Some("0%"));
        assert_eq!(style.get("z-index"), Some("9999"));
        assert_eq!(style.get("transition"), Some("width 0.1s ease"));
    }

    #[test]
    fn width_tracks_scroll() {
        let mut page = catalog();
        let _detach = ScrollProgress::default().attach(&mut page).unwrap();
        // 2000px document in a 600px viewport.
        page.scroll_to(700.0, ScrollBehavior::Instant);
        assert_eq!(width(&page), Some("50%"));
        page.scroll_to(1400.0, ScrollBehavior::Instant);
        assert_eq!(width(&page), Some("100%"));
        page.scroll_to(0.0, ScrollBehavior::Instant);
        assert_eq!(width(&page), Some("0%"));
    }

    #[test]
    fn unscrollable_page_reports_nan() {
        let mut page = load("<main><p>short</p></main>");
        let _detach = ScrollProgress::default().attach(&mut page).unwrap();
        let window = page.window();
        page.dispatch(window, &mut Event::new("scroll", false, false));
        assert_eq!(width(&page), Some("NaN%"));
    }

    #[test]
    fn clamped_unscrollable_page_reports_zero() {
        let mut page = load("<main><p>short</p></main>");
        let _detach = ScrollProgress::new(ProgressOptions {
            clamp_unscrollable: true,
            ..ProgressOptions::default()
        })
        .attach(&mut page)
        .unwrap();
        let window = page.window();
        page.dispatch(window, &mut Event::new("scroll", false, false));
        assert_eq!(width(&page), Some("0%"));
    }

    #[test]
    fn bar_does_not_take_up_flow_space() {
        let mut page = catalog();
        let _detach = ScrollProgress::default().attach(&mut page).unwrap();
        page.relayout();
        assert_eq!(page.scroll_height(), 2000.0);
    }

    #[test]
    fn detach_removes_the_bar() {
        let mut page = catalog();
        let detach = ScrollProgress::default().attach(&mut page).unwrap();
        detach.run(&mut page);
        assert_eq!(page.query_selector(".scroll-progress").unwrap(), None);
        assert_eq!(page.listener_count(), 0);
    }
}
