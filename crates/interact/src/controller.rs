//! Installation of the whole behavior set.

use std::cell::RefCell;
use std::rc::Rc;

use dom::{Event, ListenerId, ListenerOptions};
use page::{Page, ReadyState};
use tracing::{debug, info, warn};

use crate::error::InteractError;
use crate::options::Options;
use crate::{
    Behavior, CursorAffordance, Detach, HeaderShadow, ImageTracker, Result, Reveal,
    ScrollProgress, SmoothAnchors, StyleInjector,
};

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    /// Waiting for `DOMContentLoaded`.
    Pending(ListenerId),
    Installed(Detach),
}

/// Owns the options and the installation state for one page.
///
/// [`Interactivity::install`] initializes exactly once: immediately if the
/// document has finished parsing, otherwise from a one-shot
/// `DOMContentLoaded` listener.
#[derive(Debug)]
pub struct Interactivity {
    options: Rc<Options>,
    state: Rc<RefCell<State>>,
}

impl Interactivity {
    pub fn new(options: Options) -> Self {
        Self {
            options: Rc::new(options),
            state: Rc::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The enabled behaviors, in installation order.
    pub fn behaviors(&self) -> Vec<Box<dyn Behavior>> {
        build_behaviors(&self.options)
    }

    pub fn is_installed(&self) -> bool {
        matches!(*self.state.borrow(), State::Installed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), State::Pending(_))
    }

    pub fn install(&self, page: &mut Page) -> Result<()> {
        if !matches!(*self.state.borrow(), State::Idle) {
            return Err(InteractError::AlreadyInstalled);
        }

        if page.ready_state() == ReadyState::Loading {
            let options = Rc::clone(&self.options);
            let state = Rc::clone(&self.state);
            let window = page.window();
            let id = page.add_event_listener(
                window,
                "DOMContentLoaded",
                ListenerOptions::ONCE,
                move |page: &mut Page, _: &mut Event| match init(&options, page) {
                    Ok(detach) => *state.borrow_mut() = State::Installed(detach),
                    Err(err) => {
                        warn!(%err, "deferred initialization failed");
                        *state.borrow_mut() = State::Idle;
                    }
                },
            );
            debug!("document still loading, deferring initialization");
            *self.state.borrow_mut() = State::Pending(id);
            return Ok(());
        }

        let detach = init(&self.options, page)?;
        *self.state.borrow_mut() = State::Installed(detach);
        Ok(())
    }

    /// Remove everything [`Interactivity::install`] registered. Classes
    /// already applied to page elements stay.
    pub fn uninstall(&self, page: &mut Page) {
        match self.state.take() {
            State::Idle => {}
            State::Pending(id) => {
                page.remove_event_listener(id);
            }
            State::Installed(detach) => detach.run(page),
        }
    }
}

impl Default for Interactivity {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

fn build_behaviors(options: &Options) -> Vec<Box<dyn Behavior>> {
    let mut behaviors: Vec<Box<dyn Behavior>> = Vec::new();
    if options.inject_styles {
        behaviors.push(Box::new(StyleInjector));
    }
    if options.header.enabled {
        behaviors.push(Box::new(HeaderShadow::new(options.header.clone())));
    }
    if options.reveal.enabled {
        behaviors.push(Box::new(Reveal::new(options.reveal.clone())));
    }
    if options.images.enabled {
        behaviors.push(Box::new(ImageTracker::new(options.images.clone())));
    }
    if options.anchors.enabled {
        behaviors.push(Box::new(SmoothAnchors::new(options.anchors.clone())));
    }
    if options.cursor.enabled {
        behaviors.push(Box::new(CursorAffordance::new(options.cursor.clone())));
    }
    if options.progress.enabled {
        behaviors.push(Box::new(ScrollProgress::new(options.progress.clone())));
    }
    behaviors
}

/// Attach every enabled behavior. On failure, whatever was already attached
/// is detached again before the error is returned.
fn init(options: &Options, page: &mut Page) -> Result<Detach> {
    let mut detach = Detach::default();
    for behavior in build_behaviors(options) {
        match behavior.attach(page) {
            Ok(part) => {
                debug!(behavior = behavior.name(), "attached");
                detach.merge(part);
            }
            Err(err) => {
                detach.run(page);
                return Err(err);
            }
        }
    }
    info!(
        listeners = detach.listeners().len(),
        observers = detach.observers().len(),
        "interactivity initialized"
    );
    Ok(detach)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{by_id, catalog, CATALOG};
    use dom::{Attr, Dom};
    use page::{PageOptions, ScrollBehavior, Viewport};

    fn loading_page() -> Page {
        Page::from_html(
            CATALOG,
            PageOptions {
                viewport: Viewport::new(800.0, 600.0),
                ready_state: ReadyState::Loading,
                ..PageOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn installs_immediately_when_ready() {
        let mut page = catalog();
        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        assert!(interactivity.is_installed());
        assert!(page.query_selector(".scroll-progress").unwrap().is_some());
        assert!(page.dom().has_class(by_id(&page, "pic1"), "loading"));
    }

    #[test]
    fn defers_until_dom_content_loaded() {
        let mut page = loading_page();
        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        assert!(interactivity.is_pending());
        assert!(page.query_selector(".scroll-progress").unwrap().is_none());

        page.set_ready_state(ReadyState::Interactive);
        assert!(interactivity.is_installed());
        assert_eq!(page.query_selector_all(".scroll-progress").unwrap().len(), 1);
    }

    #[test]
    fn initializes_exactly_once() {
        let mut page = loading_page();
        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        assert!(matches!(
            interactivity.install(&mut page),
            Err(InteractError::AlreadyInstalled)
        ));

        page.set_ready_state(ReadyState::Interactive);
        // A stray second DOMContentLoaded finds no listener left.
        let window = page.window();
        page.dispatch(window, &mut Event::new("DOMContentLoaded", true, false));
        assert_eq!(page.query_selector_all(".scroll-progress").unwrap().len(), 1);
        assert_eq!(page.query_selector_all("style[data-interact]").unwrap().len(), 1);
    }

    #[test]
    fn behaviors_follow_options() {
        let mut options = Options::default();
        assert_eq!(
            Interactivity::new(options.clone())
                .behaviors()
                .iter()
                .map(|b| b.name())
                .collect::<Vec<_>>(),
            ["styles", "header", "reveal", "images", "anchors", "cursor", "progress"]
        );

        options.inject_styles = false;
        options.progress.enabled = false;
        let names: Vec<_> = Interactivity::new(options)
            .behaviors()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, ["header", "reveal", "images", "anchors", "cursor"]);
    }

    #[test]
    fn failed_install_leaves_nothing_behind() {
        let mut page = catalog();
        let mut options = Options::default();
        options.cursor.selector = "a,".into();
        let interactivity = Interactivity::new(options);

        let err = interactivity.install(&mut page).unwrap_err();
        assert!(err.to_string().starts_with("cursor:"), "{err}");
        assert!(!interactivity.is_installed());
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.observer_count(), 0);
        assert!(page.query_selector("style[data-interact]").unwrap().is_none());
    }

    #[test]
    fn missing_head_still_wires_the_other_behaviors() {
        // html > body > (header, main > div), no head
        let mut dom = Dom::new();
        let html = dom.create_html_element("html");
        let body = dom.create_html_element("body");
        let header = dom.create_html_element("header");
        let main = dom.create_html_element("main");
        let tall = dom.create_element("div", vec![Attr::new("data-height", "2000")]);
        dom.append_child(dom.document(), html);
        dom.append_child(html, body);
        dom.append_child(body, header);
        dom.append_child(body, main);
        dom.append_child(main, tall);
        let mut page = Page::new(
            dom,
            PageOptions { viewport: Viewport::new(800.0, 600.0), ..PageOptions::default() },
        );

        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        assert!(interactivity.is_installed());
        assert!(page.query_selector("style").unwrap().is_none());
        assert!(page.query_selector(".scroll-progress").unwrap().is_some());

        page.scroll_to(200.0, ScrollBehavior::Instant);
        assert!(page.dom().has_class(header, "scrolled"));
    }

    #[test]
    fn uninstall_detaches_everything() {
        let mut page = catalog();
        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        page.scroll_to(100.0, ScrollBehavior::Instant);
        let header = page.query_selector("header").unwrap().unwrap();

        interactivity.uninstall(&mut page);
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.observer_count(), 0);
        assert!(page.query_selector(".scroll-progress").unwrap().is_none());
        assert!(page.dom().has_class(header, "scrolled"));
    }

    #[test]
    fn uninstall_while_pending_cancels() {
        let mut page = loading_page();
        let interactivity = Interactivity::default();
        interactivity.install(&mut page).unwrap();
        interactivity.uninstall(&mut page);
        page.set_ready_state(ReadyState::Interactive);
        assert!(!interactivity.is_installed());
        assert!(page.query_selector(".scroll-progress").unwrap().is_none());
    }

    #[test]
    fn full_page_walkthrough() {
        let mut page = catalog();
        Interactivity::default().install(&mut page).unwrap();
        page.settle();

        let header = page.query_selector("header").unwrap().unwrap();
        let bar = page.query_selector(".scroll-progress").unwrap().unwrap();
        assert!(page.dom().has_class(by_id(&page, "a"), "visible"));
        assert!(!page.dom().has_class(by_id(&page, "c"), "visible"));

        page.click(by_id(&page, "to-c"));
        page.settle();
        assert_eq!(page.scroll_y(), 1204.0);
        assert!(page.dom().has_class(header, "scrolled"));
        assert!(page.dom().has_class(by_id(&page, "c"), "visible"));
        assert_eq!(page.dom().style_property(bar, "width"), Some("86%"));

        let pic2 = by_id(&page, "pic2");
        page.complete_image(pic2);
        assert!(page.dom().has_class(pic2, "loaded"));
    }
}
