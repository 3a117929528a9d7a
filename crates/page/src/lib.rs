//! # Page Crate
//!
//! The live document a page script runs against. A [`Page`] owns the DOM,
//! the listeners registered on it, the viewport and scroll position, a block
//! flow layout, intersection observers, image completion state and the
//! document ready state.
//!
//! Everything is single-threaded and driven by the host: user input arrives
//! through [`Page::scroll_to`], [`Page::pointer_move`], [`Page::click`] and
//! friends, and time passes only through [`Page::advance`]. Each frame steps
//! the smooth-scroll animation and then delivers intersection entries.

#![forbid(unsafe_code)]

pub mod error;
pub mod html;
pub mod layout;
pub mod observer;
pub mod viewport;

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use dom::{
    dispatch_event, Dom, Event, EventHost, EventTargetMap, ListenerId, ListenerOptions, NodeId,
    SelectorList,
};
use geometry::Rect;
use tracing::{debug, trace};

pub use error::{PageError, Result};
pub use layout::Layout;
pub use observer::{IntersectionEntry, ObserverId, ObserverOptions};
pub use viewport::{ScrollAnimation, ScrollBehavior, Viewport};

use observer::Observer;

/// Duration of one animation frame.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

// ─────────────────────────────────────────────────────────────────────────────
// ReadyState
// ─────────────────────────────────────────────────────────────────────────────

/// `document.readyState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// Markup is still being parsed; `DOMContentLoaded` has not fired.
    Loading,
    Interactive,
    Complete,
}

// ─────────────────────────────────────────────────────────────────────────────
// PageOptions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageOptions {
    pub viewport: Viewport,
    /// Duration of a smooth scroll.
    pub smooth_scroll_ms: f64,
    pub ready_state: ReadyState,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            smooth_scroll_ms: 300.0,
            ready_state: ReadyState::Complete,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page
// ─────────────────────────────────────────────────────────────────────────────

pub struct Page {
    dom: Dom,
    listeners: EventTargetMap<Page>,
    viewport: Viewport,
    layout: Layout,
    observers: BTreeMap<ObserverId, Observer>,
    next_observer_id: u64,
    complete_images: HashSet<NodeId>,
    ready_state: ReadyState,
    scroll_animation: Option<ScrollAnimation>,
    smooth_scroll_ms: f64,
    clock_ms: f64,
}

impl EventHost for Page {
    fn dom(&self) -> &Dom {
        &self.dom
    }

    fn listeners(&self) -> &EventTargetMap<Self> {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut EventTargetMap<Self> {
        &mut self.listeners
    }
}

impl Page {
    /// Wrap an existing tree and lay it out.
    ///
    /// Images without a `src` start complete, as they do in a browser;
    /// everything else waits for [`Page::complete_image`].
    pub fn new(dom: Dom, options: PageOptions) -> Self {
        let complete_images = dom
            .descendants(dom.document())
            .into_iter()
            .filter(|&n| {
                dom.element(n)
                    .is_some_and(|e| e.tag_name == "img" && !e.has_attr("src"))
            })
            .collect();
        let mut page = Self {
            dom,
            listeners: EventTargetMap::new(),
            viewport: options.viewport,
            layout: Layout::default(),
            observers: BTreeMap::new(),
            next_observer_id: 1,
            complete_images,
            ready_state: options.ready_state,
            scroll_animation: None,
            smooth_scroll_ms: options.smooth_scroll_ms,
            clock_ms: 0.0,
        };
        page.relayout();
        page
    }

    /// Parse markup and build a page from it.
    pub fn from_html(source: &str, options: PageOptions) -> Result<Self> {
        let dom = html::parse_document(source)?;
        Ok(Self::new(dom, options))
    }

    // =======================================================================
    // Accessors
    // =======================================================================

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Mutable tree access. Call [`Page::relayout`] after structural changes
    /// that should move boxes.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    /// The node window-level events (`scroll`, `DOMContentLoaded`) target.
    pub fn window(&self) -> NodeId {
        self.dom.document()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Milliseconds of page time elapsed through [`Page::advance`].
    pub fn now(&self) -> f64 {
        self.clock_ms
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // =======================================================================
    // Queries
    // =======================================================================

    /// `document.querySelector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let list = parse_selector(selector)?;
        Ok(self.dom.query_selector(self.dom.document(), &list))
    }

    /// `document.querySelectorAll`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = parse_selector(selector)?;
        Ok(self.dom.query_selector_all(self.dom.document(), &list))
    }

    // =======================================================================
    // Events
    // =======================================================================

    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        type_: &str,
        options: ListenerOptions,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&mut Page, &mut Event) + 'static,
    {
        self.listeners.add_listener(node, type_, options, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove_listener(id)
    }

    /// Dispatch `event` at `target`. Returns `false` if a listener prevented
    /// the default action.
    pub fn dispatch(&mut self, target: NodeId, event: &mut Event) -> bool {
        trace!(type_ = %event.type_, ?target, "dispatch");
        dispatch_event(self, target, event)
    }

    /// Detach `node` from the tree and free it with everything attached to it.
    pub fn remove_node(&mut self, node: NodeId) {
        for id in std::iter::once(node).chain(self.dom.descendants(node)) {
            self.listeners.remove_node(id);
            self.layout.forget(id);
            self.complete_images.remove(&id);
            for observer in self.observers.values_mut() {
                observer.targets.retain(|(t, _)| *t != id);
            }
        }
        self.dom.remove_subtree(node);
    }

    // =======================================================================
    // Ready state
    // =======================================================================

    /// Advance `document.readyState`. Entering `Interactive` from `Loading`
    /// fires `DOMContentLoaded` on the document; moving backwards is ignored.
    pub fn set_ready_state(&mut self, state: ReadyState) {
        if state <= self.ready_state {
            return;
        }
        let previous = self.ready_state;
        self.ready_state = state;
        debug!(?previous, ?state, "ready state changed");
        if previous == ReadyState::Loading {
            let window = self.window();
            self.dispatch(window, &mut Event::new("DOMContentLoaded", true, false));
        }
    }

    // =======================================================================
    // Layout & geometry
    // =======================================================================

    /// Recompute the flow layout, clamp the scroll offset to the new extent
    /// and re-evaluate observers.
    pub fn relayout(&mut self) {
        self.layout.compute(&self.dom, self.viewport.client_width);
        let max = self.max_scroll();
        if self.viewport.scroll_y > max {
            self.viewport.scroll_y = max;
        }
        self.flush_observers();
    }

    /// Pin an element's document-space box, overriding flow layout.
    pub fn set_layout_box(&mut self, node: NodeId, rect: Rect) {
        self.layout.set_override(node, rect);
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Box in document coordinates.
    pub fn document_rect(&self, node: NodeId) -> Option<Rect> {
        self.layout.rect(node)
    }

    /// `getBoundingClientRect`: box in viewport coordinates. Fixed boxes do
    /// not move with the scroll offset.
    pub fn bounding_client_rect(&self, node: NodeId) -> Option<Rect> {
        let rect = self.layout.rect(node)?;
        let fixed = self.dom.style_property(node, "position") == Some("fixed");
        Some(if fixed { rect } else { rect.translate(0.0, -self.viewport.scroll_y) })
    }

    /// `documentElement.scrollHeight` (never less than the client height).
    pub fn scroll_height(&self) -> f64 {
        self.layout.document_height().max(self.viewport.client_height)
    }

    pub fn client_height(&self) -> f64 {
        self.viewport.client_height
    }

    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    /// Largest reachable scroll offset; zero for pages that fit the viewport.
    pub fn max_scroll(&self) -> f64 {
        self.scroll_height() - self.viewport.client_height
    }

    // =======================================================================
    // Scrolling
    // =======================================================================

    /// `window.scrollTo`. The target is clamped to `[0, max_scroll]`.
    /// A smooth scroll replaces any scroll animation already in flight.
    pub fn scroll_to(&mut self, y: f64, behavior: ScrollBehavior) {
        let target = y.clamp(0.0, self.max_scroll());
        match behavior {
            ScrollBehavior::Instant => {
                self.scroll_animation = None;
                self.set_scroll(target);
            }
            ScrollBehavior::Smooth => {
                if target == self.viewport.scroll_y {
                    self.scroll_animation = None;
                    return;
                }
                debug!(from = self.viewport.scroll_y, to = target, "smooth scroll");
                self.scroll_animation = Some(ScrollAnimation::new(
                    self.viewport.scroll_y,
                    target,
                    self.smooth_scroll_ms,
                ));
            }
        }
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.viewport.scroll_y + dy, ScrollBehavior::Instant);
    }

    /// `element.scrollIntoView({ block: "start" })`. Returns `false` when the
    /// node has no box.
    pub fn scroll_into_view(&mut self, node: NodeId, behavior: ScrollBehavior) -> bool {
        match self.layout.rect(node) {
            Some(rect) => {
                self.scroll_to(rect.y, behavior);
                true
            }
            None => false,
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll_animation.is_some()
    }

    /// Move the scroll offset and notify `scroll` listeners if it changed.
    fn set_scroll(&mut self, y: f64) {
        if y == self.viewport.scroll_y {
            return;
        }
        self.viewport.scroll_y = y;
        let window = self.window();
        self.dispatch(window, &mut Event::new("scroll", false, false));
        self.flush_observers();
    }

    // =======================================================================
    // Time
    // =======================================================================

    /// Let `ms` of page time pass, one frame at a time.
    pub fn advance(&mut self, ms: f64) {
        let mut remaining = ms;
        while remaining > 0.0 {
            let dt = remaining.min(FRAME_MS);
            remaining -= dt;
            self.frame(dt);
        }
    }

    /// Run frames until no scroll animation is in flight.
    pub fn settle(&mut self) {
        self.frame(0.0);
        while self.scroll_animation.is_some() {
            self.frame(FRAME_MS);
        }
    }

    fn frame(&mut self, dt: f64) {
        self.clock_ms += dt;
        if let Some(mut anim) = self.scroll_animation.take() {
            let y = anim.step(dt);
            if !anim.is_finished() {
                self.scroll_animation = Some(anim);
            }
            self.set_scroll(y);
        }
        self.flush_observers();
    }

    // =======================================================================
    // Pointer & click
    // =======================================================================

    /// Client-space center of `node`, for synthesizing pointer events.
    fn client_center(&self, node: NodeId) -> (f64, f64) {
        let c = self
            .bounding_client_rect(node)
            .map(|r| r.center())
            .unwrap_or_default();
        (c.x, c.y)
    }

    /// Pointer enters `node`: `mouseenter` (does not bubble).
    pub fn pointer_enter(&mut self, node: NodeId) {
        let (x, y) = self.client_center(node);
        self.dispatch(node, &mut Event::pointer("mouseenter", false, x, y));
    }

    /// Pointer moves over `node` to client position `(x, y)`: `mousemove`.
    pub fn pointer_move(&mut self, node: NodeId, x: f64, y: f64) {
        self.dispatch(node, &mut Event::pointer("mousemove", true, x, y));
    }

    /// Pointer leaves `node`: `mouseleave` (does not bubble).
    pub fn pointer_leave(&mut self, node: NodeId) {
        let (x, y) = self.client_center(node);
        self.dispatch(node, &mut Event::pointer("mouseleave", false, x, y));
    }

    /// Activate `node`. Unless a listener prevents it, clicking a same-page
    /// link jumps to the element whose id matches the fragment (the top of
    /// the page for `#` or `#top`). Returns `false` if default was prevented.
    pub fn click(&mut self, node: NodeId) -> bool {
        let (x, y) = self.client_center(node);
        let mut event = Event::pointer("click", true, x, y);
        if !self.dispatch(node, &mut event) {
            return false;
        }
        if let Some(fragment) = self.link_fragment(node) {
            self.navigate_to_fragment(&fragment);
        }
        true
    }

    /// Fragment of the nearest enclosing `<a href="#…">`.
    fn link_fragment(&self, node: NodeId) -> Option<String> {
        std::iter::once(node)
            .chain(self.dom.ancestors(node))
            .find_map(|n| {
                let elem = self.dom.element(n)?;
                if elem.tag_name != "a" {
                    return None;
                }
                elem.attr("href")?.strip_prefix('#').map(str::to_string)
            })
    }

    fn navigate_to_fragment(&mut self, fragment: &str) {
        let target = self.dom.get_element_by_id(self.dom.document(), fragment);
        match target {
            Some(node) => {
                self.scroll_into_view(node, ScrollBehavior::Instant);
            }
            None if fragment.is_empty() || fragment.eq_ignore_ascii_case("top") => {
                self.scroll_to(0.0, ScrollBehavior::Instant);
            }
            None => debug!(fragment, "no element for fragment"),
        }
    }

    // =======================================================================
    // Images
    // =======================================================================

    /// `img.complete`.
    pub fn is_image_complete(&self, node: NodeId) -> bool {
        self.complete_images.contains(&node)
    }

    /// Finish loading an image and fire `load` on it. No-op for non-images
    /// and images that are already complete.
    pub fn complete_image(&mut self, node: NodeId) {
        if self.dom.tag_name(node) != Some("img") || !self.complete_images.insert(node) {
            return;
        }
        self.dispatch(node, &mut Event::new("load", false, false));
    }

    /// Mark every image complete without firing `load`, as if they were all
    /// served from cache before any script ran.
    pub fn preload_images(&mut self) {
        for node in self.dom.descendants(self.dom.document()) {
            if self.dom.tag_name(node) == Some("img") {
                self.complete_images.insert(node);
            }
        }
    }

    // =======================================================================
    // Intersection observers
    // =======================================================================

    /// `new IntersectionObserver(callback, options)`.
    pub fn create_observer<F>(&mut self, options: ObserverOptions, callback: F) -> ObserverId
    where
        F: Fn(&mut Page, &[IntersectionEntry], ObserverId) + 'static,
    {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.insert(id, Observer::new(options, Rc::new(callback)));
        id
    }

    /// Start watching `target`. The first entry arrives on the next frame.
    pub fn observe(&mut self, observer: ObserverId, target: NodeId) {
        if let Some(obs) = self.observers.get_mut(&observer) {
            if !obs.targets.iter().any(|(t, _)| *t == target) {
                obs.targets.push((target, None));
            }
        }
    }

    pub fn unobserve(&mut self, observer: ObserverId, target: NodeId) {
        if let Some(obs) = self.observers.get_mut(&observer) {
            obs.targets.retain(|(t, _)| *t != target);
        }
    }

    /// Whether `observer` is still watching `target`.
    pub fn is_observing(&self, observer: ObserverId, target: NodeId) -> bool {
        self.observers
            .get(&observer)
            .is_some_and(|o| o.targets.iter().any(|(t, _)| *t == target))
    }

    /// Drop an observer and all of its targets.
    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    /// Evaluate every observer and deliver changed entries.
    fn flush_observers(&mut self) {
        let ids: Vec<ObserverId> = self.observers.keys().copied().collect();
        for id in ids {
            let Some(obs) = self.observers.get(&id) else {
                continue;
            };
            let root = self.viewport.client_rect().outset(obs.options.root_margin);
            let threshold = obs.options.threshold;
            let callback = Rc::clone(&obs.callback);

            let mut entries = Vec::new();
            let mut updates = Vec::new();
            for &(target, last) in &obs.targets {
                let Some(client) = self.bounding_client_rect(target) else {
                    continue;
                };
                let (hit, ratio) = observer::is_intersecting(client, root, threshold);
                if last != Some(hit) {
                    updates.push((target, hit));
                    entries.push(IntersectionEntry {
                        target,
                        is_intersecting: hit,
                        intersection_ratio: ratio,
                        bounding_client_rect: client,
                    });
                }
            }
            if entries.is_empty() {
                continue;
            }
            if let Some(obs) = self.observers.get_mut(&id) {
                for (target, hit) in updates {
                    if let Some(slot) = obs.targets.iter_mut().find(|(t, _)| *t == target) {
                        slot.1 = Some(hit);
                    }
                }
            }
            trace!(observer = ?id, entries = entries.len(), "intersection entries");
            callback(self, &entries, id);
        }
    }
}

fn parse_selector(selector: &str) -> Result<SelectorList> {
    SelectorList::parse(selector).map_err(|source| PageError::Selector {
        selector: selector.to_string(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
