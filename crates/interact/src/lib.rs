//! # Interact Crate
//!
//! Cosmetic interactivity for a content page: a header shadow once the page
//! scrolls, staggered reveal of content blocks as they enter the viewport,
//! image load-state classes with a pointer-driven tilt, smooth same-page
//! anchor scrolling, a pointer cursor over interactive elements and a
//! scroll-progress bar.
//!
//! Each piece is a [`Behavior`] that wires listeners and observers onto a
//! [`Page`] and hands back a [`Detach`] to undo the wiring. [`Interactivity`]
//! builds the enabled behaviors from [`Options`] and installs them once the
//! document is ready.

#![forbid(unsafe_code)]

pub mod anchors;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod header;
pub mod images;
pub mod options;
pub mod progress;
pub mod reveal;
pub mod styles;

use dom::{ListenerId, NodeId};
use page::{ObserverId, Page};

pub use anchors::SmoothAnchors;
pub use controller::Interactivity;
pub use cursor::CursorAffordance;
pub use error::{InteractError, Result};
pub use header::HeaderShadow;
pub use images::{ImageTracker, Tilt};
pub use options::Options;
pub use progress::ScrollProgress;
pub use reveal::Reveal;
pub use styles::StyleInjector;

// ─────────────────────────────────────────────────────────────────────────────
// Behavior
// ─────────────────────────────────────────────────────────────────────────────

/// One independent piece of page interactivity.
pub trait Behavior {
    fn name(&self) -> &'static str;

    /// Wire the behavior onto `page`. A page lacking the elements a behavior
    /// targets is not an error; the returned [`Detach`] is simply empty.
    fn attach(&self, page: &mut Page) -> Result<Detach>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Detach
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a behavior registered on a page.
///
/// Running it removes the listeners, disconnects the observers and deletes
/// the nodes the behavior inserted. Classes and inline styles already
/// written to existing elements stay.
#[derive(Debug, Default)]
#[must_use = "dropping a Detach leaves the behavior attached for the page's lifetime"]
pub struct Detach {
    listeners: Vec<ListenerId>,
    observers: Vec<ObserverId>,
    nodes: Vec<NodeId>,
}

impl Detach {
    pub fn listener(&mut self, id: ListenerId) {
        self.listeners.push(id);
    }

    pub fn observer(&mut self, id: ObserverId) {
        self.observers.push(id);
    }

    pub fn node(&mut self, id: NodeId) {
        self.nodes.push(id);
    }

    pub fn merge(&mut self, other: Detach) {
        self.listeners.extend(other.listeners);
        self.observers.extend(other.observers);
        self.nodes.extend(other.nodes);
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn observers(&self) -> &[ObserverId] {
        &self.observers
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.observers.is_empty() && self.nodes.is_empty()
    }

    pub fn run(self, page: &mut Page) {
        for id in self.listeners {
            page.remove_event_listener(id);
        }
        for id in self.observers {
            page.disconnect(id);
        }
        for id in self.nodes {
            page.remove_node(id);
        }
    }
}

/// Resolve a configured selector, tagging failures with the behavior name.
pub(crate) fn select_all(page: &Page, behavior: &'static str, selector: &str) -> Result<Vec<NodeId>> {
    page.query_selector_all(selector)
        .map_err(|source| InteractError::Page { behavior, source })
}

pub(crate) fn select_one(page: &Page, behavior: &'static str, selector: &str) -> Result<Option<NodeId>> {
    page.query_selector(selector)
        .map_err(|source| InteractError::Page { behavior, source })
}

/// Format a CSS number the way script string interpolation does: no
/// trailing `.0`, and no negative zero.
pub(crate) fn css_number(value: f64) -> String {
    format!("{}", value + 0.0)
}
