//! Image load state and pointer tilt.
//!
//! Every matched image is tagged `loading` until it completes, then
//! `loaded`. Moving the pointer over an image lifts it slightly and tilts it
//! toward the pointer; leaving resets the transform.

use std::fmt;

use dom::{Event, ListenerOptions, NodeId};
use geometry::Rect;
use page::Page;
use tracing::debug;

use crate::options::ImageOptions;
use crate::{css_number, select_all, Behavior, Detach, Result};

/// Inline transform an image returns to when the pointer leaves.
pub const REST_TRANSFORM: &str = "translateY(0) scale(1) rotateX(0) rotateY(0)";

const LOADING: &str = "loading";
const LOADED: &str = "loaded";

// ─────────────────────────────────────────────────────────────────────────────
// Tilt
// ─────────────────────────────────────────────────────────────────────────────

/// A lifted, tilted image transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    pub lift_px: f64,
    pub scale: f64,
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
}

impl Tilt {
    /// Tilt for a pointer at client position `(x, y)` over `rect`.
    ///
    /// The pointer offset from the center is normalized to `[-1, 1]` on each
    /// axis; the horizontal offset turns around the Y axis and the vertical
    /// offset, inverted, around the X axis. Returns `None` for an empty box.
    pub fn from_pointer(rect: Rect, x: f64, y: f64, options: &ImageOptions) -> Option<Self> {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return None;
        }
        let cx = rect.w / 2.0;
        let cy = rect.h / 2.0;
        let px = (x - rect.x - cx) / cx;
        let py = (y - rect.y - cy) / cy;
        Some(Self {
            lift_px: options.lift_px,
            scale: options.scale,
            rotate_x_deg: py * -options.max_tilt_deg,
            rotate_y_deg: px * options.max_tilt_deg,
        })
    }
}

impl fmt::Display for Tilt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translateY({}px) scale({}) rotateX({}deg) rotateY({}deg)",
            css_number(-self.lift_px),
            css_number(self.scale),
            css_number(self.rotate_x_deg),
            css_number(self.rotate_y_deg),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ImageTracker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct ImageTracker {
    options: ImageOptions,
}

impl ImageTracker {
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }
}

fn mark_loaded(page: &mut Page, img: NodeId) {
    let dom = page.dom_mut();
    dom.remove_class(img, LOADING);
    dom.add_class(img, LOADED);
}

impl Behavior for ImageTracker {
    fn name(&self) -> &'static str {
        "images"
    }

    fn attach(&self, page: &mut Page) -> Result<Detach> {
        let mut detach = Detach::default();
        let images = select_all(page, self.name(), &self.options.selector)?;

        for img in images {
            page.dom_mut().add_class(img, LOADING);
            if page.is_image_complete(img) {
                mark_loaded(page, img);
            } else {
                detach.listener(page.add_event_listener(
                    img,
                    "load",
                    ListenerOptions::ONCE,
                    move |page: &mut Page, _: &mut Event| mark_loaded(page, img),
                ));
            }

            let options = self.options.clone();
            detach.listener(page.add_event_listener(
                img,
                "mousemove",
                ListenerOptions::PASSIVE,
                move |page: &mut Page, event: &mut Event| {
                    let Some((x, y)) = event.client_position() else {
                        return;
                    };
                    let Some(rect) = page.bounding_client_rect(img) else {
                        return;
                    };
                    if let Some(tilt) = Tilt::from_pointer(rect, x, y, &options) {
                        page.dom_mut()
                            .set_style_property(img, "transform", &tilt.to_string());
                    }
                },
            ));

            detach.listener(page.add_event_listener(
                img,
                "mouseleave",
                ListenerOptions::PERSISTENT,
                move |page: &mut Page, _: &mut Event| {
                    page.dom_mut().set_style_property(img, "transform", REST_TRANSFORM);
                },
            ));
        }
        debug!(listeners = detach.listeners().len(), "image tracking attached");
        Ok(detach)
    }
}
