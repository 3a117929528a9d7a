//! Intersection observers.
//!
//! An observer watches a set of targets against the viewport (grown or shrunk
//! by `root_margin`). A target counts as intersecting once the visible share
//! of its box reaches `threshold`; a zero threshold accepts any contact,
//! including an edge touching the root. Entries are delivered the first time
//! a target is evaluated and afterwards only when its state flips.

use std::fmt;
use std::rc::Rc;

use dom::NodeId;
use geometry::{Edges, Rect};

use crate::Page;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target's area that must be visible, in `[0, 1]`.
    pub threshold: f64,
    pub root_margin: Edges,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: Edges::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
    /// Target box in client coordinates at evaluation time.
    pub bounding_client_rect: Rect,
}

pub(crate) type ObserverCallback = Rc<dyn Fn(&mut Page, &[IntersectionEntry], ObserverId)>;

pub(crate) struct Observer {
    pub(crate) options: ObserverOptions,
    /// Targets with the last delivered state (`None` until first evaluation).
    pub(crate) targets: Vec<(NodeId, Option<bool>)>,
    pub(crate) callback: ObserverCallback,
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("options", &self.options)
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl Observer {
    pub(crate) fn new(options: ObserverOptions, callback: ObserverCallback) -> Self {
        Self {
            options,
            targets: Vec::new(),
            callback,
        }
    }
}

/// Visible share of `target` inside `root`, or `None` when they do not touch.
pub fn intersection_ratio(target: Rect, root: Rect) -> Option<f64> {
    let overlap = target.intersection(root)?;
    if target.area() == 0.0 {
        return Some(1.0);
    }
    Some(overlap.area() / target.area())
}

/// Whether `target` counts as intersecting `root` under `options`.
pub fn is_intersecting(target: Rect, root: Rect, threshold: f64) -> (bool, f64) {
    match intersection_ratio(target, root) {
        Some(ratio) => (ratio >= threshold, ratio),
        None => (false, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: Rect = Rect::new(0.0, 0.0, 800.0, 550.0);

    #[test]
    fn ratio_of_partially_visible_box() {
        let target = Rect::new(0.0, 500.0, 800.0, 200.0);
        assert_eq!(intersection_ratio(target, ROOT), Some(0.25));
    }

    #[test]
    fn below_threshold_is_not_intersecting() {
        // 5% visible
        let target = Rect::new(0.0, 540.0, 800.0, 200.0);
        let (hit, ratio) = is_intersecting(target, ROOT, 0.1);
        assert!(!hit);
        assert!((ratio - 0.05).abs() < 1e-9);
    }

    #[test]
    fn at_threshold_is_intersecting() {
        let target = Rect::new(0.0, 530.0, 800.0, 200.0);
        assert!(is_intersecting(target, ROOT, 0.1).0);
    }

    #[test]
    fn zero_area_target_touching_counts() {
        let target = Rect::new(0.0, 550.0, 800.0, 0.0);
        assert_eq!(intersection_ratio(target, ROOT), Some(1.0));
        assert!(is_intersecting(target, ROOT, 0.1).0);
    }

    #[test]
    fn disjoint_is_zero() {
        let target = Rect::new(0.0, 900.0, 800.0, 100.0);
        assert_eq!(is_intersecting(target, ROOT, 0.0), (false, 0.0));
    }
}
