//! Viewport state and scroll animation.

use geometry::Rect;

/// The visible window onto the document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub client_width: f64,
    pub client_height: f64,
    /// Vertical scroll offset (`window.pageYOffset`).
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(client_width: f64, client_height: f64) -> Self {
        Self {
            client_width,
            client_height,
            scroll_y: 0.0,
        }
    }

    /// The viewport in client coordinates.
    pub fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.client_width, self.client_height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// `scrollIntoView` / `scrollTo` behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Instant,
    Smooth,
}

/// An in-flight smooth scroll, advanced by frame steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAnimation {
    pub from: f64,
    pub to: f64,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
}

impl ScrollAnimation {
    pub fn new(from: f64, to: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms,
        }
    }

    /// Advance by `dt_ms` and return the new scroll position.
    pub fn step(&mut self, dt_ms: f64) -> f64 {
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        self.position()
    }

    pub fn position(&self) -> f64 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed_ms / self.duration_ms;
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    pub fn is_finished(&self) -> bool {
        self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms
    }
}

/// Cubic ease-in-out on `t ∈ [0, 1]`.
fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn animation_reaches_target_exactly() {
        let mut anim = ScrollAnimation::new(0.0, 900.0, 300.0);
        let mut last = 0.0;
        while !anim.is_finished() {
            let y = anim.step(16.0);
            assert!(y >= last, "smooth scroll must be monotonic");
            last = y;
        }
        assert_eq!(anim.position(), 900.0);
    }

    #[test]
    fn animation_midpoint_is_half_way() {
        let mut anim = ScrollAnimation::new(100.0, 300.0, 200.0);
        assert_relative_eq!(anim.step(100.0), 200.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let anim = ScrollAnimation::new(0.0, 50.0, 0.0);
        assert!(anim.is_finished());
        assert_eq!(anim.position(), 50.0);
    }

    #[test]
    fn scrolling_up_works() {
        let mut anim = ScrollAnimation::new(500.0, 0.0, 100.0);
        assert!(anim.step(50.0) < 500.0);
        assert_eq!(anim.step(50.0), 0.0);
    }
}
