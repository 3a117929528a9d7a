//! # Geometry Crate
//!
//! Document-space geometry shared by the page host and the behaviors:
//! points, axis-aligned rectangles and four-sided CSS-style margins.
//! All values are CSS pixels in `f64`, matching the numbers a script sees.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Point
// ─────────────────────────────────────────────────────────────────────────────

/// A 2D point.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle defined by origin `(x, y)` and size `(w, h)`.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(self) -> f64 {
        self.y + self.h
    }

    #[inline]
    pub fn center(self) -> Point {
        Point::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[inline]
    pub fn area(self) -> f64 {
        if self.is_empty() { 0.0 } else { self.w * self.h }
    }

    /// True if width or height is ≤ 0.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Overlap of two rectangles, or `None` when they do not touch.
    ///
    /// Edge-adjacent rectangles yield a zero-area overlap rather than `None`,
    /// so a zero-height element sitting exactly on a boundary still counts
    /// as intersecting.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    #[inline]
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Grow each side outward by the matching margin (negative values shrink).
    pub fn outset(self, m: Edges) -> Self {
        Self::new(
            self.x - m.left,
            self.y - m.top,
            self.w + m.left + m.right,
            self.h + m.top + m.bottom,
        )
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}×{})", self.x, self.y, self.w, self.h)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edges
// ─────────────────────────────────────────────────────────────────────────────

/// Four-sided pixel values in CSS order (top, right, bottom, left).
///
/// Parses and prints the CSS margin shorthand, e.g. `"0px 0px -50px 0px"`,
/// which is also its serialized form in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub const ZERO: Self = Self { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    #[inline]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }
}

/// Error returned when a margin shorthand cannot be parsed.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("invalid margin `{0}`: expected 1 to 4 pixel lengths")]
pub struct EdgesParseError(pub String);

fn parse_length(token: &str) -> Option<f64> {
    let number = token.strip_suffix("px").unwrap_or(token);
    // A bare number is only a valid length when it is zero.
    if number.len() == token.len() && number.parse::<f64>().ok()? != 0.0 {
        return None;
    }
    number.parse().ok()
}

impl FromStr for Edges {
    type Err = EdgesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || EdgesParseError(s.to_string());
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(err)?;
        match values.as_slice() {
            [a] => Ok(Self::new(*a, *a, *a, *a)),
            [v, h] => Ok(Self::new(*v, *h, *v, *h)),
            [t, h, b] => Ok(Self::new(*t, *h, *b, *h)),
            [t, r, b, l] => Ok(Self::new(*t, *r, *b, *l)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Edges {
    type Error = EdgesParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Edges> for String {
    fn from(e: Edges) -> Self {
        e.to_string()
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
