//! Behavior configuration.
//!
//! Every field has a default matching the stock page script, and every
//! section is `#[serde(default)]`, so an options file only needs to name the
//! values it changes.

use geometry::Edges;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Append the companion stylesheet to `<head>` on install.
    pub inject_styles: bool,
    pub header: HeaderOptions,
    pub reveal: RevealOptions,
    pub images: ImageOptions,
    pub anchors: AnchorOptions,
    pub cursor: CursorOptions,
    pub progress: ProgressOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            inject_styles: true,
            header: HeaderOptions::default(),
            reveal: RevealOptions::default(),
            images: ImageOptions::default(),
            anchors: AnchorOptions::default(),
            cursor: CursorOptions::default(),
            progress: ProgressOptions::default(),
        }
    }
}

impl Options {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    pub enabled: bool,
    pub selector: String,
    /// Scroll offset (px) the page must pass before the class is applied.
    pub threshold: f64,
    pub class: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: "header".into(),
            threshold: 50.0,
            class: "scrolled".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    pub enabled: bool,
    pub selector: String,
    /// Visible fraction that triggers a reveal.
    pub threshold: f64,
    pub root_margin: Edges,
    /// Transition delay added per element, in document order.
    pub stagger_ms: f64,
    pub duration_s: f64,
    /// Initial downward offset of hidden elements.
    pub offset_px: f64,
    pub class: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: "main > div, main h2, main img".into(),
            threshold: 0.1,
            root_margin: Edges::new(0.0, 0.0, -50.0, 0.0),
            stagger_ms: 100.0,
            duration_s: 0.6,
            offset_px: 20.0,
            class: "visible".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub enabled: bool,
    pub selector: String,
    pub lift_px: f64,
    pub scale: f64,
    /// Rotation at the image edge, in degrees.
    pub max_tilt_deg: f64,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: "main img".into(),
            lift_px: 4.0,
            scale: 1.01,
            max_tilt_deg: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorOptions {
    pub enabled: bool,
    pub selector: String,
    /// Animate the scroll; `false` jumps like the default action would.
    pub smooth: bool,
}

impl Default for AnchorOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: r##"a[href^="#"]"##.into(),
            smooth: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorOptions {
    pub enabled: bool,
    pub selector: String,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: "a, button, img".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    pub enabled: bool,
    /// Report `0%` instead of `NaN%` when the page cannot scroll.
    pub clamp_unscrollable: bool,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            clamp_unscrollable: false,
        }
    }
}
