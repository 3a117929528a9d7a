//! Scripted user interactions.
//!
//! A scenario is a TOML file with an optional viewport and a list of steps:
//!
//! ```toml
//! [viewport]
//! width = 1024
//! height = 768
//!
//! [[step]]
//! scroll = 400
//!
//! [[step]]
//! move = { target = "#hero", x = 120, y = 80 }
//!
//! [[step]]
//! click = "a[href='#pricing']"
//!
//! [[step]]
//! advance = 300
//! ```

use anyhow::{Context, Result};
use dom::NodeId;
use page::{Page, ReadyState, ScrollBehavior, Viewport};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub viewport: Option<ViewportSize>,
    /// Start with the document still parsing; `DOMContentLoaded` fires
    /// before the first step.
    pub loading: bool,
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    fn validate(&self) -> Result<()> {
        let valid = |side: f64| side.is_finite() && side > 0.0;
        anyhow::ensure!(
            valid(self.width) && valid(self.height),
            "viewport must be positive and finite, got {}x{}",
            self.width,
            self.height
        );
        Ok(())
    }
}

impl From<ViewportSize> for Viewport {
    fn from(size: ViewportSize) -> Self {
        Viewport::new(size.width, size.height)
    }
}

/// One interaction. Selector-valued steps act on every match.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Jump to an absolute scroll offset.
    Scroll(f64),
    /// Animate to an absolute scroll offset.
    SmoothScroll(f64),
    /// Let time pass, in milliseconds.
    Advance(f64),
    /// Run frames until scrolling stops.
    Settle(bool),
    Hover(String),
    Move { target: String, x: f64, y: f64 },
    Leave(String),
    Click(String),
    /// Finish loading the matching images.
    Load(String),
    ReadyState(ReadyStateName),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyStateName {
    Interactive,
    Complete,
}

impl From<ReadyStateName> for ReadyState {
    fn from(name: ReadyStateName) -> Self {
        match name {
            ReadyStateName::Interactive => ReadyState::Interactive,
            ReadyStateName::Complete => ReadyState::Complete,
        }
    }
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(source).context("invalid scenario")?;
        if let Some(viewport) = &scenario.viewport {
            viewport.validate().context("invalid scenario")?;
        }
        Ok(scenario)
    }

    pub fn run(&self, page: &mut Page) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, ?step, "step");
            step.apply(page)
                .with_context(|| format!("step {} ({step:?}) failed", index + 1))?;
        }
        Ok(())
    }
}

impl Step {
    pub fn apply(&self, page: &mut Page) -> Result<()> {
        match self {
            Step::Scroll(y) => page.scroll_to(*y, ScrollBehavior::Instant),
            Step::SmoothScroll(y) => page.scroll_to(*y, ScrollBehavior::Smooth),
            Step::Advance(ms) => page.advance(*ms),
            Step::Settle(true) => page.settle(),
            Step::Settle(false) => {}
            Step::Hover(selector) => {
                for node in targets(page, selector)? {
                    page.pointer_enter(node);
                }
            }
            Step::Move { target, x, y } => {
                for node in targets(page, target)? {
                    page.pointer_move(node, *x, *y);
                }
            }
            Step::Leave(selector) => {
                for node in targets(page, selector)? {
                    page.pointer_leave(node);
                }
            }
            Step::Click(selector) => {
                for node in targets(page, selector)? {
                    page.click(node);
                }
            }
            Step::Load(selector) => {
                for node in targets(page, selector)? {
                    page.complete_image(node);
                }
            }
            Step::ReadyState(state) => page.set_ready_state((*state).into()),
        }
        Ok(())
    }
}

fn targets(page: &Page, selector: &str) -> Result<Vec<NodeId>> {
    let nodes = page.query_selector_all(selector)?;
    if nodes.is_empty() {
        warn!(selector, "step matched no elements");
    }
    Ok(nodes)
}
