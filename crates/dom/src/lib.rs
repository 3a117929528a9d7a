//! DOM crate: Document Object Model
//!
//! Arena-based DOM tree with inline styles, a selector engine for
//! `querySelector`, and W3C event dispatch.
//! Uses typed generational ids from the `arena` crate instead of Rc/RefCell.

#![forbid(unsafe_code)]

pub mod event;
pub mod node;
pub mod selector;
pub mod style;
pub mod tree;

pub use event::*;
pub use node::*;
pub use selector::{SelectorError, SelectorList};
pub use style::InlineStyle;
pub use tree::Dom;
