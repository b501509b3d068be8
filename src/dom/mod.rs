//! Minimal document model used by the reflectors.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navbar and admin sidebar only ever locate nodes by a single simple
//! selector (`#id`, `.class` or a tag name), create flat children, set text
//! and toggle visibility. `Document` exposes exactly that, so the same
//! rendering code drives the live DOM (`browser::BrowserDocument`) and the
//! in-memory `StubDocument`.

pub mod stub;

use std::rc::Rc;

pub use stub::StubDocument;

pub type ClickHandler = Rc<dyn Fn()>;

/// Called with `true` when the page becomes visible, `false` when hidden.
pub type VisibilityHandler = Rc<dyn Fn(bool)>;

/// Description of an element to create.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub text: Option<String>,
    pub href: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), ..Self::default() }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Space-separated class list.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// The slice of the DOM the session glue touches.
///
/// Selectors are single simple selectors. Operations on a selector with no
/// match are no-ops that report zero/`false`.
pub trait Document {
    /// Number of elements matching `selector`.
    fn count(&self, selector: &str) -> usize;

    /// Replace the text of every match. Returns the number updated.
    fn set_text(&self, selector: &str, text: &str) -> usize;

    /// Toggle the `hidden` attribute on every match. Returns the number updated.
    fn set_hidden(&self, selector: &str, hidden: bool) -> usize;

    /// Append a new element to the first match of `parent_selector`.
    fn append_child(&self, parent_selector: &str, spec: &ElementSpec) -> bool;

    /// Remove every child of the first match.
    fn clear_children(&self, selector: &str) -> bool;

    /// Attach a click handler to every match. Returns the number attached.
    fn on_click(&self, selector: &str, handler: ClickHandler) -> usize;

    /// Register a page visibility listener for the lifetime of the page.
    fn on_visibility_change(&self, handler: VisibilityHandler);

    fn exists(&self, selector: &str) -> bool {
        self.count(selector) > 0
    }
}
