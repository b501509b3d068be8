//! Full-page navigation.
//!
//! Gates and the fetch wrapper never render a fallback themselves: they hand
//! a target URL to a `Navigator` and stop.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::cell::RefCell;
use std::rc::Rc;

/// Performs a full-page navigation to `url`.
pub trait Navigator {
    fn navigate(&self, url: &str);
}

/// Records navigations instead of performing them. Used by headless hosts
/// and tests. Clones share the same history.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator {
    visited: Rc<RefCell<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visited.borrow().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        tracing::debug!(%url, "navigate");
        self.visited.borrow_mut().push(url.to_owned());
    }
}
