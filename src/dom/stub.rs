//! In-memory `Document` for headless rendering and tests.
//!
//! DESIGN
//! ======
//! Nodes live in an arena indexed by insertion order. Removal marks the
//! subtree detached, then compacts the arena so repeated re-renders do not
//! grow it. Compaction keeps relative order, so document order still equals
//! arena order for the flat trees the reflectors build. Indices are never
//! held across calls.

#[cfg(test)]
#[path = "stub_test.rs"]
mod stub_test;

use std::cell::{Cell, RefCell};

use super::{ClickHandler, Document, ElementSpec, VisibilityHandler};

const ROOT: usize = 0;

struct StubNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    href: Option<String>,
    hidden: bool,
    parent: Option<usize>,
    attached: bool,
    click_handlers: Vec<ClickHandler>,
}

impl StubNode {
    fn from_spec(spec: &ElementSpec, parent: usize) -> Self {
        Self {
            tag: spec.tag.to_ascii_lowercase(),
            id: spec.id.clone(),
            classes: spec
                .class
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
            text: spec.text.clone().unwrap_or_default(),
            href: spec.href.clone(),
            hidden: false,
            parent: Some(parent),
            attached: true,
            click_handlers: Vec::new(),
        }
    }

    fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// A tree rooted at a `<body>` element.
pub struct StubDocument {
    nodes: RefCell<Vec<StubNode>>,
    visible: Cell<bool>,
    visibility_handlers: RefCell<Vec<VisibilityHandler>>,
}

impl Default for StubDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StubDocument {
    pub fn new() -> Self {
        let body = StubNode {
            tag: "body".to_owned(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            href: None,
            hidden: false,
            parent: None,
            attached: true,
            click_handlers: Vec::new(),
        };
        Self {
            nodes: RefCell::new(vec![body]),
            visible: Cell::new(true),
            visibility_handlers: RefCell::new(Vec::new()),
        }
    }

    /// Text of the first match.
    pub fn text(&self, selector: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        first_match(&nodes, selector).map(|i| nodes[i].text.clone())
    }

    /// Text of every match in document order.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        let nodes = self.nodes.borrow();
        matches(&nodes, selector)
            .into_iter()
            .map(|i| nodes[i].text.clone())
            .collect()
    }

    pub fn href(&self, selector: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        first_match(&nodes, selector).and_then(|i| nodes[i].href.clone())
    }

    pub fn is_hidden(&self, selector: &str) -> Option<bool> {
        let nodes = self.nodes.borrow();
        first_match(&nodes, selector).map(|i| nodes[i].hidden)
    }

    /// Number of direct children of the first match.
    pub fn child_count(&self, selector: &str) -> usize {
        let nodes = self.nodes.borrow();
        let Some(parent) = first_match(&nodes, selector) else {
            return 0;
        };
        nodes
            .iter()
            .filter(|n| n.attached && n.parent == Some(parent))
            .count()
    }

    /// Fire the click handlers of every match. Returns the number invoked.
    pub fn click(&self, selector: &str) -> usize {
        // Collect first: handlers commonly mutate the document.
        let handlers: Vec<ClickHandler> = {
            let nodes = self.nodes.borrow();
            matches(&nodes, selector)
                .into_iter()
                .flat_map(|i| nodes[i].click_handlers.iter().cloned())
                .collect()
        };
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Simulate the tab being hidden or refocused.
    pub fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }
        let handlers: Vec<VisibilityHandler> = self.visibility_handlers.borrow().clone();
        for handler in handlers {
            handler(visible);
        }
    }

    fn detach_descendants(nodes: &mut [StubNode], parent: usize) {
        let mut stack = vec![parent];
        while let Some(current) = stack.pop() {
            for (i, node) in nodes.iter_mut().enumerate() {
                if node.attached && node.parent == Some(current) {
                    node.attached = false;
                    node.click_handlers.clear();
                    stack.push(i);
                }
            }
        }
    }

    /// Drop detached nodes and renumber parent links.
    fn compact(nodes: &mut Vec<StubNode>) {
        let mut remap = vec![None; nodes.len()];
        let mut next = 0;
        for (i, node) in nodes.iter().enumerate() {
            if node.attached {
                remap[i] = Some(next);
                next += 1;
            }
        }
        nodes.retain(|node| node.attached);
        for node in nodes.iter_mut() {
            node.parent = node.parent.and_then(|p| remap[p]);
        }
    }

    /// Nodes held in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }
}

impl Document for StubDocument {
    fn count(&self, selector: &str) -> usize {
        matches(&self.nodes.borrow(), selector).len()
    }

    fn set_text(&self, selector: &str, text: &str) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let hits = matches(&nodes, selector);
        for &i in &hits {
            Self::detach_descendants(&mut nodes, i);
            text.clone_into(&mut nodes[i].text);
        }
        if !hits.is_empty() {
            Self::compact(&mut nodes);
        }
        hits.len()
    }

    fn set_hidden(&self, selector: &str, hidden: bool) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let hits = matches(&nodes, selector);
        for &i in &hits {
            nodes[i].hidden = hidden;
        }
        hits.len()
    }

    fn append_child(&self, parent_selector: &str, spec: &ElementSpec) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = first_match(&nodes, parent_selector) else {
            return false;
        };
        nodes.push(StubNode::from_spec(spec, parent));
        true
    }

    fn clear_children(&self, selector: &str) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = first_match(&nodes, selector) else {
            return false;
        };
        Self::detach_descendants(&mut nodes, parent);
        Self::compact(&mut nodes);
        true
    }

    fn on_click(&self, selector: &str, handler: ClickHandler) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let hits = matches(&nodes, selector);
        for &i in &hits {
            nodes[i].click_handlers.push(ClickHandler::clone(&handler));
        }
        hits.len()
    }

    fn on_visibility_change(&self, handler: VisibilityHandler) {
        self.visibility_handlers.borrow_mut().push(handler);
    }
}

/// Attached matches in document order. The root is never matched.
fn matches(nodes: &[StubNode], selector: &str) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .skip(ROOT + 1)
        .filter(|(_, n)| n.attached && n.matches(selector))
        .map(|(i, _)| i)
        .collect()
}

fn first_match(nodes: &[StubNode], selector: &str) -> Option<usize> {
    if selector.trim().eq_ignore_ascii_case("body") {
        return Some(ROOT);
    }
    matches(nodes, selector).into_iter().next()
}
