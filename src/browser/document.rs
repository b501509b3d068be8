//! Live DOM implementation of `dom::Document`.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Element;

use crate::dom::{ClickHandler, Document, ElementSpec, VisibilityHandler};

pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    /// The document of the current window, if any.
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(|document| Self { document })
    }

    fn elements(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn first(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn create(&self, spec: &ElementSpec) -> Option<Element> {
        let element = self.document.create_element(&spec.tag).ok()?;
        if let Some(id) = &spec.id {
            element.set_id(id);
        }
        if let Some(class) = &spec.class {
            element.set_class_name(class);
        }
        if let Some(href) = &spec.href {
            element.set_attribute("href", href).ok()?;
        }
        if let Some(text) = &spec.text {
            element.set_text_content(Some(text));
        }
        Some(element)
    }
}

impl Document for BrowserDocument {
    fn count(&self, selector: &str) -> usize {
        self.elements(selector).len()
    }

    fn set_text(&self, selector: &str, text: &str) -> usize {
        let elements = self.elements(selector);
        for element in &elements {
            element.set_text_content(Some(text));
        }
        elements.len()
    }

    fn set_hidden(&self, selector: &str, hidden: bool) -> usize {
        let elements = self.elements(selector);
        for element in &elements {
            let _ = if hidden {
                element.set_attribute("hidden", "")
            } else {
                element.remove_attribute("hidden")
            };
        }
        elements.len()
    }

    fn append_child(&self, parent_selector: &str, spec: &ElementSpec) -> bool {
        let Some(parent) = self.first(parent_selector) else {
            return false;
        };
        let Some(element) = self.create(spec) else {
            return false;
        };
        parent.append_child(&element).is_ok()
    }

    fn clear_children(&self, selector: &str) -> bool {
        let Some(element) = self.first(selector) else {
            return false;
        };
        element.set_inner_html("");
        true
    }

    // Listeners are never removed; they live as long as their element.
    fn on_click(&self, selector: &str, handler: ClickHandler) -> usize {
        let elements = self.elements(selector);
        for element in &elements {
            let handler = ClickHandler::clone(&handler);
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| handler());
            let _ = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        elements.len()
    }

    fn on_visibility_change(&self, handler: VisibilityHandler) {
        let document = self.document.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            handler(!document.hidden());
        });
        let _ = self
            .document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
