//! `localStorage` backend and `window.location` navigation.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::nav::Navigator;
use crate::session::store::{ChangeListener, KeyValueStore, StorageChange, Subscription};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// `window.localStorage`. Writes are best-effort: quota or privacy-mode
/// failures are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(key);
        }
    }

    /// Listens to the window `storage` event, which only fires for changes
    /// made by other tabs of the same origin.
    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::detached();
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Ok(event) = event.dyn_into::<web_sys::StorageEvent>() else {
                return;
            };
            listener(&StorageChange { key: event.key(), new_value: event.new_value() });
        });
        if window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .is_err()
        {
            return Subscription::detached();
        }

        Subscription::new(move || {
            let _ = window.remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
            drop(closure);
        })
    }
}

/// Full-page navigation through `window.location.href`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if window.location().set_href(url).is_err() {
            tracing::warn!(%url, "navigation failed");
        }
    }
}
