//! Browser implementation of [`PageHost`].

use js_sys::{Array, Reflect};
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use scroll_reveal_core::{HostError, IntersectionEntry, PageHost, Rect, ScrollPoller, WatchOptions};

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(v: &JsValue) -> String {
    if let Some(s) = v.as_string() {
        return s;
    }
    if let Some(e) = v.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    format!("{v:?}")
}

fn client_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.x(), r.y(), r.width(), r.height())
}

/// Convert a native watcher batch.
pub(crate) fn entries_from_js(entries: &Array) -> Vec<IntersectionEntry<Element>> {
    entries
        .iter()
        .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
        .map(|e| IntersectionEntry::new(e.target(), e.is_intersecting(), e.intersection_ratio()))
        .collect()
}

enum Watcher {
    None,
    Native(IntersectionObserver),
    Polling(ScrollPoller<Element>),
}

/// Callbacks the page hands to the browser. They call back into the runtime
/// that owns this page, so they are created by the runtime.
pub(crate) struct Callbacks {
    pub on_intersect: Closure<dyn FnMut(Array)>,
    pub on_scroll: Closure<dyn FnMut()>,
}

pub struct WebPage {
    window: Window,
    document: Document,
    polling_fallback: bool,
    watcher: Watcher,
    callbacks: Callbacks,
}

impl WebPage {
    pub(crate) fn new(
        window: Window,
        document: Document,
        polling_fallback: bool,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            window,
            document,
            polling_fallback,
            watcher: Watcher::None,
            callbacks,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.watcher, Watcher::Polling(_))
    }

    fn has_native_watcher(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn viewport(&self) -> Rect {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Rect::new(
            0.0,
            0.0,
            dim(self.window.inner_width()),
            dim(self.window.inner_height()),
        )
    }

    /// Re-measure watched elements and evaluate them. Empty unless polling.
    pub fn poll(&mut self) -> Vec<IntersectionEntry<Element>> {
        let viewport = self.viewport();
        let Watcher::Polling(poller) = &mut self.watcher else {
            return Vec::new();
        };
        let elements: Vec<Element> = poller.elements().cloned().collect();
        for el in &elements {
            poller.update_rect(el, client_rect(el));
        }
        poller.poll(&viewport)
    }

    fn install_polling(&mut self, options: &WatchOptions) -> Result<(), HostError> {
        let opts = AddEventListenerOptions::new();
        opts.set_passive(true);
        let f: &js_sys::Function = self.callbacks.on_scroll.as_ref().unchecked_ref();
        for event in ["scroll", "resize"] {
            self.window
                .add_event_listener_with_callback_and_add_event_listener_options(event, f, &opts)
                .map_err(|e| HostError::Call(js_message(&e)))?;
        }
        self.watcher = Watcher::Polling(ScrollPoller::new(*options));
        Ok(())
    }

    fn remove_polling_listeners(&self) {
        let f: &js_sys::Function = self.callbacks.on_scroll.as_ref().unchecked_ref();
        for event in ["scroll", "resize"] {
            let _ = self.window.remove_event_listener_with_callback(event, f);
        }
    }
}

impl Drop for WebPage {
    fn drop(&mut self) {
        match &self.watcher {
            Watcher::Native(io) => io.disconnect(),
            Watcher::Polling(_) => self.remove_polling_listeners(),
            Watcher::None => {}
        }
    }
}

impl PageHost for WebPage {
    type Element = Element;

    fn prefers_reduced_motion(&self, query: &str) -> Result<bool, HostError> {
        let mql = self
            .window
            .match_media(query)
            .map_err(|e| HostError::Call(js_message(&e)))?
            .ok_or_else(|| HostError::Unsupported("matchMedia".into()))?;
        Ok(mql.matches())
    }

    fn set_root_class(&mut self, class: &str, on: bool) {
        let Some(body) = self.document.body() else {
            warn!("no <body>; cannot toggle `{class}`");
            return;
        };
        let list = body.class_list();
        let res = if on { list.add_1(class) } else { list.remove_1(class) };
        if let Err(e) = res {
            warn!("toggling root class `{class}` failed: {}", js_message(&e));
        }
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, HostError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| HostError::Selector {
                selector: selector.to_string(),
                message: js_message(&e),
            })?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect())
    }

    fn closest(&self, element: &Element, selector: &str) -> Option<Element> {
        element.closest(selector).ok().flatten()
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        if let Err(e) = element.class_list().add_1(class) {
            warn!("adding class `{class}` failed: {}", js_message(&e));
        }
    }

    fn set_transition_delay(&mut self, element: &Element, value: &str) {
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            warn!("{} has no inline style; delay skipped", element.tag_name());
            return;
        };
        if let Err(e) = html.style().set_property("transition-delay", value) {
            warn!("setting transition-delay failed: {}", js_message(&e));
        }
    }

    fn install_watcher(&mut self, options: &WatchOptions) -> Result<(), HostError> {
        if !self.has_native_watcher() {
            if self.polling_fallback {
                warn!("IntersectionObserver missing; polling element geometry");
                return self.install_polling(options);
            }
            return Err(HostError::Unsupported("IntersectionObserver".into()));
        }
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_string());
        let io = IntersectionObserver::new_with_options(
            self.callbacks.on_intersect.as_ref().unchecked_ref(),
            &init,
        )
        .map_err(|e| HostError::Call(js_message(&e)))?;
        self.watcher = Watcher::Native(io);
        Ok(())
    }

    fn observe(&mut self, element: &Element) {
        match &mut self.watcher {
            Watcher::Native(io) => io.observe(element),
            Watcher::Polling(p) => p.observe(element.clone(), client_rect(element)),
            Watcher::None => warn!("observe before watcher install"),
        }
    }

    fn unobserve(&mut self, element: &Element) {
        match &mut self.watcher {
            Watcher::Native(io) => io.unobserve(element),
            Watcher::Polling(p) => {
                p.unobserve(element);
                if p.is_empty() {
                    self.remove_polling_listeners();
                }
            }
            Watcher::None => {}
        }
    }
}
