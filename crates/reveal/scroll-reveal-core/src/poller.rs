//! Polling substitute for a native intersection watcher.
//!
//! Hosts without a native primitive cache each watched element's bounding box
//! and call [`ScrollPoller::poll`] on scroll/resize. The poller applies the same
//! threshold and root-margin rules and reports only state changes, with the
//! first poll reporting every watched element.

use crate::config::WatchOptions;
use crate::geometry::{intersection_ratio, Rect};
use crate::host::IntersectionEntry;

#[derive(Debug)]
struct Watched<E> {
    element: E,
    rect: Rect,
    last: Option<bool>,
}

#[derive(Debug)]
pub struct ScrollPoller<E> {
    options: WatchOptions,
    watched: Vec<Watched<E>>,
}

impl<E: Clone + PartialEq> ScrollPoller<E> {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            watched: Vec::new(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Start watching `element`. Re-observing only refreshes its rect.
    pub fn observe(&mut self, element: E, rect: Rect) {
        if !self.update_rect(&element, rect) {
            self.watched.push(Watched {
                element,
                rect,
                last: None,
            });
        }
    }

    /// Refresh the cached rect. Returns false if the element is not watched.
    pub fn update_rect(&mut self, element: &E, rect: Rect) -> bool {
        match self.watched.iter_mut().find(|w| w.element == *element) {
            Some(w) => {
                w.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Stop watching. Returns false if it was not watched.
    pub fn unobserve(&mut self, element: &E) -> bool {
        let before = self.watched.len();
        self.watched.retain(|w| w.element != *element);
        self.watched.len() != before
    }

    pub fn is_watching(&self, element: &E) -> bool {
        self.watched.iter().any(|w| w.element == *element)
    }

    pub fn elements(&self) -> impl Iterator<Item = &E> {
        self.watched.iter().map(|w| &w.element)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Evaluate every watched rect against `viewport` (same coordinate space).
    pub fn poll(&mut self, viewport: &Rect) -> Vec<IntersectionEntry<E>> {
        let root = self.options.root_margin.apply(viewport);
        let threshold = self.options.threshold;
        let mut out = Vec::new();
        for w in &mut self.watched {
            let ratio = intersection_ratio(&w.rect, &root);
            let intersecting = if threshold <= 0.0 {
                w.rect.intersection(&root).is_some()
            } else {
                ratio >= threshold
            };
            if w.last != Some(intersecting) {
                w.last = Some(intersecting);
                out.push(IntersectionEntry::new(w.element.clone(), intersecting, ratio));
            }
        }
        out
    }
}
