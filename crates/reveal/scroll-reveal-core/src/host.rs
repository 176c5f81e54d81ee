//! Host seam: what the controller needs from a page environment.
//!
//! Adapters (wasm/browser, in-memory fixtures) implement [`PageHost`] and pass
//! it into [`RevealController`](crate::controller::RevealController) calls.

use crate::config::WatchOptions;
use crate::error::HostError;

/// Page environment operated on by the controller.
///
/// All mutations must be idempotent: adding a class that is present, removing
/// one that is absent, or unobserving an element that is not observed is a no-op.
pub trait PageHost {
    /// Handle to a markup node. Equality is node identity.
    type Element: Clone + PartialEq + std::fmt::Debug;

    /// Evaluate the reduced-motion media query.
    fn prefers_reduced_motion(&self, query: &str) -> Result<bool, HostError>;

    /// Add (`on = true`) or remove a class on the page root.
    fn set_root_class(&mut self, class: &str, on: bool);

    /// All elements matching `selector`, in document order, each at most once.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, HostError>;

    /// Nearest inclusive ancestor of `element` matching `selector`.
    fn closest(&self, element: &Self::Element, selector: &str) -> Option<Self::Element>;

    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Write an inline `transition-delay` override (e.g. `"120ms"`).
    fn set_transition_delay(&mut self, element: &Self::Element, value: &str);

    /// Create the single shared visibility watcher.
    fn install_watcher(&mut self, options: &WatchOptions) -> Result<(), HostError>;

    fn observe(&mut self, element: &Self::Element);

    fn unobserve(&mut self, element: &Self::Element);
}

/// Stagger scope of a target: its nearest sectioning ancestor, or the page root.
#[derive(Clone, Debug, PartialEq)]
pub enum Group<E> {
    Root,
    Section(E),
}

/// One visibility change delivered by a watcher.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
    /// Visible fraction of the target, informational.
    pub ratio: f64,
}

impl<E> IntersectionEntry<E> {
    pub fn new(target: E, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            target,
            is_intersecting,
            ratio,
        }
    }
}
