//! In-memory page host.
//!
//! Node 0 is `<body>`, which doubles as the page root. Nodes are stored in
//! document order, so arena order is query order. The visibility watcher is a
//! [`ScrollPoller`] driven by [`MemoryPage::scroll_to`].

use scroll_reveal_core::{
    HostError, IntersectionEntry, PageHost, Rect, ScrollPoller, WatchOptions,
};

use crate::selector::Selector;
use crate::{NodeFixture, PageFixture};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    rect: Rect,
    transition_delay: Option<String>,
    delay_writes: usize,
}

#[derive(Debug)]
pub struct MemoryPage {
    nodes: Vec<Node>,
    viewport: Rect,
    reduced_motion: bool,
    media_supported: bool,
    watcher_supported: bool,
    watcher: Option<ScrollPoller<NodeId>>,
    watcher_installs: usize,
    observe_calls: usize,
    unobserve_calls: usize,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub const BODY: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                tag: "body".into(),
                id: None,
                classes: Vec::new(),
                parent: None,
                rect: Rect::default(),
                transition_delay: None,
                delay_writes: 0,
            }],
            viewport: Rect::new(0.0, 0.0, 1280.0, 800.0),
            reduced_motion: false,
            media_supported: true,
            watcher_supported: true,
            watcher: None,
            watcher_installs: 0,
            observe_calls: 0,
            unobserve_calls: 0,
        }
    }

    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut page = Self::new();
        page.viewport = fixture.viewport;
        page.reduced_motion = fixture.reduced_motion;
        for child in &fixture.body {
            page.append_fixture(Self::BODY, child);
        }
        page
    }

    fn append_fixture(&mut self, parent: NodeId, node: &NodeFixture) {
        let id = self.append(parent, &node.tag, node.id.as_deref(), &node.class);
        if let Some(rect) = node.rect {
            self.nodes[id.0].rect = rect;
        }
        for child in &node.children {
            self.append_fixture(id, child);
        }
    }

    /// Append a child as the last node in document order.
    ///
    /// Only appends to the most recently opened subtree keep arena order equal
    /// to document order, which is how fixtures are built.
    pub fn append(&mut self, parent: NodeId, tag: &str, id: Option<&str>, class: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            id: id.map(str::to_string),
            classes: class.split_whitespace().map(str::to_string).collect(),
            parent: Some(parent),
            rect: Rect::default(),
            transition_delay: None,
            delay_writes: 0,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn with_rect(&mut self, node: NodeId, rect: Rect) -> &mut Self {
        self.nodes[node.0].rect = rect;
        if let Some(w) = self.watcher.as_mut() {
            w.update_rect(&node, rect);
        }
        self
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Simulate a host without `matchMedia`.
    pub fn without_media_query(mut self) -> Self {
        self.media_supported = false;
        self
    }

    /// Simulate a host without a visibility watcher primitive.
    pub fn without_watcher(mut self) -> Self {
        self.watcher_supported = false;
        self
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Scroll vertically and return the watcher batch, if a watcher is installed.
    pub fn scroll_to(&mut self, y: f64) -> Vec<IntersectionEntry<NodeId>> {
        self.viewport.y = y;
        self.poll()
    }

    /// Evaluate the watcher at the current viewport.
    pub fn poll(&mut self) -> Vec<IntersectionEntry<NodeId>> {
        let viewport = self.viewport;
        self.watcher
            .as_mut()
            .map(|w| w.poll(&viewport))
            .unwrap_or_default()
    }

    /// All nodes matching `selector`. Panics on unsupported selectors.
    pub fn find(&self, selector: &str) -> Vec<NodeId> {
        self.select(selector).expect("fixture selector should parse")
    }

    fn select(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        let sel = Selector::parse(selector)?;
        Ok((0..self.nodes.len())
            .map(NodeId)
            .filter(|n| self.matches(*n, &sel))
            .collect())
    }

    fn matches(&self, node: NodeId, sel: &Selector) -> bool {
        let Some((last, ancestors)) = sel.parts.split_last() else {
            return false;
        };
        let n = &self.nodes[node.0];
        if !last.matches(&n.tag, n.id.as_deref(), &n.classes) {
            return false;
        }
        // Descendant combinators only: greedy right-to-left ancestor walk.
        let mut cursor = n.parent;
        for part in ancestors.iter().rev() {
            loop {
                let Some(a) = cursor else {
                    return false;
                };
                let an = &self.nodes[a.0];
                cursor = an.parent;
                if part.matches(&an.tag, an.id.as_deref(), &an.classes) {
                    break;
                }
            }
        }
        true
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.has_class(Self::BODY, class)
    }

    pub fn transition_delay(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].transition_delay.as_deref()
    }

    pub fn delay_writes(&self, node: NodeId) -> usize {
        self.nodes[node.0].delay_writes
    }

    /// Nodes carrying `class`, document order.
    pub fn with_class(&self, class: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    pub fn watcher_installed(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn watcher_options(&self) -> Option<&WatchOptions> {
        self.watcher.as_ref().map(|w| w.options())
    }

    pub fn watcher_installs(&self) -> usize {
        self.watcher_installs
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.watcher.as_ref().is_some_and(|w| w.is_watching(&node))
    }

    pub fn observed_count(&self) -> usize {
        self.watcher.as_ref().map_or(0, |w| w.len())
    }

    pub fn observe_calls(&self) -> usize {
        self.observe_calls
    }

    pub fn unobserve_calls(&self) -> usize {
        self.unobserve_calls
    }
}

impl PageHost for MemoryPage {
    type Element = NodeId;

    fn prefers_reduced_motion(&self, query: &str) -> Result<bool, HostError> {
        if !self.media_supported {
            return Err(HostError::Unsupported("matchMedia".into()));
        }
        Ok(query.contains("prefers-reduced-motion") && self.reduced_motion)
    }

    fn set_root_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(&Self::BODY, class);
        } else {
            self.nodes[Self::BODY.0].classes.retain(|c| c != class);
        }
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        self.select(selector)
    }

    fn closest(&self, element: &NodeId, selector: &str) -> Option<NodeId> {
        let sel = Selector::parse(selector).ok()?;
        let mut cursor = Some(*element);
        while let Some(n) = cursor {
            if self.matches(n, &sel) {
                return Some(n);
            }
            cursor = self.nodes[n.0].parent;
        }
        None
    }

    fn add_class(&mut self, element: &NodeId, class: &str) {
        let classes = &mut self.nodes[element.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn set_transition_delay(&mut self, element: &NodeId, value: &str) {
        let node = &mut self.nodes[element.0];
        node.transition_delay = Some(value.to_string());
        node.delay_writes += 1;
    }

    fn install_watcher(&mut self, options: &WatchOptions) -> Result<(), HostError> {
        if !self.watcher_supported {
            return Err(HostError::Unsupported("IntersectionObserver".into()));
        }
        self.watcher = Some(ScrollPoller::new(*options));
        self.watcher_installs += 1;
        Ok(())
    }

    fn observe(&mut self, element: &NodeId) {
        self.observe_calls += 1;
        let rect = self.nodes[element.0].rect;
        if let Some(w) = self.watcher.as_mut() {
            w.observe(*element, rect);
        }
    }

    fn unobserve(&mut self, element: &NodeId) {
        self.unobserve_calls += 1;
        if let Some(w) = self.watcher.as_mut() {
            w.unobserve(element);
        }
    }
}
