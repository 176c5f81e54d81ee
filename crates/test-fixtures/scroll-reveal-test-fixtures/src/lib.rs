//! Page fixtures and an in-memory page host for scroll-reveal tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

mod page;
mod selector;

pub use page::{MemoryPage, NodeId};
pub use selector::{Compound, Selector};

use scroll_reveal_core::Rect;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: HashMap<String, String>,
}

/// A page description: body children plus environment knobs.
#[derive(Clone, Debug, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default = "default_viewport")]
    pub viewport: Rect,
    #[serde(default)]
    pub body: Vec<NodeFixture>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list.
    #[serde(default)]
    pub class: String,
    /// Document-space bounding box.
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

fn default_viewport() -> Rect {
    Rect::new(0.0, 0.0, 1280.0, 800.0)
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let path = fixtures_root().join(rel);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Names of all page fixtures, sorted.
pub fn page_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = MANIFEST.pages.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

pub fn page(name: &str) -> Result<PageFixture> {
    let rel = MANIFEST
        .pages
        .get(name)
        .ok_or_else(|| anyhow!("unknown page fixture `{name}`"))?;
    load_json(rel)
}

/// Load a fixture straight into a [`MemoryPage`].
pub fn memory_page(name: &str) -> Result<MemoryPage> {
    Ok(MemoryPage::from_fixture(&page(name)?))
}
