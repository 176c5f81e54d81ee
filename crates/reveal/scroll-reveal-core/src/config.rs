//! Controller configuration.
//!
//! Every field has a default, so hosts can pass a partial JSON object. The
//! defaults are the visual contract the page stylesheet is written against.

use serde::{Deserialize, Serialize};

use crate::error::RevealError;
use crate::geometry::RootMargin;

/// Structural selectors evaluated in order to pick reveal targets.
pub const DEFAULT_SELECTORS: [&str; 6] = [
    ".section-head",
    "#services .card",
    "#our-story .tl-card",
    "#testimonials .t",
    ".svc-frame",
    ".story-banner",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selectors evaluated in order; matches are concatenated without cross-selector de-duplication.
    pub selectors: Vec<String>,
    /// Nearest ancestor matching this selector scopes the stagger counter.
    pub group_selector: String,
    pub classes: ClassNames,
    pub stagger: StaggerConfig,
    pub watch: WatchOptions,
    /// Delay between the full-load event and clearing the init flag.
    pub load_fallback_ms: u32,
    /// Media query consulted for the reduced-motion preference.
    pub reduced_motion_query: String,
    /// Adapter hint: poll element geometry when no native watcher exists.
    pub polling_fallback: bool,
    /// Adapter hint: `log` level filter (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

/// Class names toggled on the page root and on targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub init: String,
    pub animatable: String,
    pub revealed: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub step_ms: u32,
    /// Highest index that still increases the delay.
    pub max_index: u32,
}

/// Options for the shared visibility watcher.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Fraction of the target area that must be visible.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            group_selector: "section".into(),
            classes: ClassNames::default(),
            stagger: StaggerConfig::default(),
            watch: WatchOptions::default(),
            load_fallback_ms: 60,
            reduced_motion_query: "(prefers-reduced-motion: reduce)".into(),
            polling_fallback: false,
            log_level: "warn".into(),
        }
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            init: "reveal-init".into(),
            animatable: "reveal".into(),
            revealed: "in".into(),
        }
    }
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            step_ms: 60,
            max_index: 4,
        }
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.18,
            root_margin: RootMargin::default(),
        }
    }
}

impl Config {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, RevealError> {
        let cfg: Config = serde_json::from_str(s)
            .map_err(|e| RevealError::InvalidConfig(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RevealError> {
        if let Some(i) = self.selectors.iter().position(|s| s.trim().is_empty()) {
            return Err(RevealError::InvalidConfig(format!("selector #{i} is empty")));
        }
        if self.group_selector.trim().is_empty() {
            return Err(RevealError::InvalidConfig("group_selector is empty".into()));
        }
        for (name, class) in [
            ("init", &self.classes.init),
            ("animatable", &self.classes.animatable),
            ("revealed", &self.classes.revealed),
        ] {
            if class.is_empty() || class.contains(char::is_whitespace) {
                return Err(RevealError::InvalidConfig(format!(
                    "class name `{name}` must be a single non-empty token"
                )));
            }
        }
        let t = self.watch.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(RevealError::InvalidConfig(format!(
                "threshold {t} outside [0, 1]"
            )));
        }
        // Host timers take a signed 32-bit millisecond count.
        if self.load_fallback_ms > i32::MAX as u32 {
            return Err(RevealError::InvalidConfig(format!(
                "load_fallback_ms {} exceeds {}",
                self.load_fallback_ms,
                i32::MAX
            )));
        }
        Ok(())
    }

    /// Largest delay any target can receive.
    pub fn max_delay_ms(&self) -> u32 {
        self.stagger.step_ms.saturating_mul(self.stagger.max_index)
    }
}
