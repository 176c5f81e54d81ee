//! Scroll Reveal Core (host-agnostic)
//!
//! Drives the reveal-on-scroll behaviour of a page: pre-hide guard, reduced-motion
//! short-circuit, target selection, per-group stagger delays, one-shot reveal on
//! visibility and the load-time fallback that clears the pre-hide guard.
//!
//! The controller never touches a DOM directly. Adapters (wasm, test fixtures)
//! implement [`PageHost`] and feed intersection batches and timer completions
//! back into [`RevealController`].

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod outputs;
pub mod poller;
pub mod stagger;

// Re-exports for consumers (adapters)
pub use config::{ClassNames, Config, StaggerConfig, WatchOptions, DEFAULT_SELECTORS};
pub use controller::{Phase, RevealController, SetupOutcome, Target, TargetState};
pub use error::{HostError, RevealError};
pub use geometry::{intersection_ratio, Length, Rect, RootMargin};
pub use host::{Group, IntersectionEntry, PageHost};
pub use outputs::{ClearCause, RevealEvent, SkipReason, Snapshot};
pub use poller::ScrollPoller;
pub use stagger::{format_delay, Slot, StaggerTable};
