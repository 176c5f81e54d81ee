//! Event log and snapshot emitted by the controller.
//!
//! Adapters drain events for diagnostics; nothing in the controller depends
//! on them being consumed.

use serde::{Deserialize, Serialize};

use crate::controller::Phase;

/// Why setup terminated without watching anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ReducedMotion,
    NoTargets,
}

/// Which path removed the init flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearCause {
    ReducedMotion,
    NoTargets,
    LoadFallback,
    SetupFailed,
}

impl From<SkipReason> for ClearCause {
    fn from(r: SkipReason) -> Self {
        match r {
            SkipReason::ReducedMotion => ClearCause::ReducedMotion,
            SkipReason::NoTargets => ClearCause::NoTargets,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealEvent {
    InitFlagSet,
    Skipped {
        reason: SkipReason,
    },
    Classified {
        index: usize,
        group_index: usize,
        delay_ms: u32,
    },
    WatcherInstalled {
        targets: usize,
    },
    Revealed {
        index: usize,
    },
    InitFlagCleared {
        cause: ClearCause,
    },
}

/// Point-in-time view of the controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub targets: usize,
    pub revealed: usize,
    pub pending: usize,
    pub groups: usize,
    pub init_flag: bool,
    pub delays_ms: Vec<u32>,
}
