//! Reveal controller: one-shot setup plus the watcher and load-fallback callbacks.
//!
//! Methods:
//! - start (pre-hide guard → reduced-motion check → selection → stagger → watch)
//! - handle_intersections (reveal once, then unobserve)
//! - complete_load_fallback (clear the pre-hide guard)
//!
//! The controller owns all page-lifetime state. Hosts call back into it from
//! their event loop; each call runs to completion.

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::RevealError;
use crate::host::{Group, IntersectionEntry, PageHost};
use crate::outputs::{ClearCause, RevealEvent, SkipReason, Snapshot};
use crate::stagger::{format_delay, StaggerTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Initializing,
    /// Watcher installed, some targets still pending.
    Watching,
    /// Every target has been revealed.
    Settled,
    Skipped(SkipReason),
    /// A host primitive failed during setup.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Pending,
    Revealed,
}

/// A classified element and its stagger slot.
#[derive(Clone, Debug)]
pub struct Target<E> {
    pub element: E,
    pub group_index: usize,
    pub delay_ms: u32,
    pub state: TargetState,
}

/// What `start` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    ReducedMotion,
    NoTargets,
    Watching {
        targets: usize,
        /// Milliseconds to wait after the full-load event before calling
        /// [`RevealController::complete_load_fallback`].
        load_fallback_ms: u32,
    },
}

#[derive(Debug)]
pub struct RevealController<E> {
    cfg: Config,
    phase: Phase,
    targets: Vec<Target<E>>,
    groups: usize,
    init_flag: bool,
    events: Vec<RevealEvent>,
}

impl<E: Clone + PartialEq + std::fmt::Debug> RevealController<E> {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            phase: Phase::Idle,
            targets: Vec::new(),
            groups: 0,
            init_flag: false,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn targets(&self) -> &[Target<E>] {
        &self.targets
    }

    /// Whether this controller currently holds the init flag on the page root.
    pub fn init_flag(&self) -> bool {
        self.init_flag
    }

    pub fn load_fallback_delay_ms(&self) -> u32 {
        self.cfg.load_fallback_ms
    }

    /// Run setup once the document structure is ready.
    ///
    /// On a host failure the init flag is removed before the error is returned,
    /// so the page is never left hidden by a failed setup.
    pub fn start<H>(&mut self, host: &mut H) -> Result<SetupOutcome, RevealError>
    where
        H: PageHost<Element = E>,
    {
        if self.phase != Phase::Idle {
            return Err(RevealError::AlreadyStarted);
        }
        match self.setup(host) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("reveal setup failed: {e}");
                self.phase = Phase::Failed;
                self.clear_init_flag(host, ClearCause::SetupFailed);
                Err(e)
            }
        }
    }

    fn setup<H>(&mut self, host: &mut H) -> Result<SetupOutcome, RevealError>
    where
        H: PageHost<Element = E>,
    {
        host.set_root_class(&self.cfg.classes.init, true);
        self.init_flag = true;
        self.phase = Phase::Initializing;
        self.events.push(RevealEvent::InitFlagSet);

        if host.prefers_reduced_motion(&self.cfg.reduced_motion_query)? {
            info!("reduced motion requested; reveal disabled");
            return Ok(self.skip(host, SkipReason::ReducedMotion));
        }

        let mut elements = Vec::new();
        for selector in &self.cfg.selectors {
            let found = host.query_all(selector)?;
            trace!("selector {selector:?} matched {}", found.len());
            elements.extend(found);
        }
        if elements.is_empty() {
            info!("no reveal targets on page");
            return Ok(self.skip(host, SkipReason::NoTargets));
        }

        // Create the watcher before touching any target so that a missing
        // primitive leaves no element classified.
        host.install_watcher(&self.cfg.watch)?;

        let mut stagger: StaggerTable<Group<E>> = StaggerTable::new(self.cfg.stagger);
        self.targets.reserve(elements.len());
        for element in elements {
            host.add_class(&element, &self.cfg.classes.animatable);
            let group = host
                .closest(&element, &self.cfg.group_selector)
                .map_or(Group::Root, Group::Section);
            let slot = stagger.assign(group);
            host.set_transition_delay(&element, &format_delay(slot.delay_ms));
            self.events.push(RevealEvent::Classified {
                index: self.targets.len(),
                group_index: slot.group_index,
                delay_ms: slot.delay_ms,
            });
            self.targets.push(Target {
                element,
                group_index: slot.group_index,
                delay_ms: slot.delay_ms,
                state: TargetState::Pending,
            });
        }
        self.groups = stagger.group_count();
        debug!(
            "classified {} targets across {} groups",
            self.targets.len(),
            self.groups
        );

        for t in &self.targets {
            host.observe(&t.element);
        }
        self.events.push(RevealEvent::WatcherInstalled {
            targets: self.targets.len(),
        });
        self.phase = Phase::Watching;

        Ok(SetupOutcome::Watching {
            targets: self.targets.len(),
            load_fallback_ms: self.cfg.load_fallback_ms,
        })
    }

    fn skip<H>(&mut self, host: &mut H, reason: SkipReason) -> SetupOutcome
    where
        H: PageHost<Element = E>,
    {
        self.clear_init_flag(host, reason.into());
        self.phase = Phase::Skipped(reason);
        self.events.push(RevealEvent::Skipped { reason });
        match reason {
            SkipReason::ReducedMotion => SetupOutcome::ReducedMotion,
            SkipReason::NoTargets => SetupOutcome::NoTargets,
        }
    }

    fn clear_init_flag<H>(&mut self, host: &mut H, cause: ClearCause)
    where
        H: PageHost<Element = E>,
    {
        host.set_root_class(&self.cfg.classes.init, false);
        if self.init_flag {
            self.init_flag = false;
            self.events.push(RevealEvent::InitFlagCleared { cause });
        }
    }

    /// Apply one watcher batch. Returns how many targets were newly revealed.
    ///
    /// Entries that are not intersecting, or that name an element that is not
    /// a pending target, are ignored.
    pub fn handle_intersections<H, I>(&mut self, host: &mut H, entries: I) -> usize
    where
        H: PageHost<Element = E>,
        I: IntoIterator<Item = IntersectionEntry<E>>,
    {
        if !matches!(self.phase, Phase::Watching | Phase::Settled) {
            trace!("intersection batch ignored in phase {:?}", self.phase);
            return 0;
        }
        let mut newly = 0;
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            let mut hit = false;
            // An element matched by two selectors owns two targets; reveal both.
            for (index, t) in self.targets.iter_mut().enumerate() {
                if t.state == TargetState::Pending && t.element == entry.target {
                    t.state = TargetState::Revealed;
                    self.events.push(RevealEvent::Revealed { index });
                    newly += 1;
                    hit = true;
                }
            }
            if hit {
                host.add_class(&entry.target, &self.cfg.classes.revealed);
                host.unobserve(&entry.target);
            } else {
                trace!("no pending target for {:?}", entry.target);
            }
        }
        if newly > 0 && self.pending() == 0 {
            debug!("all {} targets revealed", self.targets.len());
            self.phase = Phase::Settled;
        }
        newly
    }

    /// Full-load fallback: clear the init flag unconditionally. Idempotent.
    pub fn complete_load_fallback<H>(&mut self, host: &mut H)
    where
        H: PageHost<Element = E>,
    {
        debug!("load fallback fired; {} targets pending", self.pending());
        self.clear_init_flag(host, ClearCause::LoadFallback);
    }

    pub fn revealed(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state == TargetState::Revealed)
            .count()
    }

    pub fn pending(&self) -> usize {
        self.targets.len() - self.revealed()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            targets: self.targets.len(),
            revealed: self.revealed(),
            pending: self.pending(),
            groups: self.groups,
            init_flag: self.init_flag,
            delays_ms: self.targets.iter().map(|t| t.delay_ms).collect(),
        }
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<RevealEvent> {
        std::mem::take(&mut self.events)
    }
}
