//! Per-group stagger counters.

use crate::config::StaggerConfig;

/// Counts targets per group and turns the running index into a delay.
///
/// Counters are uncapped; only the delay saturates at `max_index * step_ms`.
/// Groups are looked up by equality, which is fine for the handful of
/// sections a page has.
#[derive(Debug)]
pub struct StaggerTable<G> {
    cfg: StaggerConfig,
    groups: Vec<(G, u32)>,
}

/// Result of one [`StaggerTable::assign`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Position of the group in first-seen order.
    pub group_index: usize,
    /// Uncapped position of the target within its group.
    pub index: u32,
    pub delay_ms: u32,
}

impl<G: PartialEq> StaggerTable<G> {
    pub fn new(cfg: StaggerConfig) -> Self {
        Self {
            cfg,
            groups: Vec::new(),
        }
    }

    /// Delay for the `index`-th target of a group.
    pub fn delay_for(&self, index: u32) -> u32 {
        index.min(self.cfg.max_index).saturating_mul(self.cfg.step_ms)
    }

    /// Reserve the next slot in `group`.
    pub fn assign(&mut self, group: G) -> Slot {
        let group_index = match self.groups.iter().position(|(g, _)| *g == group) {
            Some(i) => i,
            None => {
                self.groups.push((group, 0));
                self.groups.len() - 1
            }
        };
        let counter = &mut self.groups[group_index].1;
        let index = *counter;
        *counter = counter.saturating_add(1);
        Slot {
            group_index,
            index,
            delay_ms: self.delay_for(index),
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// CSS time value for a delay in milliseconds.
pub fn format_delay(ms: u32) -> String {
    format!("{ms}ms")
}
