/*!
 * Resource Table
 * Exclusive ownership of the simulator's shared resources (R0, R1, ...)
 */

use crate::core::types::{Pid, ResourceId};
use crate::process::Process;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One resource as shown to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceView {
    pub id: ResourceId,
    pub owner: Option<Pid>,
}

/// Fixed set of resources, each free or held by exactly one process
#[derive(Debug, Clone)]
pub struct ResourceTable {
    holders: Vec<Option<Pid>>,
}

impl ResourceTable {
    pub fn new(count: usize) -> Self {
        Self {
            holders: vec![None; count],
        }
    }

    /// Claim the process's required resource if nobody else holds it
    ///
    /// No waiting happens here; the caller turns a refusal into a state
    /// transition.
    pub fn try_acquire(&mut self, process: &Process) -> bool {
        let Some(slot) = self.holders.get_mut(process.resource) else {
            return false;
        };
        match *slot {
            None => {
                *slot = Some(process.pid);
                debug!(pid = process.pid, resource = process.resource, "Resource acquired");
                true
            }
            Some(holder) => holder == process.pid,
        }
    }

    /// Release the process's resource if it holds it
    pub fn release(&mut self, process: &Process) {
        if let Some(slot) = self.holders.get_mut(process.resource) {
            if *slot == Some(process.pid) {
                *slot = None;
                debug!(pid = process.pid, resource = process.resource, "Resource released");
            }
        }
    }

    /// Whether acquiring would succeed right now, without claiming
    #[must_use]
    pub fn is_available_for(&self, process: &Process) -> bool {
        matches!(
            self.holders.get(process.resource),
            Some(None)
        ) || self.holds(process)
    }

    #[must_use]
    pub fn holds(&self, process: &Process) -> bool {
        self.holder(process.resource) == Some(process.pid)
    }

    #[must_use]
    pub fn holder(&self, resource: ResourceId) -> Option<Pid> {
        self.holders.get(resource).copied().flatten()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn clear(&mut self) {
        self.holders.fill(None);
    }

    pub fn views(&self) -> Vec<ResourceView> {
        self.holders
            .iter()
            .enumerate()
            .map(|(id, owner)| ResourceView { id, owner: *owner })
            .collect()
    }
}
