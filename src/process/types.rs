/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{Megabytes, PageIndex, Pid, ResourceId};
use serde::{Deserialize, Serialize};

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Created, waiting for memory
    New,
    /// Memory granted, waiting for the CPU
    Ready,
    /// Holding the CPU
    Running,
    /// Waiting on a resource or simulated I/O
    Blocked,
    /// Memory reclaimed, waiting to be reinstated
    Swapped,
    /// Finished; absorbing
    Terminated,
}

impl ProcessState {
    /// Edges of the lifecycle state machine
    #[must_use]
    pub const fn can_transition_to(self, to: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, to),
            (New, Ready)
                | (Ready, Running)
                | (Ready, Blocked)
                | (Running, Blocked)
                | (Running, Swapped)
                | (Running, Terminated)
                | (Blocked, Ready)
                | (Swapped, Ready)
                | (Swapped, Blocked)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, ProcessState::Terminated)
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ProcessState::New => "New",
            ProcessState::Ready => "Ready",
            ProcessState::Running => "Running",
            ProcessState::Blocked => "Blocked",
            ProcessState::Swapped => "Swapped",
            ProcessState::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

/// Process record, owned by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub memory_mb: Megabytes,
    pub state: ProcessState,
    /// Owned page frames in allocation order
    pub pages: Vec<PageIndex>,
    /// Resource this process needs while running; fixed at creation
    pub resource: ResourceId,
    /// Number of Running -> Blocked transitions so far
    pub blocked_count: u32,
}

impl Process {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, memory_mb: Megabytes, resource: ResourceId) -> Self {
        Self {
            pid,
            memory_mb,
            state: ProcessState::New,
            pages: Vec::new(),
            resource,
            blocked_count: 0,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn has_blocked_before(&self) -> bool {
        self.blocked_count > 0
    }

    #[must_use]
    pub fn view(&self) -> ProcessView {
        ProcessView {
            pid: self.pid,
            memory_mb: self.memory_mb,
            state: self.state,
            pages: self.pages.clone(),
            resource: self.resource,
            blocked_count: self.blocked_count,
        }
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process {}: {} (Memory: {} MB) Resource: R{}",
            self.pid, self.state, self.memory_mb, self.resource
        )
    }
}

/// Read-only copy of a process for snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessView {
    pub pid: Pid,
    pub memory_mb: Megabytes,
    pub state: ProcessState,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub pages: Vec<PageIndex>,
    pub resource: ResourceId,
    pub blocked_count: u32,
}
