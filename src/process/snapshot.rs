/*!
 * System Snapshot
 * Consistent read-only view of the simulator for the presentation layer
 */

use super::types::{ProcessState, ProcessView};
use crate::core::limits::TERMINATED_RENDERED;
use crate::core::types::Megabytes;
use crate::memory::{MemoryPressure, PageSlotView};
use crate::resources::ResourceView;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processes of each queue in FIFO order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueSnapshot {
    pub new: Vec<ProcessView>,
    pub ready: Vec<ProcessView>,
    pub blocked: Vec<ProcessView>,
    pub swapped: Vec<ProcessView>,
    pub terminated: Vec<ProcessView>,
}

/// Everything the presentation layer draws, taken under one read lock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SystemSnapshot {
    pub queues: QueueSnapshot,
    pub running: Option<ProcessView>,
    pub page_table: Vec<PageSlotView>,
    pub resources: Vec<ResourceView>,
    pub used_memory: Megabytes,
    pub total_memory: Megabytes,
    pub page_size: Megabytes,
    pub pressure: MemoryPressure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl SystemSnapshot {
    /// Processes currently in a state, in queue order
    pub fn processes(&self, state: ProcessState) -> &[ProcessView] {
        match state {
            ProcessState::New => &self.queues.new,
            ProcessState::Ready => &self.queues.ready,
            ProcessState::Blocked => &self.queues.blocked,
            ProcessState::Swapped => &self.queues.swapped,
            ProcessState::Terminated => &self.queues.terminated,
            ProcessState::Running => self.running.as_slice(),
        }
    }

    pub fn count(&self, state: ProcessState) -> usize {
        self.processes(state).len()
    }

    /// Frames owned by any process
    pub fn used_pages(&self) -> usize {
        self.page_table.iter().filter(|s| s.owner.is_some()).count()
    }
}

fn write_queue(f: &mut fmt::Formatter<'_>, name: &str, processes: &[ProcessView]) -> fmt::Result {
    write!(f, "{:<11}", name)?;
    if processes.is_empty() {
        write!(f, " -")?;
    }
    for p in processes {
        write!(f, " P{}({}MB,R{})", p.pid, p.memory_mb, p.resource)?;
    }
    writeln!(f)
}

/// Text frame: one line per queue, the page table, then resources
impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Memory {}/{} MB ({} pressure), page size {} MB",
            self.used_memory, self.total_memory, self.pressure, self.page_size
        )?;
        match &self.running {
            Some(p) => writeln!(f, "{:<11} P{}({}MB,R{})", "Running", p.pid, p.memory_mb, p.resource)?,
            None => writeln!(f, "{:<11} idle", "Running")?,
        }
        write_queue(f, "New", &self.queues.new)?;
        write_queue(f, "Ready", &self.queues.ready)?;
        write_queue(f, "Blocked", &self.queues.blocked)?;
        write_queue(f, "Swapped", &self.queues.swapped)?;
        let terminated = &self.queues.terminated;
        let hidden = terminated.len().saturating_sub(TERMINATED_RENDERED);
        write_queue(f, "Terminated", &terminated[hidden..])?;
        if hidden > 0 {
            writeln!(f, "{:<11} ... and {} earlier", "", hidden)?;
        }

        write!(f, "Pages     ")?;
        for slot in &self.page_table {
            match slot.owner {
                Some(pid) => write!(f, " [{}:P{}]", slot.index, pid)?,
                None => write!(f, " [{}:-]", slot.index)?,
            }
        }
        writeln!(f)?;

        write!(f, "Resources ")?;
        for r in &self.resources {
            match r.owner {
                Some(pid) => write!(f, " R{}=P{}", r.id, pid)?,
                None => write!(f, " R{}=free", r.id)?,
            }
        }
        writeln!(f)
    }
}
