/*!
 * Process Registry
 * Authoritative set of process records and their queue membership
 */

use super::queues::StateQueues;
use super::types::{Process, ProcessState};
use crate::core::errors::SimError;
use crate::core::limits::TERMINATED_HISTORY;
use crate::core::types::{Megabytes, Pid, ResourceId, SimResult};
use ahash::RandomState;
use std::collections::HashMap;
use tracing::debug;

/// Process records plus the per-state queues that order them
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    processes: HashMap<Pid, Process, RandomState>,
    queues: StateQueues,
    next_pid: Pid,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self {
            processes: HashMap::with_hasher(RandomState::new()),
            queues: StateQueues::new(),
            next_pid: 1,
        }
    }

    /// Create a process in New with the next pid
    pub fn create(&mut self, memory_mb: Megabytes, resource: ResourceId) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;

        self.processes
            .insert(pid, Process::new(pid, memory_mb, resource));
        self.queues.push(ProcessState::New, pid);
        debug!(pid, memory_mb, resource, "Process created");
        pid
    }

    /// Move a process to a new state
    ///
    /// The only place a process's `state` changes. The process leaves its
    /// current queue and joins the tail of the target queue.
    pub fn transition(&mut self, pid: Pid, to: ProcessState) -> SimResult<()> {
        let process = self
            .processes
            .get_mut(&pid)
            .ok_or(SimError::ProcessNotFound(pid))?;
        let from = process.state;

        let running_taken = to == ProcessState::Running && self.queues.running().is_some();
        if !from.can_transition_to(to) || running_taken {
            return Err(SimError::InvalidTransition { pid, from, to });
        }

        if !self.queues.remove(from, pid) {
            return Err(SimError::InvariantViolation(format!(
                "process {} is {} but missing from that queue",
                pid, from
            )));
        }
        self.queues.push(to, pid);
        process.state = to;
        debug!(pid, %from, %to, "Process transition");

        if to.is_terminated() {
            self.prune_terminated();
        }
        Ok(())
    }

    /// Keep only the most recent Terminated records
    fn prune_terminated(&mut self) {
        while self.queues.len(ProcessState::Terminated) > TERMINATED_HISTORY {
            if let Some(old) = self.queues.pop_terminated() {
                self.processes.remove(&old);
                debug!(pid = old, "Terminated record pruned");
            }
        }
    }

    /// Move the Ready head to the back of Ready
    pub fn rotate_ready(&mut self) -> Option<Pid> {
        self.queues.rotate_ready()
    }

    #[inline]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    /// Pids of a state in queue order
    pub fn pids(&self, state: ProcessState) -> Vec<Pid> {
        self.queues.pids(state)
    }

    /// Processes of a state in queue order
    pub fn in_state(&self, state: ProcessState) -> impl Iterator<Item = &Process> + '_ {
        self.queues
            .pids(state)
            .into_iter()
            .filter_map(move |pid| self.processes.get(&pid))
    }

    pub fn front(&self, state: ProcessState) -> Option<Pid> {
        self.queues.front(state)
    }

    pub fn count(&self, state: ProcessState) -> usize {
        self.queues.len(state)
    }

    #[inline]
    pub fn running(&self) -> Option<Pid> {
        self.queues.running()
    }

    /// Processes that have not terminated
    pub fn live_count(&self) -> usize {
        self.processes.len() - self.queues.len(ProcessState::Terminated)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn queues(&self) -> &StateQueues {
        &self.queues
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    /// Mutable access to several processes at once, in the given order
    pub fn get_many_mut(&mut self, pids: &[Pid]) -> Vec<&mut Process> {
        let mut wanted: Vec<(usize, &mut Process)> = self
            .processes
            .iter_mut()
            .filter_map(|(pid, process)| {
                pids.iter()
                    .position(|p| p == pid)
                    .map(|order| (order, process))
            })
            .collect();
        wanted.sort_by_key(|(order, _)| *order);
        wanted.into_iter().map(|(_, process)| process).collect()
    }

    /// Drop every process; pids keep increasing afterwards
    pub fn clear(&mut self) {
        self.processes.clear();
        self.queues.clear();
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pids_are_monotonic() {
        let mut registry = ProcessRegistry::new();
        assert_eq!(registry.create(100, 0), 1);
        assert_eq!(registry.create(100, 1), 2);
        registry.clear();
        assert_eq!(registry.create(100, 2), 3);
    }

    #[test]
    fn test_transition_moves_between_queues() {
        let mut registry = ProcessRegistry::new();
        let pid = registry.create(100, 0);
        registry.transition(pid, ProcessState::Ready).unwrap();

        assert_eq!(registry.get(pid).unwrap().state, ProcessState::Ready);
        assert_eq!(registry.pids(ProcessState::New), Vec::<Pid>::new());
        assert_eq!(registry.pids(ProcessState::Ready), vec![pid]);
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let mut registry = ProcessRegistry::new();
        let pid = registry.create(100, 0);
        let err = registry.transition(pid, ProcessState::Running).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidTransition {
                pid,
                from: ProcessState::New,
                to: ProcessState::Running
            }
        );
        assert_eq!(registry.pids(ProcessState::New), vec![pid]);
    }

    #[test]
    fn test_second_running_rejected() {
        let mut registry = ProcessRegistry::new();
        let a = registry.create(100, 0);
        let b = registry.create(100, 1);
        for pid in [a, b] {
            registry.transition(pid, ProcessState::Ready).unwrap();
        }
        registry.transition(a, ProcessState::Running).unwrap();
        assert!(registry.transition(b, ProcessState::Running).is_err());
        assert_eq!(registry.running(), Some(a));
    }

    #[test]
    fn test_unknown_pid() {
        let mut registry = ProcessRegistry::new();
        assert_eq!(
            registry.transition(42, ProcessState::Ready),
            Err(SimError::ProcessNotFound(42))
        );
    }

    #[test]
    fn test_live_count_excludes_terminated() {
        let mut registry = ProcessRegistry::new();
        let a = registry.create(100, 0);
        registry.create(100, 0);
        registry.transition(a, ProcessState::Ready).unwrap();
        registry.transition(a, ProcessState::Running).unwrap();
        registry.transition(a, ProcessState::Terminated).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_terminated_history_is_bounded() {
        let mut registry = ProcessRegistry::new();
        let total = TERMINATED_HISTORY + 5;
        for _ in 0..total {
            let pid = registry.create(50, 0);
            registry.transition(pid, ProcessState::Ready).unwrap();
            registry.transition(pid, ProcessState::Running).unwrap();
            registry.transition(pid, ProcessState::Terminated).unwrap();
        }

        assert_eq!(registry.len(), TERMINATED_HISTORY);
        assert_eq!(registry.count(ProcessState::Terminated), TERMINATED_HISTORY);
        assert!(registry.get(1).is_none());
        assert_eq!(registry.front(ProcessState::Terminated), Some(6));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_get_many_mut_keeps_order() {
        let mut registry = ProcessRegistry::new();
        let a = registry.create(100, 0);
        let b = registry.create(200, 0);
        let c = registry.create(300, 0);
        let got: Vec<Pid> = registry
            .get_many_mut(&[c, a, b])
            .iter()
            .map(|p| p.pid)
            .collect();
        assert_eq!(got, vec![c, a, b]);
    }
}
