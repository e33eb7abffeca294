/*!
 * State Queues
 * One FIFO per lifecycle state plus the single Running slot
 */

use super::types::ProcessState;
use crate::core::types::Pid;
use std::collections::VecDeque;

/// Ordered membership of every process, keyed by state
#[derive(Debug, Clone, Default)]
pub struct StateQueues {
    new: VecDeque<Pid>,
    ready: VecDeque<Pid>,
    running: Option<Pid>,
    blocked: VecDeque<Pid>,
    swapped: VecDeque<Pid>,
    terminated: VecDeque<Pid>,
}

impl StateQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, state: ProcessState) -> Option<&VecDeque<Pid>> {
        match state {
            ProcessState::New => Some(&self.new),
            ProcessState::Ready => Some(&self.ready),
            ProcessState::Blocked => Some(&self.blocked),
            ProcessState::Swapped => Some(&self.swapped),
            ProcessState::Terminated => Some(&self.terminated),
            ProcessState::Running => None,
        }
    }

    fn queue_mut(&mut self, state: ProcessState) -> Option<&mut VecDeque<Pid>> {
        match state {
            ProcessState::New => Some(&mut self.new),
            ProcessState::Ready => Some(&mut self.ready),
            ProcessState::Blocked => Some(&mut self.blocked),
            ProcessState::Swapped => Some(&mut self.swapped),
            ProcessState::Terminated => Some(&mut self.terminated),
            ProcessState::Running => None,
        }
    }

    /// Append to the tail of a queue, or fill the Running slot
    ///
    /// Returns false if the Running slot is already taken.
    pub fn push(&mut self, state: ProcessState, pid: Pid) -> bool {
        if state == ProcessState::Running {
            if self.running.is_some() {
                return false;
            }
            self.running = Some(pid);
            return true;
        }
        if let Some(queue) = self.queue_mut(state) {
            queue.push_back(pid);
        }
        true
    }

    /// Remove a pid from a queue (or the Running slot)
    pub fn remove(&mut self, state: ProcessState, pid: Pid) -> bool {
        if state == ProcessState::Running {
            if self.running != Some(pid) {
                return false;
            }
            self.running = None;
            return true;
        }
        let Some(queue) = self.queue_mut(state) else {
            return false;
        };
        match queue.iter().position(|&p| p == pid) {
            Some(pos) => queue.remove(pos).is_some(),
            None => false,
        }
    }

    /// Drop the oldest Terminated pid
    pub fn pop_terminated(&mut self) -> Option<Pid> {
        self.terminated.pop_front()
    }

    /// Head of a queue without removing it
    pub fn front(&self, state: ProcessState) -> Option<Pid> {
        match self.queue(state) {
            Some(queue) => queue.front().copied(),
            None => self.running,
        }
    }

    /// Members of a state in FIFO order
    pub fn pids(&self, state: ProcessState) -> Vec<Pid> {
        match self.queue(state) {
            Some(queue) => queue.iter().copied().collect(),
            None => self.running.into_iter().collect(),
        }
    }

    pub fn len(&self, state: ProcessState) -> usize {
        match self.queue(state) {
            Some(queue) => queue.len(),
            None => usize::from(self.running.is_some()),
        }
    }

    pub fn contains(&self, state: ProcessState, pid: Pid) -> bool {
        match self.queue(state) {
            Some(queue) => queue.contains(&pid),
            None => self.running == Some(pid),
        }
    }

    #[inline]
    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    /// Move the Ready head to the Ready tail
    pub fn rotate_ready(&mut self) -> Option<Pid> {
        let head = self.ready.pop_front()?;
        self.ready.push_back(head);
        Some(head)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queues = StateQueues::new();
        queues.push(ProcessState::Ready, 1);
        queues.push(ProcessState::Ready, 2);
        queues.push(ProcessState::Ready, 3);

        assert_eq!(queues.front(ProcessState::Ready), Some(1));
        assert!(queues.remove(ProcessState::Ready, 2));
        assert_eq!(queues.pids(ProcessState::Ready), vec![1, 3]);
    }

    #[test]
    fn test_single_running_slot() {
        let mut queues = StateQueues::new();
        assert!(queues.push(ProcessState::Running, 1));
        assert!(!queues.push(ProcessState::Running, 2));
        assert_eq!(queues.running(), Some(1));
        assert!(!queues.remove(ProcessState::Running, 2));
        assert!(queues.remove(ProcessState::Running, 1));
        assert_eq!(queues.len(ProcessState::Running), 0);
    }

    #[test]
    fn test_running_slot_is_separate_from_queues() {
        let mut queues = StateQueues::new();
        assert!(queues.push(ProcessState::Ready, 1));
        assert!(queues.push(ProcessState::Running, 2));
        assert!(queues.push(ProcessState::Blocked, 3));

        assert!(!queues.remove(ProcessState::Running, 1));
        assert!(!queues.remove(ProcessState::Ready, 2));
        assert!(queues.contains(ProcessState::Running, 2));
        assert!(queues.remove(ProcessState::Running, 2));
        assert!(queues.push(ProcessState::Running, 1));
        assert_eq!(queues.pids(ProcessState::Ready), vec![1]);
        assert_eq!(queues.pids(ProcessState::Blocked), vec![3]);
    }

    #[test]
    fn test_rotate_ready() {
        let mut queues = StateQueues::new();
        assert_eq!(queues.rotate_ready(), None);
        queues.push(ProcessState::Ready, 1);
        queues.push(ProcessState::Ready, 2);
        assert_eq!(queues.rotate_ready(), Some(1));
        assert_eq!(queues.pids(ProcessState::Ready), vec![2, 1]);
    }
}
