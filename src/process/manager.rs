/*!
 * Process Management
 *
 * Coordinates the registry, page table and resource table behind a single
 * lock. Every operation that reads then mutates shared state (admission,
 * dispatch, outcome resolution, recovery, swap review) runs inside one write
 * critical section, so there are no lost updates or double allocations.
 * No lock is ever held across an `.await`.
 */

use super::registry::ProcessRegistry;
use super::snapshot::{QueueSnapshot, SystemSnapshot};
use super::types::{Process, ProcessState, ProcessView};
use crate::core::config::SimConfig;
use crate::core::errors::SimError;
use crate::core::types::{Megabytes, Pid, SimResult};
use crate::memory::PageTable;
use crate::resources::ResourceTable;
use crate::scheduler::atomic_stats::{AtomicSchedulerStats, SchedulerStats};
use crate::scheduler::policy::{
    ContentionMode, DispatchDecision, Outcome, OutcomeTable, RecoverySelection,
};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const QUEUE_ORDER: [ProcessState; 6] = [
    ProcessState::New,
    ProcessState::Ready,
    ProcessState::Running,
    ProcessState::Blocked,
    ProcessState::Swapped,
    ProcessState::Terminated,
];

/// Shared mutable state guarded by the manager's lock
pub(super) struct SystemState {
    pub(super) registry: ProcessRegistry,
    pub(super) pages: PageTable,
    pub(super) resources: ResourceTable,
    pub(super) rng: StdRng,
    pub(super) advisory: Option<String>,
}

/// Cloneable handle to the simulator core
///
/// All clones share the same state; the scheduler loops and the presentation
/// layer each hold one.
#[derive(Clone)]
pub struct ProcessManager {
    pub(super) state: Arc<RwLock<SystemState>>,
    pub(super) config: Arc<SimConfig>,
    pub(super) outcomes: OutcomeTable,
    pub(super) stats: Arc<AtomicSchedulerStats>,
}

impl ProcessManager {
    /// Create a builder for constructing a ProcessManager
    pub fn builder() -> super::manager_builder::ProcessManagerBuilder {
        super::manager_builder::ProcessManagerBuilder::new()
    }

    /// Create a process in New
    ///
    /// Rejects zero-sized requests and requests larger than all of memory,
    /// which could never be admitted. Anything else waits in New until
    /// admission finds enough free pages.
    pub fn create_process(&self, memory_mb: Megabytes) -> SimResult<Pid> {
        if memory_mb == 0 {
            return Err(SimError::InvalidInput(
                "memory must be positive, got 0".to_string(),
            ));
        }

        let mut state = self.state.write();
        let pages_needed = state.pages.pages_needed(memory_mb);
        if pages_needed > state.pages.page_count() {
            return Err(SimError::InsufficientMemory {
                requested_mb: memory_mb,
                pages_needed,
                free_pages: state.pages.free_slots(),
            });
        }

        Ok(self.create_locked(&mut state, memory_mb))
    }

    /// Create a process with a random memory demand, unless the live cap is reached
    pub fn spawn_random_process(&self) -> Option<Pid> {
        let mut state = self.state.write();
        if state.registry.live_count() >= self.config.max_live_processes {
            debug!(
                live = state.registry.live_count(),
                cap = self.config.max_live_processes,
                "Arrival skipped, process cap reached"
            );
            return None;
        }

        let memory_mb = state
            .rng
            .gen_range(self.config.arrival_memory_min_mb..=self.config.arrival_memory_max_mb);
        Some(self.create_locked(&mut state, memory_mb))
    }

    fn create_locked(&self, state: &mut SystemState, memory_mb: Megabytes) -> Pid {
        let resource = state.rng.gen_range(0..state.resources.len());
        let pid = state.registry.create(memory_mb, resource);
        self.stats.inc_arrivals();
        info!(pid, memory_mb, resource, "Process arrived in New");
        pid
    }

    /// Try to page in every New process, oldest first
    ///
    /// Returns the pids moved to Ready. Processes that do not fit stay in New
    /// and leave an advisory behind.
    pub fn admit_new(&self) -> Vec<Pid> {
        let mut guard = self.state.write();
        let SystemState {
            registry,
            pages,
            advisory,
            ..
        } = &mut *guard;

        let mut admitted = Vec::new();
        for pid in registry.pids(ProcessState::New) {
            let Some(process) = registry.get_mut(pid) else {
                continue;
            };

            if pages.allocate(process) {
                match registry.transition(pid, ProcessState::Ready) {
                    Ok(()) => {
                        self.stats.inc_admissions();
                        info!(pid, used_mb = pages.used_memory(), "Process admitted to Ready");
                        admitted.push(pid);
                    }
                    Err(e) => error!(pid, error = %e, "Admission transition failed"),
                }
            } else {
                let err = SimError::InsufficientMemory {
                    requested_mb: process.memory_mb,
                    pages_needed: pages.pages_needed(process.memory_mb),
                    free_pages: pages.free_slots(),
                };
                self.stats.inc_admission_deferrals();
                warn!(pid, error = %err, "Process stays in New");
                if let Some(message) = err.advisory() {
                    *advisory = Some(format!("Process {} stays in New. {}", pid, message));
                }
            }
        }
        admitted
    }

    /// Give the CPU to the head of Ready, if the CPU is idle
    pub fn dispatch_next(&self) -> Option<DispatchDecision> {
        let mut guard = self.state.write();
        let SystemState {
            registry,
            resources,
            advisory,
            ..
        } = &mut *guard;

        if registry.running().is_some() {
            return None;
        }
        let pid = registry.front(ProcessState::Ready)?;
        let process = registry.get(pid)?;
        let resource = process.resource;

        if resources.try_acquire(process) {
            if let Err(e) = registry.transition(pid, ProcessState::Running) {
                error!(pid, error = %e, "Dispatch transition failed");
                return None;
            }
            self.stats.inc_dispatches();
            info!(pid, resource, "Process dispatched to Running");
            return Some(DispatchDecision::Running(pid));
        }

        let holder = resources.holder(resource).unwrap_or_default();
        match self.config.contention {
            ContentionMode::Resource => {
                if let Err(e) = registry.transition(pid, ProcessState::Blocked) {
                    error!(pid, error = %e, "Blocking transition failed");
                    return None;
                }
                let err = SimError::ResourceUnavailable {
                    pid,
                    resource,
                    holder,
                };
                self.stats.inc_resource_blocks();
                warn!(pid, resource, holder, "Resource busy, process blocked");
                if let Some(message) = err.advisory() {
                    *advisory = Some(message);
                }
                Some(DispatchDecision::Blocked(pid))
            }
            ContentionMode::Requeue => {
                registry.rotate_ready();
                self.stats.inc_requeues();
                debug!(pid, resource, holder, "Resource busy, process requeued");
                Some(DispatchDecision::Requeued(pid))
            }
        }
    }

    /// Resolve the end of a Running process's execution slice
    pub fn complete_running(&self, pid: Pid) -> SimResult<Outcome> {
        let mut guard = self.state.write();
        let SystemState {
            registry,
            pages,
            resources,
            rng,
            advisory,
        } = &mut *guard;

        let swap_available = registry.count(ProcessState::Swapped) < self.config.max_swapped;
        let process = registry
            .get_mut(pid)
            .ok_or(SimError::ProcessNotFound(pid))?;
        if process.state != ProcessState::Running {
            return Err(SimError::NotRunning(pid));
        }

        let outcome = self.outcomes.sample(rng, process, swap_available);
        let target = match outcome {
            Outcome::Block => {
                process.blocked_count += 1;
                self.stats.inc_execution_blocks();
                *advisory = Some(format!(
                    "Process {} blocked during execution",
                    pid
                ));
                ProcessState::Blocked
            }
            Outcome::Swap => {
                let freed = pages.free(process);
                resources.release(process);
                self.stats.inc_swap_outs();
                debug!(pid, freed, "Process memory reclaimed for swap");
                ProcessState::Swapped
            }
            Outcome::Terminate => {
                pages.free(process);
                resources.release(process);
                self.stats.inc_terminations();
                ProcessState::Terminated
            }
        };

        registry.transition(pid, target)?;
        info!(pid, ?outcome, used_mb = pages.used_memory(), "Execution slice finished");
        Ok(outcome)
    }

    /// Promote Blocked processes back to Ready
    ///
    /// Ties on memory size go to the process that has waited longest.
    pub fn recover_blocked(&self, selection: RecoverySelection) -> Vec<Pid> {
        let mut guard = self.state.write();
        let SystemState {
            registry,
            resources,
            ..
        } = &mut *guard;

        let blocked: Vec<&Process> = registry.in_state(ProcessState::Blocked).collect();
        let chosen: Vec<Pid> = match selection {
            RecoverySelection::SmallestMemory => blocked
                .iter()
                .enumerate()
                .min_by_key(|(pos, p)| (p.memory_mb, *pos))
                .map(|(_, p)| p.pid)
                .into_iter()
                .collect(),
            RecoverySelection::LargestMemory => blocked
                .iter()
                .enumerate()
                .max_by_key(|(pos, p)| (p.memory_mb, Reverse(*pos)))
                .map(|(_, p)| p.pid)
                .into_iter()
                .collect(),
            RecoverySelection::ResourceAvailable => blocked
                .iter()
                .filter(|p| resources.is_available_for(p))
                .map(|p| p.pid)
                .collect(),
        };

        let mut promoted = Vec::with_capacity(chosen.len());
        for pid in chosen {
            if let Some(process) = registry.get(pid) {
                resources.release(process);
            }
            match registry.transition(pid, ProcessState::Ready) {
                Ok(()) => {
                    self.stats.inc_recoveries();
                    info!(pid, ?selection, "Blocked process promoted to Ready");
                    promoted.push(pid);
                }
                Err(e) => error!(pid, error = %e, "Recovery transition failed"),
            }
        }
        promoted
    }

    /// Reinstate swapped processes whose memory fits again
    ///
    /// Each reinstated process is paged back in, then lands in Blocked with
    /// the configured minority chance, otherwise in Ready.
    pub fn review_swapped(&self) -> Vec<(Pid, ProcessState)> {
        let mut guard = self.state.write();
        let SystemState {
            registry,
            pages,
            rng,
            ..
        } = &mut *guard;

        let mut moved = Vec::new();
        for pid in registry.pids(ProcessState::Swapped) {
            let Some(process) = registry.get_mut(pid) else {
                continue;
            };
            if pages.used_memory() + process.memory_mb > pages.total_memory() {
                debug!(pid, memory_mb = process.memory_mb, "Swapped process still does not fit");
                continue;
            }
            if !pages.allocate(process) {
                continue;
            }

            let target = if rng.gen_bool(self.config.probabilities.swap_to_blocked) {
                ProcessState::Blocked
            } else {
                ProcessState::Ready
            };
            match registry.transition(pid, target) {
                Ok(()) => {
                    self.stats.inc_swap_ins();
                    info!(pid, to = %target, used_mb = pages.used_memory(), "Process left swap");
                    moved.push((pid, target));
                }
                Err(e) => error!(pid, error = %e, "Swap-in transition failed"),
            }
        }
        moved
    }

    /// Repack owned page frames toward frame 0 in queue order
    pub fn compact(&self) -> usize {
        let mut guard = self.state.write();
        let SystemState {
            registry, pages, ..
        } = &mut *guard;

        let order: Vec<Pid> = QUEUE_ORDER
            .iter()
            .flat_map(|&state| registry.pids(state))
            .collect();
        pages.compact(registry.get_many_mut(&order))
    }

    /// Drop every process and free all memory and resources
    ///
    /// Pids are not reused after a reset.
    pub fn reset(&self) {
        let mut state = self.state.write();
        let dropped = state.registry.len();
        state.registry.clear();
        state.pages.clear();
        state.resources.clear();
        state.advisory = None;
        info!(dropped, "Simulation reset");
    }

    /// Consistent view of queues, memory and resources
    pub fn snapshot(&self) -> SystemSnapshot {
        let state = self.state.read();
        let registry = &state.registry;
        let views = |s: ProcessState| -> Vec<ProcessView> {
            registry.in_state(s).map(Process::view).collect()
        };

        let stats = state.pages.stats();
        SystemSnapshot {
            queues: QueueSnapshot {
                new: views(ProcessState::New),
                ready: views(ProcessState::Ready),
                blocked: views(ProcessState::Blocked),
                swapped: views(ProcessState::Swapped),
                terminated: views(ProcessState::Terminated),
            },
            running: registry
                .running()
                .and_then(|pid| registry.get(pid))
                .map(Process::view),
            page_table: state.pages.views(),
            resources: state.resources.views(),
            used_memory: stats.used_memory,
            total_memory: stats.total_memory,
            page_size: state.pages.page_size(),
            pressure: stats.memory_pressure(),
            advisory: state.advisory.clone(),
        }
    }

    /// Take the pending advisory message, clearing it
    pub fn take_advisory(&self) -> Option<String> {
        self.state.write().advisory.take()
    }

    /// Look up a single process
    pub fn process(&self, pid: Pid) -> Option<ProcessView> {
        self.state.read().registry.get(pid).map(Process::view)
    }

    pub fn live_count(&self) -> usize {
        self.state.read().registry.live_count()
    }

    pub fn used_memory(&self) -> Megabytes {
        self.state.read().pages.used_memory()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Check every cross-structure invariant under one read lock
    pub fn verify_invariants(&self) -> SimResult<()> {
        let state = self.state.read();
        let SystemState {
            registry,
            pages,
            resources,
            ..
        } = &*state;
        let violation = |msg: String| Err(SimError::InvariantViolation(msg));

        for process in registry.processes() {
            let memberships = QUEUE_ORDER
                .iter()
                .filter(|&&s| registry.queues().contains(s, process.pid))
                .count();
            if memberships != 1 || !registry.queues().contains(process.state, process.pid) {
                return violation(format!(
                    "process {} ({}) is in {} queues",
                    process.pid, process.state, memberships
                ));
            }

            let holds_pages = !process.pages.is_empty();
            if holds_pages
                && matches!(
                    process.state,
                    ProcessState::New | ProcessState::Swapped | ProcessState::Terminated
                )
            {
                return violation(format!(
                    "process {} holds pages while {}",
                    process.pid, process.state
                ));
            }
            for &index in &process.pages {
                if pages.slots().get(index).and_then(|s| s.owner()) != Some(process.pid) {
                    return violation(format!(
                        "process {} lists page {} it does not own",
                        process.pid, index
                    ));
                }
            }

            if process.state == ProcessState::Running && !resources.holds(process) {
                return violation(format!(
                    "running process {} does not hold R{}",
                    process.pid, process.resource
                ));
            }
        }

        let owned = pages.slots().iter().filter(|s| !s.is_free()).count();
        let listed: usize = registry.processes().map(|p| p.pages.len()).sum();
        if owned != listed || owned != pages.used_pages() {
            return violation(format!(
                "page table owns {} frames, processes list {}, counter says {}",
                owned,
                listed,
                pages.used_pages()
            ));
        }
        if pages.used_memory() != owned as Megabytes * pages.page_size() {
            return violation("used memory does not match owned frames".to_string());
        }

        for view in resources.views() {
            let Some(owner) = view.owner else { continue };
            match registry.get(owner) {
                Some(p)
                    if p.resource == view.id
                        && matches!(p.state, ProcessState::Running | ProcessState::Blocked) => {}
                _ => {
                    return violation(format!("R{} held by ineligible process {}", view.id, owner));
                }
            }
        }

        Ok(())
    }
}
