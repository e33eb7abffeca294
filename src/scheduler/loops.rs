/*!
 * Scheduler Loops
 *
 * The periodic activities of the simulator, one async task each. Every loop
 * sleeps for its interval, then performs a single short critical section on
 * the process manager. Loops stop as soon as the control channel says so.
 */

use super::policy::{DispatchDecision, RecoveryPolicy, RecoverySelection};
use crate::core::errors::SimError;
use crate::monitoring::TickSpan;
use crate::process::ProcessManager;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, trace};

/// Run state shared by every loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Active,
    Paused,
    Shutdown,
}

/// Wait one period while honoring pause and shutdown
///
/// Returns false once the loop should exit. A control change restarts the
/// wait, so a resumed loop gets a full period before its next tick.
pub(crate) async fn wait_tick(control: &mut watch::Receiver<LoopControl>, period: Duration) -> bool {
    loop {
        let state = *control.borrow_and_update();
        match state {
            LoopControl::Shutdown => return false,
            LoopControl::Paused => {
                if control.changed().await.is_err() {
                    return false;
                }
            }
            LoopControl::Active => {
                tokio::select! {
                    _ = tokio::time::sleep(period) => return true,
                    changed = control.changed() => {
                        if changed.is_err() {
                            return false;
                        }
                    }
                }
            }
        }
    }
}

/// Random process arrivals
pub(crate) async fn arrival_loop(manager: ProcessManager, mut control: watch::Receiver<LoopControl>) {
    let period = manager.config().intervals.arrival;
    info!(period_ms = period.as_millis() as u64, "Arrival loop started");

    while wait_tick(&mut control, period).await {
        let tick = TickSpan::new("arrival");
        if let Some(pid) = tick.span().in_scope(|| manager.spawn_random_process()) {
            trace!(pid, "Arrival tick created a process");
        }
    }
    debug!("Arrival loop stopped");
}

/// Memory admission of New processes
pub(crate) async fn admission_loop(manager: ProcessManager, mut control: watch::Receiver<LoopControl>) {
    let period = manager.config().intervals.admission;
    info!(period_ms = period.as_millis() as u64, "Admission loop started");

    while wait_tick(&mut control, period).await {
        let tick = TickSpan::new("admission");
        let admitted = tick.span().in_scope(|| manager.admit_new());
        if !admitted.is_empty() {
            trace!(?admitted, "Admission tick");
        }
    }
    debug!("Admission loop stopped");
}

/// CPU dispatch followed by the execution slice of the dispatched process
///
/// The CPU stays occupied for the whole slice; dispatch never runs while a
/// process is Running.
pub(crate) async fn dispatch_loop(manager: ProcessManager, mut control: watch::Receiver<LoopControl>) {
    let intervals = manager.config().intervals;
    info!(
        period_ms = intervals.dispatch.as_millis() as u64,
        slice_ms = intervals.execution.as_millis() as u64,
        "Dispatch loop started"
    );

    while wait_tick(&mut control, intervals.dispatch).await {
        let decision = {
            let tick = TickSpan::new("dispatch");
            tick.span().in_scope(|| manager.dispatch_next())
        };

        let Some(DispatchDecision::Running(pid)) = decision else {
            continue;
        };

        if !wait_tick(&mut control, intervals.execution).await {
            break;
        }

        let tick = TickSpan::new("execution");
        match tick.span().in_scope(|| manager.complete_running(pid)) {
            Ok(outcome) => trace!(pid, ?outcome, "Execution tick"),
            // A reset during the slice removes the process
            Err(SimError::ProcessNotFound(_)) => debug!(pid, "Running process vanished"),
            Err(e) => error!(pid, error = %e, "Execution outcome failed"),
        }
    }
    debug!("Dispatch loop stopped");
}

/// Promotion of Blocked processes back to Ready
pub(crate) async fn recovery_loop(manager: ProcessManager, mut control: watch::Receiver<LoopControl>) {
    let intervals = manager.config().intervals;
    let policy = manager.config().recovery;
    info!(?policy, "Blocked recovery loop started");

    // MemoryOrder alternates a short wait then smallest, a long wait then largest
    let schedule: Vec<(Duration, RecoverySelection)> = match policy {
        RecoveryPolicy::ResourceRetry => {
            vec![(intervals.blocked_short, RecoverySelection::ResourceAvailable)]
        }
        RecoveryPolicy::MemoryOrder => vec![
            (intervals.blocked_short, RecoverySelection::SmallestMemory),
            (intervals.blocked_long, RecoverySelection::LargestMemory),
        ],
    };

    'outer: loop {
        for &(period, selection) in &schedule {
            if !wait_tick(&mut control, period).await {
                break 'outer;
            }
            let tick = TickSpan::new("recovery");
            let promoted = tick.span().in_scope(|| manager.recover_blocked(selection));
            if !promoted.is_empty() {
                trace!(?promoted, ?selection, "Recovery tick");
            }
        }
    }
    debug!("Blocked recovery loop stopped");
}

/// Reinstatement of swapped processes
pub(crate) async fn swap_loop(manager: ProcessManager, mut control: watch::Receiver<LoopControl>) {
    let period = manager.config().intervals.swap_review;
    info!(period_ms = period.as_millis() as u64, "Swap review loop started");

    while wait_tick(&mut control, period).await {
        let tick = TickSpan::new("swap");
        let moved = tick.span().in_scope(|| manager.review_swapped());
        if !moved.is_empty() {
            trace!(?moved, "Swap review tick");
        }
    }
    debug!("Swap review loop stopped");
}
