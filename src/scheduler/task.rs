/*!
 * Scheduler Task
 *
 * Owns the background loops that drive the simulation: arrivals, admission,
 * dispatch with execution, blocked recovery and swap review. All loops share
 * one control channel, so pausing or stopping the task reaches every loop.
 */

use super::loops::{
    admission_loop, arrival_loop, dispatch_loop, recovery_loop, swap_loop, LoopControl,
};
use crate::process::ProcessManager;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Handle to the scheduler background tasks
pub struct SchedulerTask {
    control_tx: watch::Sender<LoopControl>,
    handles: Vec<JoinHandle<()>>,
}

impl SchedulerTask {
    /// Spawn every loop the configuration enables
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(manager: ProcessManager) -> Self {
        let (control_tx, control_rx) = watch::channel(LoopControl::Active);
        let mut handles = Vec::with_capacity(5);

        if manager.config().arrivals_enabled {
            handles.push(tokio::spawn(arrival_loop(manager.clone(), control_rx.clone())));
        }
        handles.push(tokio::spawn(admission_loop(manager.clone(), control_rx.clone())));
        handles.push(tokio::spawn(dispatch_loop(manager.clone(), control_rx.clone())));
        handles.push(tokio::spawn(recovery_loop(manager.clone(), control_rx.clone())));
        handles.push(tokio::spawn(swap_loop(manager, control_rx)));

        info!(loops = handles.len(), "Scheduler task spawned");

        Self {
            control_tx,
            handles,
        }
    }

    /// Pause every loop; a Running process keeps the CPU until resumed
    pub fn pause(&self) {
        self.control_tx.send_replace(LoopControl::Paused);
        info!("Scheduler task paused");
    }

    pub fn resume(&self) {
        self.control_tx.send_replace(LoopControl::Active);
        info!("Scheduler task resumed");
    }

    pub fn is_paused(&self) -> bool {
        *self.control_tx.borrow() == LoopControl::Paused
    }

    /// Stop every loop and wait for them to finish
    pub async fn shutdown(mut self) {
        self.control_tx.send_replace(LoopControl::Shutdown);

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("Scheduler loop shutdown error: {}", e);
            }
        }
        info!("Scheduler task shutdown complete");
    }
}

impl Drop for SchedulerTask {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.control_tx.send_replace(LoopControl::Shutdown);
            for handle in &self.handles {
                handle.abort();
            }
        }
    }
}
