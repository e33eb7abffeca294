/*!
 * Lock-Free Scheduler Statistics
 * Atomic transition counters readable without taking the state lock
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the transition counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub arrivals: u64,
    pub admissions: u64,
    pub admission_deferrals: u64,
    pub dispatches: u64,
    pub resource_blocks: u64,
    pub requeues: u64,
    pub execution_blocks: u64,
    pub swap_outs: u64,
    pub swap_ins: u64,
    pub terminations: u64,
    pub recoveries: u64,
}

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering; counters are independent
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct AtomicSchedulerStats {
    arrivals: AtomicU64,
    admissions: AtomicU64,
    admission_deferrals: AtomicU64,
    dispatches: AtomicU64,
    resource_blocks: AtomicU64,
    requeues: AtomicU64,
    execution_blocks: AtomicU64,
    swap_outs: AtomicU64,
    swap_ins: AtomicU64,
    terminations: AtomicU64,
    recoveries: AtomicU64,
}

macro_rules! counter {
    ($($inc:ident => $field:ident),* $(,)?) => {
        $(
            #[inline(always)]
            pub fn $inc(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl AtomicSchedulerStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    counter! {
        inc_arrivals => arrivals,
        inc_admissions => admissions,
        inc_admission_deferrals => admission_deferrals,
        inc_dispatches => dispatches,
        inc_resource_blocks => resource_blocks,
        inc_requeues => requeues,
        inc_execution_blocks => execution_blocks,
        inc_swap_outs => swap_outs,
        inc_swap_ins => swap_ins,
        inc_terminations => terminations,
        inc_recoveries => recoveries,
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Counter values may not be perfectly consistent with each other due to
    /// concurrent updates, but each individual value is accurate.
    #[inline]
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            arrivals: self.arrivals.load(Ordering::Relaxed),
            admissions: self.admissions.load(Ordering::Relaxed),
            admission_deferrals: self.admission_deferrals.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            resource_blocks: self.resource_blocks.load(Ordering::Relaxed),
            requeues: self.requeues.load(Ordering::Relaxed),
            execution_blocks: self.execution_blocks.load(Ordering::Relaxed),
            swap_outs: self.swap_outs.load(Ordering::Relaxed),
            swap_ins: self.swap_ins.load(Ordering::Relaxed),
            terminations: self.terminations.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
        }
    }
}
