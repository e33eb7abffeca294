/*!
 * Scheduler Module
 * Scheduling policies, background loops and transition statistics
 */

pub mod atomic_stats;
pub mod loops;
pub mod policy;
pub mod task;

// Re-export public API
pub use atomic_stats::{AtomicSchedulerStats, SchedulerStats};
pub use loops::LoopControl;
pub use policy::{
    ContentionMode, DispatchDecision, Outcome, OutcomeTable, RecoveryPolicy, RecoverySelection,
};
pub use task::SchedulerTask;
