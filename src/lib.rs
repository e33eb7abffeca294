/*!
 * OS Scheduling Simulator Library
 * Process lifecycle, paged memory and resource arbitration exposed as a library
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod resources;
pub mod scheduler;

// Re-exports
pub use crate::core::{Intervals, Megabytes, Pid, Probabilities, SimConfig, SimError, SimResult};
pub use memory::{MemoryPressure, MemoryStats, PageTable};
pub use monitoring::{init_tracing, TickSpan};
pub use process::{
    parse_memory_request, Process, ProcessManager, ProcessManagerBuilder, ProcessState,
    ProcessView, SystemSnapshot,
};
pub use resources::{ResourceTable, ResourceView};
pub use scheduler::{
    ContentionMode, DispatchDecision, Outcome, RecoveryPolicy, RecoverySelection,
    SchedulerStats, SchedulerTask,
};
