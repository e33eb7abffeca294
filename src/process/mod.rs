/*!
 * Process Module
 * Process records, lifecycle queues and the coordinating manager
 */

pub mod manager;
pub mod manager_builder;
pub mod queues;
pub mod registry;
pub mod snapshot;
pub mod types;
pub mod validation;

// Re-export for convenience
pub use manager::ProcessManager;
pub use manager_builder::ProcessManagerBuilder;
pub use queues::StateQueues;
pub use registry::ProcessRegistry;
pub use snapshot::{QueueSnapshot, SystemSnapshot};
pub use types::{Process, ProcessState, ProcessView};
pub use validation::{parse_memory_request, validate_memory_request};
