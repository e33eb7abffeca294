/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Memory quantity in megabytes
pub type Megabytes = u32;

/// Index of a frame in the page table
pub type PageIndex = usize;

/// Index of an exclusive resource slot (R0, R1, ...)
pub type ResourceId = usize;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
