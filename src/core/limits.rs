/*!
 * System Limits and Constants
 *
 * Centralized location for the simulator's default sizes, probabilities and
 * loop intervals. `SimConfig::default()` is built from these values.
 */

use std::time::Duration;

// =============================================================================
// MEMORY
// =============================================================================

/// Total simulated memory (MB)
pub const DEFAULT_TOTAL_MEMORY_MB: u32 = 1000;

/// Size of a single page frame (MB)
pub const DEFAULT_PAGE_SIZE_MB: u32 = 50;

/// Usage percentage at which memory pressure is reported as medium
pub const PRESSURE_MEDIUM_PERCENT: f64 = 60.0;

/// Usage percentage at which memory pressure is reported as high
pub const PRESSURE_HIGH_PERCENT: f64 = 80.0;

/// Usage percentage at which memory pressure is reported as critical
pub const PRESSURE_CRITICAL_PERCENT: f64 = 95.0;

// =============================================================================
// PROCESSES & RESOURCES
// =============================================================================

/// Number of exclusive resources (R0, R1, R2)
pub const DEFAULT_RESOURCE_COUNT: usize = 3;

/// Automatic arrivals stop while this many processes are alive
pub const MAX_LIVE_PROCESSES: usize = 30;

/// Smallest memory demand of an automatic arrival (MB)
pub const ARRIVAL_MEMORY_MIN_MB: u32 = 50;

/// Largest memory demand of an automatic arrival (MB)
pub const ARRIVAL_MEMORY_MAX_MB: u32 = 200;

/// Processes allowed in the swap area at once
pub const MAX_SWAPPED_PROCESSES: usize = 5;

/// Terminated records kept for display; older ones are dropped
pub const TERMINATED_HISTORY: usize = 50;

/// Terminated entries shown in the text frame
pub const TERMINATED_RENDERED: usize = 10;

// =============================================================================
// TRANSITION PROBABILITIES
// =============================================================================

/// Chance that a process which has never blocked blocks after its execution slice
pub const BLOCK_PROBABILITY_FIRST: f64 = 0.5;

/// Chance that a process which already blocked at least once blocks again
pub const BLOCK_PROBABILITY_REPEAT: f64 = 0.1;

/// Chance of being swapped out when the process does not block
pub const SWAP_PROBABILITY: f64 = 0.2;

/// Chance that a process leaving swap lands in Blocked instead of Ready
pub const SWAP_TO_BLOCKED_PROBABILITY: f64 = 0.3;

// =============================================================================
// LOOP INTERVALS
// =============================================================================

/// Arrival loop period
pub const ARRIVAL_INTERVAL: Duration = Duration::from_secs(4);

/// Admission (New -> Ready) poll period
pub const ADMISSION_INTERVAL: Duration = Duration::from_secs(3);

/// Dispatch readiness poll period
pub const DISPATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Simulated execution time of a dispatched process
pub const EXECUTION_TIME: Duration = Duration::from_secs(3);

/// First phase of blocked recovery (smallest-memory promotion)
pub const BLOCKED_RECOVERY_SHORT: Duration = Duration::from_secs(3);

/// Second phase of blocked recovery (largest-memory promotion)
pub const BLOCKED_RECOVERY_LONG: Duration = Duration::from_secs(6);

/// Swap review period
pub const SWAP_REVIEW_INTERVAL: Duration = Duration::from_secs(7);

/// Presentation refresh period used by the binary
pub const RENDER_INTERVAL: Duration = Duration::from_secs(1);
