/*!
 * Simulator Configuration
 * Startup-time constants: memory geometry, probabilities and loop intervals
 */

use super::errors::SimError;
use super::limits::*;
use super::types::{Megabytes, SimResult};
use crate::scheduler::{ContentionMode, RecoveryPolicy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Per-transition probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Probabilities {
    /// Block chance for a process that has never blocked
    pub block_first: f64,
    /// Block chance once the process has blocked at least once
    pub block_repeat: f64,
    /// Swap-out chance, evaluated after the block draw fails
    pub swap: f64,
    /// Chance that a swapped process returns to Blocked rather than Ready
    pub swap_to_blocked: f64,
}

impl Default for Probabilities {
    fn default() -> Self {
        Self {
            block_first: BLOCK_PROBABILITY_FIRST,
            block_repeat: BLOCK_PROBABILITY_REPEAT,
            swap: SWAP_PROBABILITY,
            swap_to_blocked: SWAP_TO_BLOCKED_PROBABILITY,
        }
    }
}

/// Pacing of each scheduler loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Intervals {
    pub arrival: Duration,
    pub admission: Duration,
    pub dispatch: Duration,
    pub execution: Duration,
    pub blocked_short: Duration,
    pub blocked_long: Duration,
    pub swap_review: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            arrival: ARRIVAL_INTERVAL,
            admission: ADMISSION_INTERVAL,
            dispatch: DISPATCH_INTERVAL,
            execution: EXECUTION_TIME,
            blocked_short: BLOCKED_RECOVERY_SHORT,
            blocked_long: BLOCKED_RECOVERY_LONG,
            swap_review: SWAP_REVIEW_INTERVAL,
        }
    }
}

/// Complete simulator configuration, fixed at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub total_memory_mb: Megabytes,
    pub page_size_mb: Megabytes,
    pub resource_count: usize,
    pub max_live_processes: usize,
    pub arrival_memory_min_mb: Megabytes,
    pub arrival_memory_max_mb: Megabytes,
    pub max_swapped: usize,
    pub probabilities: Probabilities,
    pub intervals: Intervals,
    pub contention: ContentionMode,
    pub recovery: RecoveryPolicy,
    pub arrivals_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_memory_mb: DEFAULT_TOTAL_MEMORY_MB,
            page_size_mb: DEFAULT_PAGE_SIZE_MB,
            resource_count: DEFAULT_RESOURCE_COUNT,
            max_live_processes: MAX_LIVE_PROCESSES,
            arrival_memory_min_mb: ARRIVAL_MEMORY_MIN_MB,
            arrival_memory_max_mb: ARRIVAL_MEMORY_MAX_MB,
            max_swapped: MAX_SWAPPED_PROCESSES,
            probabilities: Probabilities::default(),
            intervals: Intervals::default(),
            contention: ContentionMode::default(),
            recovery: RecoveryPolicy::default(),
            arrivals_enabled: true,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by `SIM_*` environment variables
    ///
    /// Environment variables:
    /// - SIM_TOTAL_MEMORY_MB, SIM_PAGE_SIZE_MB, SIM_RESOURCES, SIM_MAX_PROCESSES
    /// - SIM_SEED: fixed RNG seed for reproducible runs
    /// - SIM_CONTENTION: `resource` | `requeue`
    /// - SIM_RECOVERY: `resource_retry` | `memory_order`
    /// - SIM_ARRIVALS: `0` disables automatic arrivals
    pub fn from_env() -> SimResult<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse("SIM_TOTAL_MEMORY_MB")? {
            config.total_memory_mb = v;
        }
        if let Some(v) = env_parse("SIM_PAGE_SIZE_MB")? {
            config.page_size_mb = v;
        }
        if let Some(v) = env_parse("SIM_RESOURCES")? {
            config.resource_count = v;
        }
        if let Some(v) = env_parse("SIM_MAX_PROCESSES")? {
            config.max_live_processes = v;
        }
        if let Some(v) = env_parse("SIM_SEED")? {
            config.seed = Some(v);
        }
        if let Some(v) = env_parse("SIM_CONTENTION")? {
            config.contention = v;
        }
        if let Some(v) = env_parse("SIM_RECOVERY")? {
            config.recovery = v;
        }
        if let Ok(v) = std::env::var("SIM_ARRIVALS") {
            config.arrivals_enabled = !(v == "0" || v.eq_ignore_ascii_case("false"));
        }

        config.validate()?;
        Ok(config)
    }

    /// Number of frames in the page table
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        (self.total_memory_mb / self.page_size_mb) as usize
    }

    /// Reject configurations the scheduler cannot run with
    pub fn validate(&self) -> SimResult<()> {
        if self.page_size_mb == 0 {
            return Err(SimError::Configuration("page size must be positive".into()));
        }
        if self.total_memory_mb < self.page_size_mb {
            return Err(SimError::Configuration(format!(
                "total memory {} MB is smaller than one page ({} MB)",
                self.total_memory_mb, self.page_size_mb
            )));
        }
        if self.resource_count == 0 {
            return Err(SimError::Configuration(
                "at least one resource is required".into(),
            ));
        }
        if self.arrival_memory_min_mb == 0 || self.arrival_memory_min_mb > self.arrival_memory_max_mb
        {
            return Err(SimError::Configuration(format!(
                "invalid arrival memory range [{}, {}]",
                self.arrival_memory_min_mb, self.arrival_memory_max_mb
            )));
        }

        let p = &self.probabilities;
        for (name, value) in [
            ("block_first", p.block_first),
            ("block_repeat", p.block_repeat),
            ("swap", p.swap),
            ("swap_to_blocked", p.swap_to_blocked),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::Configuration(format!(
                    "probability {} = {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        if p.block_first + p.swap > 1.0 || p.block_repeat + p.swap > 1.0 {
            return Err(SimError::Configuration(
                "block and swap probabilities must not sum above 1".into(),
            ));
        }

        let i = &self.intervals;
        if [
            i.arrival,
            i.admission,
            i.dispatch,
            i.execution,
            i.blocked_short,
            i.blocked_long,
            i.swap_review,
        ]
        .iter()
        .any(Duration::is_zero)
        {
            return Err(SimError::Configuration(
                "loop intervals must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> SimResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SimError::Configuration(format!("{} has invalid value {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}
