/*!
 * Process Manager Builder
 * Builder pattern for ProcessManager construction
 */

use super::manager::{ProcessManager, SystemState};
use super::registry::ProcessRegistry;
use crate::core::config::SimConfig;
use crate::core::types::SimResult;
use crate::memory::PageTable;
use crate::resources::ResourceTable;
use crate::scheduler::atomic_stats::AtomicSchedulerStats;
use crate::scheduler::policy::OutcomeTable;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

/// Builder for ProcessManager
pub struct ProcessManagerBuilder {
    config: SimConfig,
    seed: Option<u64>,
}

impl ProcessManagerBuilder {
    /// Create a new ProcessManager builder with default settings
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
            seed: None,
        }
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the random source; overrides the configured seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the ProcessManager
    ///
    /// Fails if the configuration does not describe a usable system.
    pub fn build(self) -> SimResult<ProcessManager> {
        self.config.validate()?;

        let seed = self.seed.or(self.config.seed);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let state = SystemState {
            registry: ProcessRegistry::new(),
            pages: PageTable::new(self.config.total_memory_mb, self.config.page_size_mb),
            resources: ResourceTable::new(self.config.resource_count),
            rng,
            advisory: None,
        };

        info!(
            total_mb = self.config.total_memory_mb,
            page_mb = self.config.page_size_mb,
            pages = self.config.page_count(),
            resources = self.config.resource_count,
            contention = ?self.config.contention,
            recovery = ?self.config.recovery,
            seeded = seed.is_some(),
            "Process manager initialized"
        );

        Ok(ProcessManager {
            state: Arc::new(RwLock::new(state)),
            outcomes: OutcomeTable::new(&self.config.probabilities),
            config: Arc::new(self.config),
            stats: Arc::new(AtomicSchedulerStats::new()),
        })
    }
}

impl Default for ProcessManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
