/*!
 * Scheduling Policies
 * Contention handling, blocked-recovery selection and execution outcomes
 */

use crate::core::config::Probabilities;
use crate::core::types::Pid;
use crate::process::Process;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What dispatch does when the Ready head cannot get its resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentionMode {
    /// The process becomes Blocked
    #[default]
    Resource,
    /// The process goes back to the tail of Ready
    Requeue,
}

impl FromStr for ContentionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resource" => Ok(ContentionMode::Resource),
            "requeue" => Ok(ContentionMode::Requeue),
            other => Err(format!("unknown contention mode: {}", other)),
        }
    }
}

/// How the blocked-recovery loop picks processes to promote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Promote every Blocked process whose resource is available
    #[default]
    ResourceRetry,
    /// Alternate smallest-memory and largest-memory promotions
    MemoryOrder,
}

impl FromStr for RecoveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resource_retry" | "resource" => Ok(RecoveryPolicy::ResourceRetry),
            "memory_order" | "memory" => Ok(RecoveryPolicy::MemoryOrder),
            other => Err(format!("unknown recovery policy: {}", other)),
        }
    }
}

/// One pass of the blocked-recovery loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySelection {
    /// Blocked process with the smallest memory demand
    SmallestMemory,
    /// Blocked process with the largest memory demand
    LargestMemory,
    /// Every Blocked process whose resource is free
    ResourceAvailable,
}

/// Result of a dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "pid", rename_all = "snake_case")]
pub enum DispatchDecision {
    /// The Ready head got its resource and now holds the CPU
    Running(Pid),
    /// The Ready head's resource is busy
    Blocked(Pid),
    /// The Ready head went back to the Ready tail
    Requeued(Pid),
}

/// How a Running process leaves the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Block,
    Swap,
    Terminate,
}

/// Weighted outcome table for the end of an execution slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeTable {
    block_first: f64,
    block_repeat: f64,
    swap: f64,
}

impl OutcomeTable {
    pub fn new(probabilities: &Probabilities) -> Self {
        Self {
            block_first: probabilities.block_first,
            block_repeat: probabilities.block_repeat,
            swap: probabilities.swap,
        }
    }

    /// Block chance, lowered once the process has already blocked
    #[inline]
    #[must_use]
    pub fn block_probability(&self, process: &Process) -> f64 {
        if process.has_blocked_before() {
            self.block_repeat
        } else {
            self.block_first
        }
    }

    /// Draw an outcome; swapping is only possible while the swap area has room
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        process: &Process,
        swap_available: bool,
    ) -> Outcome {
        let p_block = self.block_probability(process);
        let roll: f64 = rng.gen();

        if roll < p_block {
            Outcome::Block
        } else if swap_available && roll < p_block + self.swap {
            Outcome::Swap
        } else {
            Outcome::Terminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(block_first: f64, block_repeat: f64, swap: f64) -> OutcomeTable {
        OutcomeTable::new(&Probabilities {
            block_first,
            block_repeat,
            swap,
            swap_to_blocked: 0.0,
        })
    }

    #[test]
    fn test_certain_outcomes() {
        let mut rng = StdRng::seed_from_u64(7);
        let process = Process::new(1, 100, 0);

        assert_eq!(table(1.0, 1.0, 0.0).sample(&mut rng, &process, true), Outcome::Block);
        assert_eq!(table(0.0, 0.0, 1.0).sample(&mut rng, &process, true), Outcome::Swap);
        assert_eq!(
            table(0.0, 0.0, 1.0).sample(&mut rng, &process, false),
            Outcome::Terminate
        );
        assert_eq!(
            table(0.0, 0.0, 0.0).sample(&mut rng, &process, true),
            Outcome::Terminate
        );
    }

    #[test]
    fn test_block_probability_drops_after_first_block() {
        let outcomes = table(0.5, 0.1, 0.2);
        let mut process = Process::new(1, 100, 0);
        assert_eq!(outcomes.block_probability(&process), 0.5);
        process.blocked_count = 1;
        assert_eq!(outcomes.block_probability(&process), 0.1);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("requeue".parse::<ContentionMode>(), Ok(ContentionMode::Requeue));
        assert_eq!(
            "memory_order".parse::<RecoveryPolicy>(),
            Ok(RecoveryPolicy::MemoryOrder)
        );
        assert!("fifo".parse::<RecoveryPolicy>().is_err());
    }
}
