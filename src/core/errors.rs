/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Megabytes, Pid, ResourceId};
use crate::process::ProcessState;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulator errors
///
/// `InsufficientMemory` and `ResourceUnavailable` are recoverable: the scheduler
/// loops turn them into state outcomes and an advisory message instead of
/// returning them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimError {
    #[error("Insufficient memory: {requested_mb} MB needs {pages_needed} pages, {free_pages} free")]
    #[diagnostic(
        code(memory::insufficient),
        help("The process stays in New and is retried on the next admission poll.")
    )]
    InsufficientMemory {
        requested_mb: Megabytes,
        pages_needed: usize,
        free_pages: usize,
    },

    #[error("Process {pid} blocked: resource R{resource} is held by process {holder}")]
    #[diagnostic(
        code(resource::unavailable),
        help("The process waits in Blocked until the holder releases the resource.")
    )]
    ResourceUnavailable {
        pid: Pid,
        resource: ResourceId,
        holder: Pid,
    },

    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(input::invalid),
        help("Memory must be a positive whole number of megabytes.")
    )]
    InvalidInput(String),

    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have been removed by a reset or never existed.")
    )]
    ProcessNotFound(Pid),

    #[error("Process {0} is not running")]
    #[diagnostic(code(process::not_running))]
    NotRunning(Pid),

    #[error("Invalid state transition for process {pid}: {from:?} -> {to:?}")]
    #[diagnostic(code(process::invalid_transition))]
    InvalidTransition {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },

    #[error("Invariant violated: {0}")]
    #[diagnostic(
        code(simulator::invariant),
        help("Shared state is inconsistent. Please report this issue.")
    )]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(simulator::configuration),
        help("Review the SIM_* environment variables.")
    )]
    Configuration(String),
}

impl SimError {
    /// Whether the simulation models this error as a state outcome
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::InsufficientMemory { .. } | SimError::ResourceUnavailable { .. }
        )
    }

    /// Message for the presentation layer, only for recoverable errors
    #[must_use]
    pub fn advisory(&self) -> Option<String> {
        self.is_recoverable().then(|| self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = SimError::InsufficientMemory {
            requested_mb: 700,
            pages_needed: 14,
            free_pages: 12,
        };
        let json = serde_json::to_string(&error).unwrap();
        let deserialized: SimError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_error_display() {
        let error = SimError::ResourceUnavailable {
            pid: 2,
            resource: 1,
            holder: 1,
        };
        assert_eq!(
            error.to_string(),
            "Process 2 blocked: resource R1 is held by process 1"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(SimError::ResourceUnavailable {
            pid: 1,
            resource: 0,
            holder: 2
        }
        .is_recoverable());
        assert!(!SimError::InvalidInput("abc".into()).is_recoverable());
        assert!(!SimError::ProcessNotFound(9).is_recoverable());
    }

    #[test]
    fn test_advisory_only_for_recoverable() {
        let busy = SimError::ResourceUnavailable {
            pid: 4,
            resource: 2,
            holder: 1,
        };
        assert_eq!(busy.advisory(), Some(busy.to_string()));
        assert_eq!(SimError::NotRunning(4).advisory(), None);
    }
}
