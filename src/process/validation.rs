/*!
 * Process Input Validation
 * Boundary checks for manually entered memory requests
 */

use crate::core::errors::SimError;
use crate::core::types::{Megabytes, SimResult};

/// Parse a manual memory request in MB
///
/// Non-numeric and non-positive input is rejected before it can reach the
/// registry.
pub fn parse_memory_request(input: &str) -> SimResult<Megabytes> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SimError::InvalidInput(
            "memory request cannot be empty".to_string(),
        ));
    }

    let value: i64 = trimmed.parse().map_err(|_| {
        SimError::InvalidInput(format!("{:?} is not a whole number of megabytes", trimmed))
    })?;

    validate_memory_request(value)
}

/// Check a numeric memory request
pub fn validate_memory_request(value: i64) -> SimResult<Megabytes> {
    if value <= 0 {
        return Err(SimError::InvalidInput(format!(
            "memory must be positive, got {}",
            value
        )));
    }
    Megabytes::try_from(value)
        .map_err(|_| SimError::InvalidInput(format!("memory request {} MB is too large", value)))
}
