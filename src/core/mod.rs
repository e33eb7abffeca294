/*!
 * Core Module
 * Fundamental simulator types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{Intervals, Probabilities, SimConfig};
pub use errors::SimError;
pub use types::*;
