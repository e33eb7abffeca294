/*!
 * Monitoring Module
 * Structured logging setup and tick tracing
 */

pub mod tracer;

pub use tracer::{generate_run_id, init_tracing, run_span, TickSpan};
