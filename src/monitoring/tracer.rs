/*!
 * Structured Tracing
 * Subscriber setup and per-tick spans for the scheduler loops
 *
 * Features:
 * - Run ID on the root span so every line of one run can be correlated
 * - JSON-formatted logs for structured parsing
 * - Slow-tick warnings when a critical section takes too long
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// A tick slower than this is reported at warn level
const SLOW_TICK: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique ID for one simulator run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Root span carrying the run ID
pub fn run_span(run_id: &str) -> Span {
    span!(Level::INFO, "simulation", run_id = %run_id)
}

/// Span around one scheduler loop tick
///
/// Records how long the tick took when dropped and flags slow ticks.
pub struct TickSpan {
    span: Span,
    start: Instant,
    loop_name: &'static str,
}

impl TickSpan {
    pub fn new(loop_name: &'static str) -> Self {
        let span = span!(
            Level::TRACE,
            "tick",
            loop_name,
            duration_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            loop_name,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for TickSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.span.record("duration_us", elapsed.as_micros() as u64);

        if elapsed > SLOW_TICK {
            warn!(
                loop_name = self.loop_name,
                duration_ms = elapsed.as_millis() as u64,
                "Slow scheduler tick"
            );
        } else {
            debug!(
                loop_name = self.loop_name,
                duration_us = elapsed.as_micros() as u64,
                "Scheduler tick"
            );
        }
    }
}
