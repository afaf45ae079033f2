//! Slow-execution reporting.
//!
//! The trigger decision and the log-line formatting are plain functions so the instrumentation can be tested
//! without a live driver or a log subscriber. The single log line is emitted by the statement through
//! {{tracing::warn!}}.

use crate::clean_statement;
use crate::options::TracingOptions;

/// Whether an execution should be reported as slow.
///
/// Reporting requires tracing to be enabled and the elapsed time to be strictly greater than the threshold.
pub fn is_slow(options: &TracingOptions, elapsed_millis: u64) -> bool {
    options.enabled && elapsed_millis > options.threshold_millis
}

/// Format the log line reported for a slow statement execution.
///
/// The line contains the statement text, the elapsed time as an integer millisecond count and the description of
/// the bound parameters, empty when the statement is not parameterized or its metadata was unavailable.
pub fn slow_statement_message(statement: &str, elapsed_millis: u64, parameters: &str) -> String {
    format!("slow statement: {} took {} ms, parameters: {}", clean_statement(statement), elapsed_millis, parameters)
}
