//! Metrics collection.
//!
//! # Metrics
//! - `sendtx_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `sendtx_stage_duration_seconds` (histogram): wall time per pipeline stage
//! - `sendtx_submissions_total` (counter): pipeline runs by outcome

use std::time::Duration;

/// Record one RPC call.
pub fn record_rpc_call(method: &'static str, outcome: &'static str) {
    metrics::counter!("sendtx_rpc_requests_total", "method" => method, "outcome" => outcome)
        .increment(1);
}

/// Record how long a pipeline stage took.
pub fn record_stage_duration(stage: &'static str, elapsed: Duration) {
    metrics::histogram!("sendtx_stage_duration_seconds", "stage" => stage)
        .record(elapsed.as_secs_f64());
}

/// Record the final outcome of one pipeline run.
pub fn record_submission(outcome: &'static str) {
    metrics::counter!("sendtx_submissions_total", "outcome" => outcome).increment(1);
}
