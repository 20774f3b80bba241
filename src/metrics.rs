//! Client metrics.

use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Metrics for a [`SupertxClient`](crate::client::SupertxClient).
#[derive(Metrics)]
#[metrics(scope = "supertx")]
pub struct ClientMetrics {
    /// Number of quotes requested.
    pub quotes: Counter,
    /// Number of signed quotes submitted for execution.
    pub executed: Counter,
    /// Number of explorer polls.
    pub receipt_polls: Counter,
    /// Number of supertransactions with a failed user op.
    pub failed: Counter,
    /// Number of receipt waits that gave up.
    pub timeouts: Counter,
    /// Time from submission until every user op executed, in milliseconds.
    pub execution_time: Histogram,
}
