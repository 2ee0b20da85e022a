//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not access buffer internals directly.
//! The buffer reports what it did through `MetricsEvent`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{BufferMetrics, BufferOps, EntityCounters};
pub use sink::{
    IncludeOutcome, MetricsEvent, MetricsSink, ResolveOutcome, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
