//! Metrics sink boundary.
//!
//! Buffer logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, BufferMetrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ResolveOutcome
/// How one row was resolved to an instance (or not).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveOutcome {
    Tracked,
    IdentityHit,
    Materialized,
    NoIdentity,
}

///
/// IncludeOutcome
/// How one include ended.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IncludeOutcome {
    Completed,
    Cancelled,
    Failed,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    RowResolved {
        entity_path: &'static str,
        outcome: ResolveOutcome,
    },
    IncludeFinished {
        navigation: &'static str,
        related: u64,
        outcome: IncludeOutcome,
    },
    TrackingStarted {
        entity_path: &'static str,
        entries: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::RowResolved {
                entity_path,
                outcome,
            } => metrics::with_state_mut(|m| {
                m.ops.rows_resolved = m.ops.rows_resolved.saturating_add(1);
                let entry = m.entities.entry(entity_path.to_string()).or_default();
                entry.rows_resolved = entry.rows_resolved.saturating_add(1);

                match outcome {
                    ResolveOutcome::Tracked => {
                        m.ops.tracked_hits = m.ops.tracked_hits.saturating_add(1);
                        entry.tracked_hits = entry.tracked_hits.saturating_add(1);
                    }
                    ResolveOutcome::IdentityHit => {
                        m.ops.identity_hits = m.ops.identity_hits.saturating_add(1);
                        entry.identity_hits = entry.identity_hits.saturating_add(1);
                    }
                    ResolveOutcome::Materialized => {
                        m.ops.materialized = m.ops.materialized.saturating_add(1);
                        entry.materialized = entry.materialized.saturating_add(1);
                    }
                    ResolveOutcome::NoIdentity => {
                        m.ops.no_identity = m.ops.no_identity.saturating_add(1);
                        entry.no_identity = entry.no_identity.saturating_add(1);
                    }
                }
            }),

            MetricsEvent::IncludeFinished {
                related, outcome, ..
            } => metrics::with_state_mut(|m| {
                m.ops.includes = m.ops.includes.saturating_add(1);
                m.ops.related_wired = m.ops.related_wired.saturating_add(related);
                match outcome {
                    IncludeOutcome::Completed => {}
                    IncludeOutcome::Cancelled => {
                        m.ops.includes_cancelled = m.ops.includes_cancelled.saturating_add(1);
                    }
                    IncludeOutcome::Failed => {
                        m.ops.includes_failed = m.ops.includes_failed.saturating_add(1);
                    }
                }
            }),

            MetricsEvent::TrackingStarted { entries, .. } => metrics::with_state_mut(|m| {
                m.ops.tracking_promotions = m.ops.tracking_promotions.saturating_add(1);
                m.ops.entries_promoted = m.ops.entries_promoted.saturating_add(entries);
            }),
        }
    }
}

/// Route one event to the scoped override, or to global state.
pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current thread's metrics.
#[must_use]
pub fn metrics_report() -> BufferMetrics {
    metrics::with_state(Clone::clone)
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run `f` with `sink` installed as the thread's metrics sink.
/// The previous sink is restored on every exit path, including unwinds.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Restore(Option<Rc<dyn MetricsSink>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = prev);
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _restore = Restore(prev);

    f()
}
