use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

thread_local! {
    static STATE: RefCell<BufferMetrics> = RefCell::new(BufferMetrics::default());
}

///
/// BufferMetrics
/// Ephemeral, in-memory counters for buffer operations on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BufferMetrics {
    pub ops: BufferOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// BufferOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BufferOps {
    // Row resolution
    pub rows_resolved: u64,
    pub tracked_hits: u64,
    pub identity_hits: u64,
    pub materialized: u64,
    pub no_identity: u64,

    // Include
    pub includes: u64,
    pub related_wired: u64,
    pub includes_cancelled: u64,
    pub includes_failed: u64,

    // Promotion
    pub tracking_promotions: u64,
    pub entries_promoted: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub rows_resolved: u64,
    pub tracked_hits: u64,
    pub identity_hits: u64,
    pub materialized: u64,
    pub no_identity: u64,
}

pub(crate) fn with_state<R>(f: impl FnOnce(&BufferMetrics) -> R) -> R {
    STATE.with(|m| f(&m.borrow()))
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut BufferMetrics) -> R) -> R {
    STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = BufferMetrics::default());
}
