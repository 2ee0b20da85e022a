//! Buffer configuration.
//!
//! Deserializable from any serde format; every field has a default so an
//! empty document yields `BufferConfig::default()`.

use crate::db::key::NullKeyPolicy;
use serde::{Deserialize, Serialize};

///
/// BufferConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferConfig {
    /// Expected number of distinct entries; pre-sizes the entry arena.
    pub capacity_hint: usize,
    /// Null pattern that marks a row as having no identity.
    pub null_keys: NullKeyPolicy,
    /// Report buffer activity to the metrics sink.
    pub metrics: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity_hint: 0,
            null_keys: NullKeyPolicy::AllNull,
            metrics: true,
        }
    }
}
