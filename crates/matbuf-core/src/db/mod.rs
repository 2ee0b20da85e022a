//! Query-time materialization: readers, keys, identity resolution, include.
//!
//! One `QueryBuffer` lives for exactly one query execution. Collaborators
//! (key factory, materializer, tracker, accessors) are reached through the
//! traits declared in the submodules.

pub mod access;
pub mod buffer;
pub mod entity;
pub mod include;
pub mod key;
pub mod materialize;
pub mod reader;
pub mod track;

// re-exports
pub use buffer::{BufferedEntry, QueryBuffer, StateLookup};
pub use entity::{EntityRef, InstanceId};
pub use include::{RelatedKeyDeriver, RelatedRow, related_rows, related_stream};
pub use key::{CompositeKeyFactory, EntityKey, KeyFactory, NullKeyPolicy};
pub use materialize::{MaterializeFn, Materializer, MaterializerRegistry};
pub use reader::{EncodedRowReader, OffsetReader, RowReader, SharedReader, ValueReader};
pub use track::{SnapshotEntry, SnapshotStateManager, StateManager, TrackedEntry, TrackedEntryRef};
