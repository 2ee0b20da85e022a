//! Module: track
//! Responsibility: contract with the change-tracking subsystem.
//! Does not own: buffered rows or identity resolution.
//! Boundary: the tracker is the authoritative source of "is this already
//! tracked" and of current property values; the buffer only falls back to
//! its own readers when the tracker has nothing.

mod snapshot;

#[cfg(test)]
mod tests;

use crate::{
    db::{entity::EntityRef, key::EntityKey, reader::SharedReader},
    error::InternalError,
    model::{entity::EntityModel, field::FieldModel, navigation::ForeignKeyModel},
    value::Value,
};
use std::rc::Rc;

// re-exports
pub use snapshot::{SnapshotEntry, SnapshotStateManager};

///
/// TrackedEntryRef
///

pub type TrackedEntryRef = Rc<dyn TrackedEntry>;

///
/// TrackedEntry
///
/// One instance owned by the tracking subsystem.
///

pub trait TrackedEntry {
    fn entity(&self) -> &'static EntityModel;

    fn instance(&self) -> EntityRef;

    /// Current (possibly mutated) value of one property.
    fn property_value(&self, property: &FieldModel) -> Result<Value, InternalError>;

    /// Primary-key snapshot of the tracked instance.
    fn primary_key(&self) -> Result<Option<EntityKey>, InternalError>;

    /// Snapshot of the dependent-side key for `foreign_key`, tagged with the
    /// principal entity so it compares equal to the principal's primary key.
    fn dependent_key(
        &self,
        foreign_key: &ForeignKeyModel,
    ) -> Result<Option<EntityKey>, InternalError>;
}

///
/// StateManager
///
/// Lookup and promotion surface of the tracking subsystem.
/// Implementations must tolerate repeated `start_tracking` for one instance.
///

pub trait StateManager {
    fn entry_by_key(&self, key: &EntityKey) -> Option<TrackedEntryRef>;

    fn entry_by_instance(&self, instance: &EntityRef) -> Option<TrackedEntryRef>;

    fn start_tracking(
        &self,
        entity: &'static EntityModel,
        instance: &EntityRef,
        reader: &SharedReader,
    ) -> Result<(), InternalError>;
}
