use crate::{
    db::{entity::EntityRef, reader::SharedReader, track::StateManager},
    error::InternalError,
    model::entity::EntityModel,
};
use std::{cell::OnceCell, fmt};

///
/// EntryId
/// Position of one entry in the buffer's entry arena.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) struct EntryId(usize);

impl EntryId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

///
/// BufferedEntry
///
/// One observed row's contribution to an identity: its logical type, its
/// value reader, and the instance once materialized. The instance is
/// write-once.
///

pub struct BufferedEntry {
    entity: &'static EntityModel,
    reader: SharedReader,
    instance: OnceCell<EntityRef>,
}

impl BufferedEntry {
    pub(crate) fn new(entity: &'static EntityModel, reader: SharedReader) -> Self {
        Self {
            entity,
            reader,
            instance: OnceCell::new(),
        }
    }

    pub(crate) fn materialized(
        entity: &'static EntityModel,
        reader: SharedReader,
        instance: EntityRef,
    ) -> Self {
        let entry = Self::new(entity, reader);
        let _ = entry.instance.set(instance);

        entry
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn reader(&self) -> &SharedReader {
        &self.reader
    }

    #[must_use]
    pub fn instance(&self) -> Option<&EntityRef> {
        self.instance.get()
    }

    /// Whether this entry was materialized as `instance`.
    #[must_use]
    pub fn is_instance(&self, instance: &EntityRef) -> bool {
        self.instance().is_some_and(|own| own.ptr_eq(instance))
    }

    /// Hand this entry to the tracking subsystem.
    pub(crate) fn start_tracking(&self, state: &dyn StateManager) -> Result<(), InternalError> {
        let instance = self.instance().ok_or_else(|| {
            InternalError::buffer_invariant(format!(
                "buffered '{}' entry promoted before materialization",
                self.entity.path
            ))
        })?;

        state.start_tracking(self.entity, instance, &self.reader)
    }
}

impl fmt::Debug for BufferedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedEntry")
            .field("entity", &self.entity.path)
            .field("columns", &self.reader.count())
            .field("instance", &self.instance.get())
            .finish()
    }
}
