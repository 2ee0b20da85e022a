use crate::db::{
    buffer::entry::EntryId,
    entity::{EntityRef, InstanceId},
    key::EntityKey,
};
use std::collections::{BTreeMap, btree_map::Entry};

///
/// IdentityMap
///
/// identity key → the single entry that owns it.
///

#[derive(Debug, Default)]
pub(crate) struct IdentityMap {
    by_key: BTreeMap<EntityKey, EntryId>,
}

impl IdentityMap {
    pub(crate) fn get(&self, key: &EntityKey) -> Option<EntryId> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn contains(&self, key: &EntityKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Insert a new key. Returns false when the key is already mapped.
    pub(crate) fn insert(&mut self, key: EntityKey, id: EntryId) -> bool {
        match self.by_key.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }
}

///
/// InstanceSlot
///
/// Entries reachable from one instance. The instance's own entry, when it
/// has one, precedes any related entries appended by include; the list may
/// also be empty for tracked instances reached by include.
///

#[derive(Debug)]
pub(crate) struct InstanceSlot {
    instance: EntityRef,
    entries: Vec<EntryId>,
}

impl InstanceSlot {
    pub(crate) fn entries(&self) -> &[EntryId] {
        &self.entries
    }
}

///
/// InstanceIndex
///
/// instance → ordered entries. Holds an `EntityRef` per slot so instance
/// ids stay valid for the buffer's lifetime.
///

#[derive(Debug, Default)]
pub(crate) struct InstanceIndex {
    by_instance: BTreeMap<InstanceId, InstanceSlot>,
}

impl InstanceIndex {
    pub(crate) fn get(&self, instance: &EntityRef) -> Option<&InstanceSlot> {
        self.by_instance.get(&instance.id())
    }

    pub(crate) fn contains(&self, instance: &EntityRef) -> bool {
        self.by_instance.contains_key(&instance.id())
    }

    /// Register an instance with no entries. No-op when already present.
    pub(crate) fn register(&mut self, instance: &EntityRef) {
        self.slot_mut(instance);
    }

    /// Append an entry unless the instance already lists it.
    /// Returns whether the entry was appended.
    pub(crate) fn append(&mut self, instance: &EntityRef, id: EntryId) -> bool {
        let slot = self.slot_mut(instance);
        if slot.entries.contains(&id) {
            return false;
        }
        slot.entries.push(id);

        true
    }

    pub(crate) fn len(&self) -> usize {
        self.by_instance.len()
    }

    fn slot_mut(&mut self, instance: &EntityRef) -> &mut InstanceSlot {
        let slot = self
            .by_instance
            .entry(instance.id())
            .or_insert_with(|| InstanceSlot {
                instance: instance.clone(),
                entries: Vec::new(),
            });
        debug_assert!(slot.instance.ptr_eq(instance), "instance id reused");

        slot
    }
}
