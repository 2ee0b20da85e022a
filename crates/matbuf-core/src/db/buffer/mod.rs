//! Module: buffer
//! Responsibility: identity resolution and instance bookkeeping for one query execution.
//! Does not own: key construction, materialization, or tracking policy.
//! Boundary: the query pipeline resolves every row through `QueryBuffer`.
//!
//! Invariants:
//! - A derived identity key maps to at most one entry; repeated rows with the
//!   same key resolve to the same instance.
//! - "No identity" rows never create entries.
//! - Every instance in the identity map is in the instance index and lists
//!   its own entry first.
//! - Tracked state always wins over buffered rows.

mod entry;
mod index;


use crate::{
    config::BufferConfig,
    db::{
        entity::EntityRef,
        key::{CompositeKeyFactory, EntityKey, KeyFactory},
        materialize::Materializer,
        reader::SharedReader,
        track::StateManager,
    },
    error::InternalError,
    model::{entity::EntityModel, field::FieldModel},
    obs::sink::{self, MetricsEvent, ResolveOutcome},
    value::Value,
};
use std::rc::Rc;
use tracing::{debug, trace};

pub(crate) use entry::EntryId;
use index::{IdentityMap, InstanceIndex};

// re-exports
pub use entry::BufferedEntry;

///
/// StateLookup
///
/// Whether `get_entity` consults the tracking subsystem before the buffer.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StateLookup {
    /// Already-tracked instances take precedence.
    #[default]
    Tracked,
    /// Resolve against the buffer only.
    BufferOnly,
}

///
/// QueryBuffer
///
/// Materialization and identity-resolution buffer scoped to one query
/// execution. Not shareable across threads.
///

pub struct QueryBuffer {
    config: BufferConfig,
    keys: Rc<dyn KeyFactory>,
    materializer: Rc<dyn Materializer>,
    state: Rc<dyn StateManager>,
    entries: Vec<BufferedEntry>,
    identity: IdentityMap,
    instances: InstanceIndex,
}

impl QueryBuffer {
    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Build a buffer using the composite key factory configured by `config`.
    #[must_use]
    pub fn new(
        config: BufferConfig,
        materializer: Rc<dyn Materializer>,
        state: Rc<dyn StateManager>,
    ) -> Self {
        let keys = Rc::new(CompositeKeyFactory::new(config.null_keys));

        Self {
            entries: Vec::with_capacity(config.capacity_hint),
            config,
            keys,
            materializer,
            state,
            identity: IdentityMap::default(),
            instances: InstanceIndex::default(),
        }
    }

    /// Replace the key factory. Only meaningful before the first row.
    #[must_use]
    pub fn with_key_factory(mut self, keys: Rc<dyn KeyFactory>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &BufferConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Identity resolution
    // ------------------------------------------------------------------

    /// Resolve one row of `entity` to an instance.
    ///
    /// Returns `Ok(None)` for rows without identity (outer-join padding).
    pub fn get_entity(
        &mut self,
        entity: &'static EntityModel,
        reader: SharedReader,
        lookup: StateLookup,
    ) -> Result<Option<EntityRef>, InternalError> {
        entity.ensure_keyed()?;

        // Phase 1: derive the identity key.
        let Some(key) = self
            .keys
            .create(entity, entity.primary_key, reader.as_ref())?
        else {
            self.record_resolve(entity, ResolveOutcome::NoIdentity);
            trace!(entity = entity.path, "row has no identity");
            return Ok(None);
        };

        // Phase 2: tracked state, then the identity map.
        if lookup == StateLookup::Tracked
            && let Some(tracked) = self.state.entry_by_key(&key)
        {
            self.record_resolve(entity, ResolveOutcome::Tracked);
            trace!(entity = entity.path, %key, "resolved from tracker");
            return Ok(Some(tracked.instance()));
        }

        if let Some(id) = self.identity.get(&key) {
            let instance = self.entry(id).instance().cloned().ok_or_else(|| {
                InternalError::buffer_invariant(format!(
                    "identity {key} maps to an entry without an instance"
                ))
            })?;
            self.record_resolve(entity, ResolveOutcome::IdentityHit);
            trace!(entity = entity.path, %key, "resolved from identity map");
            return Ok(Some(instance));
        }

        // Phase 3: materialize, then index under both the key and the instance.
        let instance = self.materializer.materialize(entity, reader.as_ref())?;
        self.insert_materialized(key, entity, reader, &instance)?;
        self.record_resolve(entity, ResolveOutcome::Materialized);

        Ok(Some(instance))
    }

    /// Read one property of an instance produced (or tracked) for this query.
    pub fn get_property_value(
        &self,
        instance: &EntityRef,
        property: &FieldModel,
    ) -> Result<Value, InternalError> {
        if let Some(tracked) = self.state.entry_by_instance(instance) {
            return tracked.property_value(property);
        }

        let entry = self
            .canonical_entry(instance)
            .ok_or_else(|| InternalError::unknown_instance("get_property_value"))?;

        let entity = entry.entity();
        if entity.field(property.name).is_none_or(|f| f.slot != property.slot) {
            return Err(InternalError::buffer_invalid_argument(format!(
                "property '{}' is not a field of '{}'",
                property.name, entity.path
            )));
        }

        entry.reader().read_value(property.slot)
    }

    /// Promote every entry reachable from `instance` into the tracker.
    pub fn start_tracking(&self, instance: &EntityRef) -> Result<(), InternalError> {
        let Some(slot) = self.instances.get(instance) else {
            return Ok(());
        };

        for &id in slot.entries() {
            self.entry(id).start_tracking(self.state.as_ref())?;
        }

        let entity_path = self
            .canonical_entry(instance)
            .map_or("<tracked>", |entry| entry.entity().path);
        debug!(
            entity = entity_path,
            entries = slot.entries().len(),
            "started tracking buffered entries"
        );
        self.record(MetricsEvent::TrackingStarted {
            entity_path,
            entries: slot.entries().len() as u64,
        });

        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of distinct identities buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identity.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.len() == 0
    }

    /// Number of instances known to the instance index.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn contains_key(&self, key: &EntityKey) -> bool {
        self.identity.contains(key)
    }

    /// Entries reachable from `instance`, own entry first.
    #[must_use]
    pub fn entries_for(&self, instance: &EntityRef) -> Vec<&BufferedEntry> {
        self.instances
            .get(instance)
            .map(|slot| slot.entries().iter().map(|&id| self.entry(id)).collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Include support
    // ------------------------------------------------------------------

    pub(crate) fn key_factory(&self) -> Rc<dyn KeyFactory> {
        Rc::clone(&self.keys)
    }

    pub(crate) fn state(&self) -> &dyn StateManager {
        self.state.as_ref()
    }

    /// The instance's own entry: the first listed entry materialized as it.
    pub(crate) fn canonical_entry(&self, instance: &EntityRef) -> Option<&BufferedEntry> {
        self.instances
            .get(instance)?
            .entries()
            .iter()
            .map(|&id| self.entry(id))
            .find(|entry| entry.is_instance(instance))
    }

    /// Make `instance` known to the instance index without an entry.
    pub(crate) fn register_instance(&mut self, instance: &EntityRef) {
        self.instances.register(instance);
    }

    /// List `related`'s own entry under `owner` so promoting the owner
    /// promotes what was included with it.
    pub(crate) fn attach_related(
        &mut self,
        owner: &EntityRef,
        related: &EntityRef,
    ) -> Result<(), InternalError> {
        let id = self
            .instances
            .get(related)
            .and_then(|slot| {
                slot.entries()
                    .iter()
                    .copied()
                    .find(|&id| self.entry(id).is_instance(related))
            })
            .ok_or_else(|| {
                InternalError::buffer_invariant(
                    "related instance resolved without a buffered entry",
                )
            })?;
        self.instances.append(owner, id);

        Ok(())
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        if self.config.metrics {
            sink::record(event);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn entry(&self, id: EntryId) -> &BufferedEntry {
        &self.entries[id.index()]
    }

    fn insert_materialized(
        &mut self,
        key: EntityKey,
        entity: &'static EntityModel,
        reader: SharedReader,
        instance: &EntityRef,
    ) -> Result<(), InternalError> {
        if self.instances.contains(instance) {
            return Err(InternalError::buffer_invariant(format!(
                "materializer for '{}' returned an instance the buffer already holds",
                entity.path
            )));
        }

        let id = EntryId::new(self.entries.len());
        trace!(entity = entity.path, %key, "materialized new instance");
        if !self.identity.insert(key, id) {
            return Err(InternalError::buffer_invariant(
                "identity key inserted twice",
            ));
        }
        self.entries
            .push(BufferedEntry::materialized(entity, reader, instance.clone()));
        self.instances.append(instance, id);

        Ok(())
    }

    fn record_resolve(&self, entity: &'static EntityModel, outcome: ResolveOutcome) {
        self.record(MetricsEvent::RowResolved {
            entity_path: entity.path,
            outcome,
        });
    }
}
