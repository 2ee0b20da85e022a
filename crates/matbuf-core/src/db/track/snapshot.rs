use crate::{
    db::{
        entity::{EntityRef, InstanceId},
        key::{CompositeKeyFactory, EntityKey, KeyFactory},
        reader::{RowReader, SharedReader, check_index},
        track::{StateManager, TrackedEntry, TrackedEntryRef},
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{entity::EntityModel, field::FieldModel, navigation::ForeignKeyModel},
    value::Value,
};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

///
/// SnapshotEntry
///
/// Tracked instance plus a full-row snapshot taken at promotion time.
/// Current values start as the snapshot and may be edited afterwards.
///

pub struct SnapshotEntry {
    entity: &'static EntityModel,
    instance: EntityRef,
    original: Vec<Value>,
    current: RefCell<Vec<Value>>,
    keys: Rc<dyn KeyFactory>,
}

impl SnapshotEntry {
    /// Overwrite the current value of one property.
    pub fn set_current_value(
        &self,
        property: &FieldModel,
        value: impl Into<Value>,
    ) -> Result<(), InternalError> {
        let mut current = self.current.borrow_mut();
        check_index(property.slot, current.len())?;
        current[property.slot] = value.into();

        Ok(())
    }

    /// Value captured when tracking started.
    pub fn original_value(&self, property: &FieldModel) -> Result<Value, InternalError> {
        check_index(property.slot, self.original.len())?;

        Ok(self.original[property.slot].clone())
    }

    fn current_reader(&self) -> RowReader {
        RowReader::new(self.current.borrow().clone())
    }
}

impl TrackedEntry for SnapshotEntry {
    fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    fn instance(&self) -> EntityRef {
        self.instance.clone()
    }

    fn property_value(&self, property: &FieldModel) -> Result<Value, InternalError> {
        let current = self.current.borrow();
        check_index(property.slot, current.len())?;

        Ok(current[property.slot].clone())
    }

    fn primary_key(&self) -> Result<Option<EntityKey>, InternalError> {
        self.keys.create(
            self.entity,
            self.entity.primary_key,
            &self.current_reader(),
        )
    }

    fn dependent_key(
        &self,
        foreign_key: &ForeignKeyModel,
    ) -> Result<Option<EntityKey>, InternalError> {
        if !foreign_key.dependent.is(self.entity) {
            return Err(InternalError::new(
                ErrorClass::InvalidArgument,
                ErrorOrigin::Tracker,
                format!(
                    "tracked '{}' is not the dependent of foreign key to '{}'",
                    self.entity.path, foreign_key.principal.path
                ),
            ));
        }

        self.keys.create(
            foreign_key.principal,
            foreign_key.columns,
            &self.current_reader(),
        )
    }
}

///
/// SnapshotStateManager
///
/// In-memory tracking subsystem keyed both by identity key and by instance.
///

pub struct SnapshotStateManager {
    keys: Rc<dyn KeyFactory>,
    by_key: RefCell<BTreeMap<EntityKey, Rc<SnapshotEntry>>>,
    by_instance: RefCell<BTreeMap<InstanceId, Rc<SnapshotEntry>>>,
}

impl SnapshotStateManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_factory(Rc::new(CompositeKeyFactory::default()))
    }

    #[must_use]
    pub fn with_key_factory(keys: Rc<dyn KeyFactory>) -> Self {
        Self {
            keys,
            by_key: RefCell::new(BTreeMap::new()),
            by_instance: RefCell::new(BTreeMap::new()),
        }
    }

    /// Concrete entry for an instance, for callers that edit current values.
    #[must_use]
    pub fn snapshot(&self, instance: &EntityRef) -> Option<Rc<SnapshotEntry>> {
        self.by_instance.borrow().get(&instance.id()).cloned()
    }

    #[must_use]
    pub fn is_tracked(&self, instance: &EntityRef) -> bool {
        self.by_instance.borrow().contains_key(&instance.id())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_instance.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_instance.borrow().is_empty()
    }
}

impl Default for SnapshotStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager for SnapshotStateManager {
    fn entry_by_key(&self, key: &EntityKey) -> Option<TrackedEntryRef> {
        self.by_key
            .borrow()
            .get(key)
            .map(|entry| Rc::clone(entry) as TrackedEntryRef)
    }

    fn entry_by_instance(&self, instance: &EntityRef) -> Option<TrackedEntryRef> {
        self.snapshot(instance)
            .map(|entry| entry as TrackedEntryRef)
    }

    fn start_tracking(
        &self,
        entity: &'static EntityModel,
        instance: &EntityRef,
        reader: &SharedReader,
    ) -> Result<(), InternalError> {
        if self.is_tracked(instance) {
            return Ok(());
        }

        let original = (0..reader.count())
            .map(|slot| reader.read_value(slot))
            .collect::<Result<Vec<_>, _>>()?;
        let key = self
            .keys
            .create(entity, entity.primary_key, &RowReader::new(original.clone()))?
            .ok_or_else(|| {
                InternalError::new(
                    ErrorClass::InvalidArgument,
                    ErrorOrigin::Tracker,
                    format!("cannot track '{}' without an identity key", entity.path),
                )
            })?;

        if let Some(existing) = self.by_key.borrow().get(&key)
            && !existing.instance.ptr_eq(instance)
        {
            return Err(InternalError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Tracker,
                format!("identity {key} is already tracked by another instance"),
            ));
        }

        let entry = Rc::new(SnapshotEntry {
            entity,
            instance: instance.clone(),
            current: RefCell::new(original.clone()),
            original,
            keys: Rc::clone(&self.keys),
        });
        self.by_key.borrow_mut().insert(key, Rc::clone(&entry));
        self.by_instance.borrow_mut().insert(instance.id(), entry);

        Ok(())
    }
}
