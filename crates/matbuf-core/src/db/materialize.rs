use crate::{
    db::{entity::EntityRef, reader::ValueReader},
    error::InternalError,
    model::entity::EntityModel,
};
use std::collections::BTreeMap;

///
/// Materializer
///
/// Builds one fully populated instance of `entity` from the current row.
/// Must be pure with respect to the reader's row.
///

pub trait Materializer {
    fn materialize(
        &self,
        entity: &'static EntityModel,
        reader: &dyn ValueReader,
    ) -> Result<EntityRef, InternalError>;
}

///
/// MaterializeFn
/// Per-entity materialization function.
///

pub type MaterializeFn = fn(&dyn ValueReader) -> Result<EntityRef, InternalError>;

///
/// MaterializerRegistry
///
/// Dispatches materialization by entity path.
///

#[derive(Clone, Debug, Default)]
pub struct MaterializerRegistry {
    by_path: BTreeMap<&'static str, MaterializeFn>,
}

impl MaterializerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the materializer for one entity.
    #[must_use]
    pub fn with(mut self, entity: &'static EntityModel, f: MaterializeFn) -> Self {
        self.register(entity, f);
        self
    }

    pub fn register(&mut self, entity: &'static EntityModel, f: MaterializeFn) {
        self.by_path.insert(entity.path, f);
    }

    #[must_use]
    pub fn contains(&self, entity: &EntityModel) -> bool {
        self.by_path.contains_key(entity.path)
    }
}

impl Materializer for MaterializerRegistry {
    fn materialize(
        &self,
        entity: &'static EntityModel,
        reader: &dyn ValueReader,
    ) -> Result<EntityRef, InternalError> {
        let f = self.by_path.get(entity.path).ok_or_else(|| {
            InternalError::materializer_unsupported(format!(
                "no materializer registered for entity '{}'",
                entity.path
            ))
        })?;

        f(reader)
    }
}
