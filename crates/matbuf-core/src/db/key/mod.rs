//! Module: key
//! Responsibility: canonical identity keys derived from key columns.
//! Does not own: which columns form a key (model) or what a key maps to (buffer).
//! Boundary: all identity-key construction for the buffer and include engine.
//!
//! Invariants:
//! - Key construction is deterministic for a given reader row.
//! - Keys are tagged with the entity they identify; equal values under
//!   different entities are different keys.
//! - "No identity" is `None`, never a key made of nulls.


use crate::{
    db::reader::ValueReader, error::InternalError, model::entity::EntityModel, value::Value,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// EntityKey
///
/// Identity of one logical row: the entity name plus the ordered key values.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityKey {
    entity: &'static str,
    values: Vec<Value>,
}

impl EntityKey {
    #[must_use]
    pub const fn new(entity: &'static str, values: Vec<Value>) -> Self {
        Self { entity, values }
    }

    /// Single-column key.
    #[must_use]
    pub fn simple(entity: &'static str, value: impl Into<Value>) -> Self {
        Self::new(entity, vec![value.into()])
    }

    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.entity)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

///
/// NullKeyPolicy
///
/// Which null patterns in key columns mean "this row has no identity".
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullKeyPolicy {
    /// Only rows whose key columns are all null (outer-join padding).
    #[default]
    AllNull,
    /// Any null key column disqualifies the row.
    AnyNull,
}

///
/// KeyFactory
///
/// Builds the identity key for `entity` from `columns` of one row.
/// Returns `Ok(None)` for rows that carry no identity.
///

pub trait KeyFactory {
    fn create(
        &self,
        entity: &'static EntityModel,
        columns: &[usize],
        reader: &dyn ValueReader,
    ) -> Result<Option<EntityKey>, InternalError>;
}

///
/// CompositeKeyFactory
/// Default key factory over any number of key columns.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeKeyFactory {
    policy: NullKeyPolicy,
}

impl CompositeKeyFactory {
    #[must_use]
    pub const fn new(policy: NullKeyPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> NullKeyPolicy {
        self.policy
    }
}

impl KeyFactory for CompositeKeyFactory {
    fn create(
        &self,
        entity: &'static EntityModel,
        columns: &[usize],
        reader: &dyn ValueReader,
    ) -> Result<Option<EntityKey>, InternalError> {
        if columns.is_empty() {
            return Err(InternalError::key_invalid_argument(format!(
                "cannot build an identity key for '{}' from zero columns",
                entity.path
            )));
        }

        let values = columns
            .iter()
            .map(|&slot| reader.read_value(slot))
            .collect::<Result<Vec<_>, _>>()?;

        let no_identity = match self.policy {
            NullKeyPolicy::AllNull => values.iter().all(Value::is_null),
            NullKeyPolicy::AnyNull => values.iter().any(Value::is_null),
        };
        if no_identity {
            return Ok(None);
        }

        Ok(Some(EntityKey::new(entity.entity_name, values)))
    }
}
