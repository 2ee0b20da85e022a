use crate::{
    db::{
        buffer::QueryBuffer,
        entity::EntityRef,
        key::{EntityKey, KeyFactory},
        reader::ValueReader,
        track::TrackedEntry,
    },
    error::InternalError,
    model::{
        entity::EntityModel,
        navigation::{NavigationDirection, NavigationModel},
    },
};
use std::{fmt, rc::Rc};

///
/// IncludeSide
///
/// Direction of one navigation, resolved once per include. Each side knows
/// which columns key the owner, which columns key a related row, and which
/// fix-up rule applies. Keys on both sides are tagged with the principal
/// entity so they compare equal when the rows belong together.
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum IncludeSide {
    /// Owner is the dependent; related rows are its principal.
    Principal(&'static NavigationModel),
    /// Owner is the principal; related rows are its dependents.
    Dependent(&'static NavigationModel),
}

impl IncludeSide {
    pub(crate) fn resolve(navigation: &'static NavigationModel) -> Result<Self, InternalError> {
        navigation.validate()?;

        Ok(match navigation.direction {
            NavigationDirection::ToPrincipal => Self::Principal(navigation),
            NavigationDirection::ToDependent => Self::Dependent(navigation),
        })
    }

    pub(crate) const fn navigation(self) -> &'static NavigationModel {
        match self {
            Self::Principal(navigation) | Self::Dependent(navigation) => navigation,
        }
    }

    /// Entity every key on this navigation is tagged with.
    const fn key_entity(self) -> &'static EntityModel {
        self.navigation().foreign_key.principal
    }

    /// Columns of the owner's own row that key the association.
    const fn owner_columns(self) -> &'static [usize] {
        let fk = self.navigation().foreign_key;
        match self {
            Self::Principal(_) => fk.columns,
            Self::Dependent(_) => fk.principal_key(),
        }
    }

    /// Columns of a related row that key the association.
    const fn related_columns(self) -> &'static [usize] {
        let fk = self.navigation().foreign_key;
        match self {
            Self::Principal(_) => fk.principal_key(),
            Self::Dependent(_) => fk.columns,
        }
    }

    fn owner_key(
        self,
        keys: &dyn KeyFactory,
        reader: &dyn ValueReader,
    ) -> Result<Option<EntityKey>, InternalError> {
        keys.create(self.key_entity(), self.owner_columns(), reader)
    }

    fn tracked_owner_key(self, tracked: &dyn TrackedEntry) -> Result<Option<EntityKey>, InternalError> {
        match self {
            Self::Principal(navigation) => tracked.dependent_key(navigation.foreign_key),
            Self::Dependent(_) => tracked.primary_key(),
        }
    }
}

///
/// RelatedKeyDeriver
///
/// Computes the key a related row must carry to belong to the owner.
/// Handed to row sources so they can filter or index related rows without
/// knowing the navigation.
///

#[derive(Clone)]
pub struct RelatedKeyDeriver {
    keys: Rc<dyn KeyFactory>,
    entity: &'static EntityModel,
    columns: &'static [usize],
}

impl RelatedKeyDeriver {
    pub fn derive(&self, reader: &dyn ValueReader) -> Result<Option<EntityKey>, InternalError> {
        self.keys.create(self.entity, self.columns, reader)
    }

    /// Whether `reader` keys to `key`.
    pub fn matches(&self, reader: &dyn ValueReader, key: &EntityKey) -> Result<bool, InternalError> {
        Ok(self.derive(reader)?.as_ref() == Some(key))
    }
}

impl fmt::Debug for RelatedKeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedKeyDeriver")
            .field("entity", &self.entity.path)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

///
/// IncludePlan
/// Output of key derivation, shared by the sync and async include paths.
///

#[derive(Debug)]
pub(crate) struct IncludePlan {
    pub(crate) side: IncludeSide,
    pub(crate) related_entity: &'static EntityModel,
    pub(crate) owner_key: Option<EntityKey>,
    pub(crate) deriver: RelatedKeyDeriver,
}

impl QueryBuffer {
    /// Derive the owner's key for `navigation` and the related-key deriver.
    pub(crate) fn plan_include(
        &mut self,
        owner: &EntityRef,
        navigation: &'static NavigationModel,
    ) -> Result<IncludePlan, InternalError> {
        let side = IncludeSide::resolve(navigation)?;
        let keys = self.key_factory();

        let owner_key = if let Some(entry) = self.canonical_entry(owner) {
            ensure_declaring(navigation, entry.entity())?;
            side.owner_key(keys.as_ref(), entry.reader().as_ref())?
        } else {
            let tracked = self.state().entry_by_instance(owner).ok_or_else(|| {
                InternalError::include_not_found(format!(
                    "include '{}': owner instance is neither buffered nor tracked",
                    navigation.name
                ))
            })?;
            ensure_declaring(navigation, tracked.entity())?;
            let key = side.tracked_owner_key(tracked.as_ref())?;
            self.register_instance(owner);

            key
        };

        Ok(IncludePlan {
            side,
            related_entity: navigation.target,
            owner_key,
            deriver: RelatedKeyDeriver {
                keys,
                entity: side.key_entity(),
                columns: side.related_columns(),
            },
        })
    }
}

fn ensure_declaring(
    navigation: &NavigationModel,
    entity: &EntityModel,
) -> Result<(), InternalError> {
    if navigation.declaring.is(entity) {
        return Ok(());
    }

    Err(InternalError::include_invalid_argument(format!(
        "navigation '{}' is declared on '{}', not '{}'",
        navigation.name, navigation.declaring.path, entity.path
    )))
}
