use crate::{
    db::access::{CollectionAccessor, PropertySetter},
    error::InternalError,
    model::entity::EntityModel,
};
use std::fmt;

///
/// ForeignKeyModel
///
/// One association between a principal and a dependent entity.
/// `columns` are dependent-side slots aligned with the principal's
/// primary-key slots; both navigations of an inverse pair share one model.
///

#[derive(Debug)]
pub struct ForeignKeyModel {
    pub principal: &'static EntityModel,
    pub dependent: &'static EntityModel,
    pub columns: &'static [usize],
}

impl ForeignKeyModel {
    /// Principal-side key slots (always the principal's primary key).
    #[must_use]
    pub const fn principal_key(&self) -> &'static [usize] {
        self.principal.primary_key
    }

    fn ensure_aligned(&self) -> Result<(), InternalError> {
        self.principal.ensure_keyed()?;

        if self.columns.len() != self.principal.primary_key.len() {
            return Err(InternalError::include_invalid_argument(format!(
                "foreign key {} -> {} has {} columns but the principal key has {}",
                self.dependent.path,
                self.principal.path,
                self.columns.len(),
                self.principal.primary_key.len(),
            )));
        }

        Ok(())
    }
}

///
/// NavigationDirection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavigationDirection {
    /// Dependent → principal; always single-valued.
    ToPrincipal,
    /// Principal → dependent(s); single- or collection-valued.
    ToDependent,
}

///
/// NavigationAccessor
///
/// Write surface for one navigation property.
///

#[derive(Clone, Copy)]
pub enum NavigationAccessor {
    Reference(&'static dyn PropertySetter),
    Collection(&'static dyn CollectionAccessor),
}

impl fmt::Debug for NavigationAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(_) => f.write_str("Reference"),
            Self::Collection(_) => f.write_str("Collection"),
        }
    }
}

///
/// NavigationModel
///
/// Association descriptor as seen from its declaring entity.
///

pub struct NavigationModel {
    pub name: &'static str,
    pub declaring: &'static EntityModel,
    pub target: &'static EntityModel,
    pub foreign_key: &'static ForeignKeyModel,
    pub direction: NavigationDirection,
    pub accessor: NavigationAccessor,
    pub inverse: Option<&'static NavigationModel>,
}

// inverse pairs point at each other, so only the inverse's name is printed
impl fmt::Debug for NavigationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationModel")
            .field("name", &self.name)
            .field("declaring", &self.declaring.path)
            .field("target", &self.target.path)
            .field("direction", &self.direction)
            .field("accessor", &self.accessor)
            .field("inverse", &self.inverse.map(|inverse| inverse.name))
            .finish_non_exhaustive()
    }
}

impl NavigationModel {
    #[must_use]
    pub const fn points_to_principal(&self) -> bool {
        matches!(self.direction, NavigationDirection::ToPrincipal)
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.accessor, NavigationAccessor::Collection(_))
    }

    /// Single-valued setter for this navigation.
    pub fn setter(&self) -> Result<&'static dyn PropertySetter, InternalError> {
        match self.accessor {
            NavigationAccessor::Reference(setter) => Ok(setter),
            NavigationAccessor::Collection(_) => Err(InternalError::include_invariant(format!(
                "navigation '{}' is collection-valued and has no reference setter",
                self.name
            ))),
        }
    }

    /// Collection accessor for this navigation.
    pub fn collection(&self) -> Result<&'static dyn CollectionAccessor, InternalError> {
        match self.accessor {
            NavigationAccessor::Collection(accessor) => Ok(accessor),
            NavigationAccessor::Reference(_) => Err(InternalError::include_invariant(format!(
                "navigation '{}' is single-valued and has no collection accessor",
                self.name
            ))),
        }
    }

    /// Check the navigation is consistent with its foreign key.
    pub(crate) fn validate(&self) -> Result<(), InternalError> {
        let fk = self.foreign_key;
        fk.ensure_aligned()?;

        let (declaring, target) = match self.direction {
            NavigationDirection::ToPrincipal => (fk.dependent, fk.principal),
            NavigationDirection::ToDependent => (fk.principal, fk.dependent),
        };
        if !self.declaring.is(declaring) || !self.target.is(target) {
            return Err(InternalError::include_invalid_argument(format!(
                "navigation '{}' ({} -> {}) does not match its foreign key {} -> {}",
                self.name,
                self.declaring.path,
                self.target.path,
                fk.dependent.path,
                fk.principal.path,
            )));
        }

        if self.points_to_principal() && self.is_collection() {
            return Err(InternalError::include_invalid_argument(format!(
                "navigation '{}' points to the principal but is collection-valued",
                self.name
            )));
        }

        if let Some(inverse) = self.inverse
            && !std::ptr::eq(inverse.foreign_key, fk)
        {
            return Err(InternalError::include_invalid_argument(format!(
                "inverse '{}' of navigation '{}' uses a different foreign key",
                inverse.name, self.name
            )));
        }

        Ok(())
    }
}
