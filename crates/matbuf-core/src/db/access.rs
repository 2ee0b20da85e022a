//! Module: access
//! Responsibility: write surface used by include fix-up to wire navigations.
//! Does not own: navigation metadata or instance layout.
//! Boundary: the only path through which the buffer mutates an instance.

use crate::{
    db::entity::EntityRef,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::any::Any;
use thiserror::Error as ThisError;

///
/// PropertySetter
///
/// Sets one single-valued navigation on `target`.
/// Implemented for plain functions so navigation models can be static.
///

pub trait PropertySetter: Sync {
    fn set_value(&self, target: &EntityRef, value: &EntityRef) -> Result<(), InternalError>;
}

impl<F> PropertySetter for F
where
    F: Fn(&EntityRef, &EntityRef) -> Result<(), InternalError> + Sync,
{
    fn set_value(&self, target: &EntityRef, value: &EntityRef) -> Result<(), InternalError> {
        self(target, value)
    }
}

///
/// CollectionAccessor
///
/// Appends to one collection-valued navigation on `target`, preserving the
/// order of `values`.
///

pub trait CollectionAccessor: Sync {
    fn add_range(&self, target: &EntityRef, values: &[EntityRef]) -> Result<(), InternalError>;

    fn add(&self, target: &EntityRef, value: &EntityRef) -> Result<(), InternalError> {
        self.add_range(target, std::slice::from_ref(value))
    }
}

impl<F> CollectionAccessor for F
where
    F: Fn(&EntityRef, &[EntityRef]) -> Result<(), InternalError> + Sync,
{
    fn add_range(&self, target: &EntityRef, values: &[EntityRef]) -> Result<(), InternalError> {
        self(target, values)
    }
}

///
/// AccessorError
///

#[derive(Debug, ThisError)]
pub enum AccessorError {
    #[error("accessor target is not a {expected}")]
    TargetMismatch { expected: &'static str },

    #[error("accessor value is not a {expected}")]
    ValueMismatch { expected: &'static str },
}

impl From<AccessorError> for InternalError {
    fn from(err: AccessorError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Accessor,
            err.to_string(),
        )
    }
}

/// Downcast an accessor target, mapping a type mismatch to an accessor error.
pub fn downcast_target<'a, T: Any>(
    target: &'a EntityRef,
    expected: &'static str,
) -> Result<&'a T, InternalError> {
    target
        .downcast_ref::<T>()
        .ok_or_else(|| AccessorError::TargetMismatch { expected }.into())
}

/// Check an accessor value has the expected concrete type.
pub fn ensure_value<T: Any>(value: &EntityRef, expected: &'static str) -> Result<(), InternalError> {
    if value.is::<T>() {
        Ok(())
    } else {
        Err(AccessorError::ValueMismatch { expected }.into())
    }
}
