use crate::{error::InternalError, model::field::FieldModel};

///
/// EntityModel
/// Minimal runtime model for one logical entity type.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Fully-qualified type path (for dispatch and diagnostics).
    pub path: &'static str,
    /// Stable external name used to tag identity keys.
    pub entity_name: &'static str,
    /// Column slots of the primary key, in key order.
    pub primary_key: &'static [usize],
    /// Ordered field list.
    pub fields: &'static [FieldModel],
}

impl EntityModel {
    /// Look up one field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Reject models that cannot produce an identity key.
    pub(crate) fn ensure_keyed(&self) -> Result<(), InternalError> {
        if self.primary_key.is_empty() {
            return Err(InternalError::buffer_invalid_argument(format!(
                "entity '{}' declares no primary key columns",
                self.path
            )));
        }

        Ok(())
    }

    /// Identity comparison on static models.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.path == other.path
    }
}
