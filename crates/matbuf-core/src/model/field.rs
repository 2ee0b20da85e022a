///
/// FieldModel
/// Runtime field metadata: a name and the column slot the value lives at.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in diagnostics and accessor lookup.
    pub name: &'static str,
    /// Zero-based column position within the entity's value reader.
    pub slot: usize,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, slot: usize) -> Self {
        Self { name, slot }
    }
}
