//! Module: reader
//! Responsibility: positional access to one raw row's column values.
//! Does not own: key construction or instance materialization.
//! Boundary: every column read performed by the buffer goes through `ValueReader`.
//!
//! Invariants:
//! - Column positions are zero-based and stable for the reader's lifetime.
//! - Reading the same column twice yields equal values.

mod encoded;
mod offset;


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Value,
};
use std::rc::Rc;
use thiserror::Error as ThisError;

// re-exports
pub use encoded::EncodedRowReader;
pub use offset::OffsetReader;

///
/// SharedReader
/// Value readers are shared between the row source, buffered entries, and
/// the tracking subsystem.
///

pub type SharedReader = Rc<dyn ValueReader>;

///
/// ReaderError
///

#[derive(Debug, ThisError)]
pub enum ReaderError {
    #[error("column {index} out of range (row has {count} columns)")]
    OutOfRange { index: usize, count: usize },

    #[error("column {index} could not be decoded: {message}")]
    Decode { index: usize, message: String },

    #[error("offset window {offset}+{count} exceeds underlying row of {available} columns")]
    InvalidWindow {
        offset: usize,
        count: usize,
        available: usize,
    },
}

impl From<ReaderError> for InternalError {
    fn from(err: ReaderError) -> Self {
        let class = match err {
            ReaderError::OutOfRange { .. } | ReaderError::InvalidWindow { .. } => {
                ErrorClass::InvalidArgument
            }
            ReaderError::Decode { .. } => ErrorClass::Internal,
        };

        Self::new(class, ErrorOrigin::Reader, err.to_string())
    }
}

///
/// ValueReader
///
/// Positional accessor over one row. Implementations may defer decoding
/// until a column is actually read.
///

pub trait ValueReader {
    /// Number of columns visible through this reader.
    fn count(&self) -> usize;

    /// Decode the value at `index`.
    fn read_value(&self, index: usize) -> Result<Value, InternalError>;

    fn is_null(&self, index: usize) -> Result<bool, InternalError> {
        Ok(self.read_value(index)?.is_null())
    }
}

/// Bounds check shared by reader implementations.
pub(crate) fn check_index(index: usize, count: usize) -> Result<(), ReaderError> {
    if index >= count {
        return Err(ReaderError::OutOfRange { index, count });
    }

    Ok(())
}

///
/// RowReader
/// Reader over already-decoded values.
///

#[derive(Clone, Debug, Default)]
pub struct RowReader {
    values: Vec<Value>,
}

impl RowReader {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Convenience constructor returning the shared form.
    #[must_use]
    pub fn shared<I, V>(values: I) -> SharedReader
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Rc::new(Self::new(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl ValueReader for RowReader {
    fn count(&self) -> usize {
        self.values.len()
    }

    fn read_value(&self, index: usize) -> Result<Value, InternalError> {
        check_index(index, self.values.len())?;

        Ok(self.values[index].clone())
    }

    fn is_null(&self, index: usize) -> Result<bool, InternalError> {
        check_index(index, self.values.len())?;

        Ok(self.values[index].is_null())
    }
}
