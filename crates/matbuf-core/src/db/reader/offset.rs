use crate::{
    db::reader::{ReaderError, SharedReader, ValueReader, check_index},
    error::InternalError,
    value::Value,
};
use std::rc::Rc;

///
/// OffsetReader
///
/// Window over a contiguous column range of a wider row. Joined result rows
/// carry several entities side by side; each entity reads its own columns
/// through a window starting at its offset.
///

pub struct OffsetReader {
    inner: SharedReader,
    offset: usize,
    count: usize,
}

impl OffsetReader {
    pub fn new(inner: SharedReader, offset: usize, count: usize) -> Result<Self, InternalError> {
        let available = inner.count();
        if offset.saturating_add(count) > available {
            return Err(ReaderError::InvalidWindow {
                offset,
                count,
                available,
            }
            .into());
        }

        Ok(Self {
            inner,
            offset,
            count,
        })
    }

    /// Shared form of `new`.
    pub fn shared(
        inner: &SharedReader,
        offset: usize,
        count: usize,
    ) -> Result<SharedReader, InternalError> {
        Ok(Rc::new(Self::new(Rc::clone(inner), offset, count)?))
    }
}

impl ValueReader for OffsetReader {
    fn count(&self) -> usize {
        self.count
    }

    fn read_value(&self, index: usize) -> Result<Value, InternalError> {
        check_index(index, self.count)?;

        self.inner.read_value(self.offset + index)
    }

    fn is_null(&self, index: usize) -> Result<bool, InternalError> {
        check_index(index, self.count)?;

        self.inner.is_null(self.offset + index)
    }
}
