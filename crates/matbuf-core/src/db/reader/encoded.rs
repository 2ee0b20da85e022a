use crate::{
    db::reader::{ReaderError, SharedReader, ValueReader, check_index},
    error::InternalError,
    value::Value,
};
use std::{cell::OnceCell, rc::Rc};

///
/// EncodedRowReader
///
/// Reader over CBOR-encoded columns. Each column is decoded on first read
/// and cached; columns that are never read are never decoded.
///

pub struct EncodedRowReader {
    columns: Vec<Vec<u8>>,
    decoded: Vec<OnceCell<Value>>,
}

impl EncodedRowReader {
    #[must_use]
    pub fn new(columns: Vec<Vec<u8>>) -> Self {
        let decoded = columns.iter().map(|_| OnceCell::new()).collect();

        Self { columns, decoded }
    }

    /// Encode decoded values column by column.
    pub fn encode(values: &[Value]) -> Result<Self, InternalError> {
        let columns = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                serde_cbor::to_vec(value).map_err(|err| ReaderError::Decode {
                    index,
                    message: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(columns))
    }

    #[must_use]
    pub fn into_shared(self) -> SharedReader {
        Rc::new(self)
    }

    /// Number of columns decoded so far.
    #[must_use]
    pub fn decoded_count(&self) -> usize {
        self.decoded.iter().filter(|cell| cell.get().is_some()).count()
    }
}

impl ValueReader for EncodedRowReader {
    fn count(&self) -> usize {
        self.columns.len()
    }

    fn read_value(&self, index: usize) -> Result<Value, InternalError> {
        check_index(index, self.columns.len())?;

        if let Some(value) = self.decoded[index].get() {
            return Ok(value.clone());
        }

        let value: Value =
            serde_cbor::from_slice(&self.columns[index]).map_err(|err| ReaderError::Decode {
                index,
                message: err.to_string(),
            })?;

        Ok(self.decoded[index].get_or_init(|| value).clone())
    }
}
