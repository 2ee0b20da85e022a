//! Ready-made row sources over an in-memory pool of related rows.

use crate::{
    db::{include::plan::RelatedKeyDeriver, key::EntityKey, reader::SharedReader},
    error::InternalError,
};
use futures::stream::{self, Iter};
use std::{rc::Rc, vec::IntoIter};

///
/// RelatedRow
/// Item type yielded by include row sources.
///

pub type RelatedRow = Result<SharedReader, InternalError>;

/// Row source yielding the readers in `pool` whose related key equals the
/// owner's key, in pool order.
pub fn related_rows(
    pool: &[SharedReader],
) -> impl FnOnce(EntityKey, RelatedKeyDeriver) -> IntoIter<RelatedRow> + '_ {
    move |key, deriver| {
        pool.iter()
            .filter_map(|reader| match deriver.matches(reader.as_ref(), &key) {
                Ok(true) => Some(Ok(Rc::clone(reader))),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Stream form of [`related_rows`] for `include_async`.
pub fn related_stream(
    pool: &[SharedReader],
) -> impl FnOnce(EntityKey, RelatedKeyDeriver) -> Iter<IntoIter<RelatedRow>> + '_ {
    let rows = related_rows(pool);

    move |key, deriver| stream::iter(rows(key, deriver))
}
