//! Core runtime for matbuf: the materialization and identity-resolution
//! buffer that sits between query execution and change tracking.
//!
//! Rows come in through value readers; `QueryBuffer` turns them into
//! deduplicated instances, answers property reads for instances it produced,
//! promotes them into the tracker, and wires navigations on request.
#![warn(unreachable_pub)]

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, readers, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{EntityKey, EntityRef, QueryBuffer, StateLookup},
        model::{
            entity::EntityModel,
            field::FieldModel,
            navigation::{ForeignKeyModel, NavigationAccessor, NavigationDirection, NavigationModel},
        },
        value::Value,
    };
}
