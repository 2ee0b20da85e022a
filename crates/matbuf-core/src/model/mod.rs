//! Runtime data model definitions.
//!
//! Types in `model` describe the logical entities a query produces and the
//! navigations between them. They are plain static metadata: the buffer
//! reads them, it never mutates them.
//!
//! In general:
//! - `entity` and `field` describe *what a row contains*
//! - `navigation` describes *how two entities point at each other*
pub mod entity;
pub mod field;
pub mod navigation;
