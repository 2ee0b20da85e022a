//! Module: include
//! Responsibility: loading related instances for one navigation and wiring
//! references in both directions.
//! Does not own: fetching related rows (caller-supplied row source) or
//! identity resolution (delegated to the buffer).
//! Boundary: key derivation and fix-up are shared by `include` and
//! `include_async`; only the way rows are pulled differs.
//!
//! Invariants:
//! - Related instances are wired in the order the row source yields them.
//! - Related rows are resolved against the buffer only, never the tracker.
//! - A related instance reached twice keeps its first entry.
//! - Async includes yield only while awaiting the next row, never mid-fix-up.
//! - A failing or cancelled include leaves every related instance it listed
//!   under the owner wired, in both variants.

mod fixup;
mod plan;
mod source;


use crate::{
    db::{
        buffer::{QueryBuffer, StateLookup},
        entity::EntityRef,
        key::EntityKey,
        reader::SharedReader,
    },
    error::InternalError,
    model::{entity::EntityModel, navigation::NavigationModel},
    obs::sink::{IncludeOutcome, MetricsEvent},
};
use fixup::NavigationFixup;
use futures::{Stream, StreamExt};
use std::pin::pin;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// re-exports
pub use plan::RelatedKeyDeriver;
pub use source::{RelatedRow, related_rows, related_stream};

impl QueryBuffer {
    /// Load and wire `navigation` on `owner` from a synchronous row source.
    ///
    /// `related_rows` receives the owner's key and a deriver for the key of
    /// each related row. A `None` owner is a no-op. When a row fails, the
    /// rows resolved before it are still wired and the error is returned.
    pub fn include<F, I>(
        &mut self,
        owner: Option<&EntityRef>,
        navigation: &'static NavigationModel,
        related_rows: F,
    ) -> Result<(), InternalError>
    where
        F: FnOnce(EntityKey, RelatedKeyDeriver) -> I,
        I: IntoIterator<Item = RelatedRow>,
    {
        let Some(owner) = owner else {
            return Ok(());
        };

        let plan = self.plan_include(owner, navigation)?;
        let related_entity = plan.related_entity;
        let mut fixup = NavigationFixup::new(owner, plan.side);
        let Some(owner_key) = plan.owner_key else {
            self.finish_include(navigation, &fixup, &Ok(()));
            return Ok(());
        };

        let mut related = Vec::new();
        let mut failure = None;
        for row in related_rows(owner_key, plan.deriver) {
            match row.and_then(|reader| self.resolve_related(owner, related_entity, reader)) {
                Ok(Some(instance)) => related.push(instance),
                Ok(None) => {}
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // the resolved prefix is wired even when a later row failed
        let wired = fixup.apply(&related);
        let result = failure.map_or(wired, Err);
        self.finish_include(navigation, &fixup, &result);

        result
    }

    /// Load and wire `navigation` on `owner` from an asynchronous row source.
    ///
    /// Suspends only while awaiting the next related row. Cancelling `cancel`
    /// aborts that wait with a `Cancelled` error. Instances wired before the
    /// cancellation or a failing row stay wired.
    pub async fn include_async<F, S>(
        &mut self,
        owner: Option<&EntityRef>,
        navigation: &'static NavigationModel,
        related_rows: F,
        cancel: &CancellationToken,
    ) -> Result<(), InternalError>
    where
        F: FnOnce(EntityKey, RelatedKeyDeriver) -> S,
        S: Stream<Item = RelatedRow>,
    {
        let Some(owner) = owner else {
            return Ok(());
        };

        let plan = self.plan_include(owner, navigation)?;
        let related_entity = plan.related_entity;
        let mut fixup = NavigationFixup::new(owner, plan.side);
        let Some(owner_key) = plan.owner_key else {
            self.finish_include(navigation, &fixup, &Ok(()));
            return Ok(());
        };

        let mut rows = pin!(related_rows(owner_key, plan.deriver));
        let result = loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    break Err(InternalError::include_cancelled(navigation.name, fixup.seen()));
                }
                next = rows.next() => next,
            };

            let Some(row) = next else {
                break Ok(());
            };
            let step = row
                .and_then(|reader| self.resolve_related(owner, related_entity, reader))
                .and_then(|instance| {
                    instance.map_or(Ok(()), |instance| {
                        fixup.apply(std::slice::from_ref(&instance))
                    })
                });
            if let Err(err) = step {
                break Err(err);
            }
        };
        self.finish_include(navigation, &fixup, &result);

        result
    }

    // Resolve one related row through the buffer and list it under the owner.
    fn resolve_related(
        &mut self,
        owner: &EntityRef,
        entity: &'static EntityModel,
        reader: SharedReader,
    ) -> Result<Option<EntityRef>, InternalError> {
        let Some(instance) = self.get_entity(entity, reader, StateLookup::BufferOnly)? else {
            return Ok(None);
        };
        self.attach_related(owner, &instance)?;

        Ok(Some(instance))
    }

    fn finish_include(
        &self,
        navigation: &'static NavigationModel,
        fixup: &NavigationFixup<'_>,
        result: &Result<(), InternalError>,
    ) {
        let related = fixup.seen();
        let outcome = match result {
            Ok(()) => {
                debug!(navigation = navigation.name, related, "include finished");
                IncludeOutcome::Completed
            }
            Err(err) if err.is_cancelled() => {
                debug!(navigation = navigation.name, related, "include cancelled");
                IncludeOutcome::Cancelled
            }
            Err(err) => {
                debug!(navigation = navigation.name, related, error = %err, "include failed");
                IncludeOutcome::Failed
            }
        };

        self.record(MetricsEvent::IncludeFinished {
            navigation: navigation.name,
            related: related as u64,
            outcome,
        });
    }
}
