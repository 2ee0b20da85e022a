use crate::{
    db::{entity::EntityRef, include::plan::IncludeSide},
    error::InternalError,
    model::navigation::NavigationModel,
};

///
/// NavigationFixup
///
/// Reciprocal reference wiring for one include. Fed either the complete
/// related list at once (sync) or one related instance at a time as rows
/// arrive (async); both feeds produce the same wiring in the same order.
///

pub(crate) struct NavigationFixup<'a> {
    owner: &'a EntityRef,
    side: IncludeSide,
    seen: usize,
}

impl<'a> NavigationFixup<'a> {
    pub(crate) const fn new(owner: &'a EntityRef, side: IncludeSide) -> Self {
        Self {
            owner,
            side,
            seen: 0,
        }
    }

    /// Number of related instances fed so far.
    pub(crate) const fn seen(&self) -> usize {
        self.seen
    }

    /// Wire the next batch of related instances, in order.
    pub(crate) fn apply(&mut self, related: &[EntityRef]) -> Result<(), InternalError> {
        if related.is_empty() {
            return Ok(());
        }

        let first_batch = self.seen == 0;
        self.seen += related.len();

        match self.side {
            IncludeSide::Principal(navigation) => {
                if first_batch {
                    self.wire_principal(navigation, &related[0])?;
                }
            }
            IncludeSide::Dependent(navigation) if navigation.is_collection() => {
                self.wire_dependents(navigation, related)?;
            }
            IncludeSide::Dependent(navigation) => {
                if first_batch {
                    self.wire_dependent(navigation, &related[0])?;
                }
            }
        }

        Ok(())
    }

    // Dependent → principal: owner.nav = principal; inverse points back.
    fn wire_principal(
        &self,
        navigation: &NavigationModel,
        principal: &EntityRef,
    ) -> Result<(), InternalError> {
        navigation.setter()?.set_value(self.owner, principal)?;

        if let Some(inverse) = navigation.inverse {
            if inverse.is_collection() {
                inverse.collection()?.add(principal, self.owner)?;
            } else {
                inverse.setter()?.set_value(principal, self.owner)?;
            }
        }

        Ok(())
    }

    // Principal → many dependents: append all; each dependent points back.
    fn wire_dependents(
        &self,
        navigation: &NavigationModel,
        dependents: &[EntityRef],
    ) -> Result<(), InternalError> {
        navigation.collection()?.add_range(self.owner, dependents)?;

        if let Some(inverse) = navigation.inverse.filter(|inverse| !inverse.is_collection()) {
            let setter = inverse.setter()?;
            for dependent in dependents {
                setter.set_value(dependent, self.owner)?;
            }
        }

        Ok(())
    }

    // Principal → single dependent.
    fn wire_dependent(
        &self,
        navigation: &NavigationModel,
        dependent: &EntityRef,
    ) -> Result<(), InternalError> {
        navigation.setter()?.set_value(self.owner, dependent)?;

        if let Some(inverse) = navigation.inverse {
            inverse.setter()?.set_value(dependent, self.owner)?;
        }

        Ok(())
    }
}
