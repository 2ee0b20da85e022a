use derive_more::Display;
use std::{any::Any, fmt, rc::Rc};

///
/// InstanceId
///
/// Reference identity of one materialized instance.
/// Only meaningful while some `EntityRef` to the instance is alive; the
/// buffer keeps one alive for every id it indexes.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("instance@{_0:#x}")]
pub struct InstanceId(usize);

///
/// EntityRef
///
/// Shared handle to one materialized object instance.
///
/// Equality is reference identity, never structural: two rows that decode to
/// equal field values but were materialized separately are different
/// instances. Mutation of navigation properties goes through interior
/// mutability inside the concrete type.
///

#[derive(Clone)]
pub struct EntityRef(Rc<dyn Any>);

impl EntityRef {
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    #[must_use]
    pub fn id(&self) -> InstanceId {
        InstanceId(Rc::as_ptr(&self.0).cast::<()>().addr())
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.id()).finish()
    }
}
