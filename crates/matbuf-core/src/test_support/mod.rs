//! Shared fixtures for unit tests: a customer/order/profile schema, its
//! materializers and accessors, and a buffer wired to a snapshot tracker.

use crate::{
    config::BufferConfig,
    db::{
        EntityRef, MaterializerRegistry, QueryBuffer, RowReader, SharedReader,
        SnapshotStateManager, ValueReader,
        access::{downcast_target, ensure_value},
    },
    error::InternalError,
    model::{
        entity::EntityModel,
        field::FieldModel,
        navigation::{ForeignKeyModel, NavigationAccessor, NavigationDirection, NavigationModel},
    },
    value::Value,
};
use std::{cell::RefCell, rc::Rc};

// -----------------------------------------------------------------------------
// Instances
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Customer {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) orders: RefCell<Vec<EntityRef>>,
    pub(crate) profile: RefCell<Option<EntityRef>>,
}

#[derive(Debug)]
pub(crate) struct Order {
    pub(crate) id: i64,
    pub(crate) customer_id: Option<i64>,
    pub(crate) customer: RefCell<Option<EntityRef>>,
}

#[derive(Debug)]
pub(crate) struct Profile {
    pub(crate) id: i64,
    pub(crate) customer: RefCell<Option<EntityRef>>,
}

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

pub(crate) static CUSTOMER_FIELDS: [FieldModel; 2] =
    [FieldModel::new("id", 0), FieldModel::new("name", 1)];
pub(crate) static ORDER_FIELDS: [FieldModel; 3] = [
    FieldModel::new("id", 0),
    FieldModel::new("customer_id", 1),
    FieldModel::new("note", 2),
];
pub(crate) static PROFILE_FIELDS: [FieldModel; 2] =
    [FieldModel::new("id", 0), FieldModel::new("customer_id", 1)];

pub(crate) static CUSTOMER: EntityModel = EntityModel {
    path: "test_support::Customer",
    entity_name: "Customer",
    primary_key: &[0],
    fields: &CUSTOMER_FIELDS,
};

pub(crate) static ORDER: EntityModel = EntityModel {
    path: "test_support::Order",
    entity_name: "Order",
    primary_key: &[0],
    fields: &ORDER_FIELDS,
};

pub(crate) static PROFILE: EntityModel = EntityModel {
    path: "test_support::Profile",
    entity_name: "Profile",
    primary_key: &[0],
    fields: &PROFILE_FIELDS,
};

pub(crate) static ORDER_CUSTOMER_FK: ForeignKeyModel = ForeignKeyModel {
    principal: &CUSTOMER,
    dependent: &ORDER,
    columns: &[1],
};

pub(crate) static PROFILE_CUSTOMER_FK: ForeignKeyModel = ForeignKeyModel {
    principal: &CUSTOMER,
    dependent: &PROFILE,
    columns: &[1],
};

pub(crate) static CUSTOMER_ORDERS: NavigationModel = NavigationModel {
    name: "orders",
    declaring: &CUSTOMER,
    target: &ORDER,
    foreign_key: &ORDER_CUSTOMER_FK,
    direction: NavigationDirection::ToDependent,
    accessor: NavigationAccessor::Collection(&add_customer_orders),
    inverse: Some(&ORDER_CUSTOMER),
};

pub(crate) static ORDER_CUSTOMER: NavigationModel = NavigationModel {
    name: "customer",
    declaring: &ORDER,
    target: &CUSTOMER,
    foreign_key: &ORDER_CUSTOMER_FK,
    direction: NavigationDirection::ToPrincipal,
    accessor: NavigationAccessor::Reference(&set_order_customer),
    inverse: Some(&CUSTOMER_ORDERS),
};

/// Same association as `ORDER_CUSTOMER`, with no inverse navigation.
pub(crate) static ORDER_CUSTOMER_ONE_WAY: NavigationModel = NavigationModel {
    name: "customer_one_way",
    declaring: &ORDER,
    target: &CUSTOMER,
    foreign_key: &ORDER_CUSTOMER_FK,
    direction: NavigationDirection::ToPrincipal,
    accessor: NavigationAccessor::Reference(&set_order_customer),
    inverse: None,
};

pub(crate) static CUSTOMER_PROFILE: NavigationModel = NavigationModel {
    name: "profile",
    declaring: &CUSTOMER,
    target: &PROFILE,
    foreign_key: &PROFILE_CUSTOMER_FK,
    direction: NavigationDirection::ToDependent,
    accessor: NavigationAccessor::Reference(&set_customer_profile),
    inverse: Some(&PROFILE_CUSTOMER),
};

pub(crate) static PROFILE_CUSTOMER: NavigationModel = NavigationModel {
    name: "profile_customer",
    declaring: &PROFILE,
    target: &CUSTOMER,
    foreign_key: &PROFILE_CUSTOMER_FK,
    direction: NavigationDirection::ToPrincipal,
    accessor: NavigationAccessor::Reference(&set_profile_customer),
    inverse: Some(&CUSTOMER_PROFILE),
};

// -----------------------------------------------------------------------------
// Accessors
// -----------------------------------------------------------------------------

fn add_customer_orders(target: &EntityRef, values: &[EntityRef]) -> Result<(), InternalError> {
    let customer = downcast_target::<Customer>(target, "Customer")?;
    for value in values {
        ensure_value::<Order>(value, "Order")?;
    }
    customer.orders.borrow_mut().extend(values.iter().cloned());

    Ok(())
}

fn set_order_customer(target: &EntityRef, value: &EntityRef) -> Result<(), InternalError> {
    let order = downcast_target::<Order>(target, "Order")?;
    ensure_value::<Customer>(value, "Customer")?;
    *order.customer.borrow_mut() = Some(value.clone());

    Ok(())
}

fn set_customer_profile(target: &EntityRef, value: &EntityRef) -> Result<(), InternalError> {
    let customer = downcast_target::<Customer>(target, "Customer")?;
    ensure_value::<Profile>(value, "Profile")?;
    *customer.profile.borrow_mut() = Some(value.clone());

    Ok(())
}

fn set_profile_customer(target: &EntityRef, value: &EntityRef) -> Result<(), InternalError> {
    let profile = downcast_target::<Profile>(target, "Profile")?;
    ensure_value::<Customer>(value, "Customer")?;
    *profile.customer.borrow_mut() = Some(value.clone());

    Ok(())
}

// -----------------------------------------------------------------------------
// Materializers
// -----------------------------------------------------------------------------

fn read_int(reader: &dyn ValueReader, slot: usize) -> Result<Option<i64>, InternalError> {
    Ok(reader.read_value(slot)?.as_int())
}

fn materialize_customer(reader: &dyn ValueReader) -> Result<EntityRef, InternalError> {
    Ok(EntityRef::new(Customer {
        id: read_int(reader, 0)?.unwrap_or_default(),
        name: reader
            .read_value(1)?
            .as_text()
            .unwrap_or_default()
            .to_string(),
        orders: RefCell::new(Vec::new()),
        profile: RefCell::new(None),
    }))
}

fn materialize_order(reader: &dyn ValueReader) -> Result<EntityRef, InternalError> {
    Ok(EntityRef::new(Order {
        id: read_int(reader, 0)?.unwrap_or_default(),
        customer_id: read_int(reader, 1)?,
        customer: RefCell::new(None),
    }))
}

fn materialize_profile(reader: &dyn ValueReader) -> Result<EntityRef, InternalError> {
    Ok(EntityRef::new(Profile {
        id: read_int(reader, 0)?.unwrap_or_default(),
        customer: RefCell::new(None),
    }))
}

pub(crate) fn registry() -> MaterializerRegistry {
    MaterializerRegistry::new()
        .with(&CUSTOMER, materialize_customer)
        .with(&ORDER, materialize_order)
        .with(&PROFILE, materialize_profile)
}

// -----------------------------------------------------------------------------
// Rows and buffers
// -----------------------------------------------------------------------------

pub(crate) fn customer_row(id: i64, name: &str) -> SharedReader {
    RowReader::shared([Value::Int(id), Value::from(name)])
}

pub(crate) fn order_row(id: i64, customer_id: Option<i64>) -> SharedReader {
    RowReader::shared([Value::Int(id), Value::from(customer_id), Value::Null])
}

pub(crate) fn profile_row(id: i64, customer_id: i64) -> SharedReader {
    RowReader::shared([Value::Int(id), Value::Int(customer_id)])
}

/// Row whose key columns are all null, as produced by a left outer join.
pub(crate) fn null_order_row() -> SharedReader {
    RowReader::shared([Value::Null, Value::Null, Value::Null])
}

pub(crate) struct Fixture {
    pub(crate) buffer: QueryBuffer,
    pub(crate) tracker: Rc<SnapshotStateManager>,
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(BufferConfig::default())
}

pub(crate) fn fixture_with(config: BufferConfig) -> Fixture {
    let tracker = Rc::new(SnapshotStateManager::new());
    let buffer = QueryBuffer::new(config, Rc::new(registry()), tracker.clone());

    Fixture { buffer, tracker }
}

pub(crate) fn customer(instance: &EntityRef) -> &Customer {
    instance.downcast_ref::<Customer>().expect("instance is a Customer")
}

pub(crate) fn order(instance: &EntityRef) -> &Order {
    instance.downcast_ref::<Order>().expect("instance is an Order")
}

pub(crate) fn profile(instance: &EntityRef) -> &Profile {
    instance.downcast_ref::<Profile>().expect("instance is a Profile")
}
