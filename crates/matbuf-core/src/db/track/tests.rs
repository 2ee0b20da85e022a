use super::*;
use crate::{
    db::reader::RowReader,
    error::{ErrorClass, ErrorOrigin},
    test_support::{
        CUSTOMER, CUSTOMER_FIELDS, ORDER, ORDER_CUSTOMER_FK, PROFILE_CUSTOMER_FK, customer_row,
        order_row,
    },
};

fn tracked_order(tracker: &SnapshotStateManager, id: i64, customer_id: Option<i64>) -> EntityRef {
    let instance = EntityRef::new(id);
    tracker
        .start_tracking(&ORDER, &instance, &order_row(id, customer_id))
        .unwrap();

    instance
}

#[test]
fn start_tracking_indexes_by_key_and_instance() {
    let tracker = SnapshotStateManager::new();
    let instance = tracked_order(&tracker, 10, Some(1));

    let by_key = tracker
        .entry_by_key(&EntityKey::simple("Order", 10_i64))
        .unwrap();
    assert!(by_key.instance().ptr_eq(&instance));
    assert!(tracker.entry_by_instance(&instance).is_some());
    assert_eq!(tracker.len(), 1);
}

#[test]
fn start_tracking_is_idempotent_per_instance() {
    let tracker = SnapshotStateManager::new();
    let instance = tracked_order(&tracker, 10, Some(1));

    tracker
        .start_tracking(&ORDER, &instance, &order_row(10, Some(1)))
        .unwrap();

    assert_eq!(tracker.len(), 1);
}

#[test]
fn second_instance_for_same_identity_is_rejected() {
    let tracker = SnapshotStateManager::new();
    tracked_order(&tracker, 10, Some(1));

    let err = tracker
        .start_tracking(&ORDER, &EntityRef::new(()), &order_row(10, Some(1)))
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Tracker);
}

#[test]
fn keyless_row_cannot_be_tracked() {
    let tracker = SnapshotStateManager::new();
    let row: SharedReader = Rc::new(RowReader::new(vec![Value::Null, Value::Null]));

    let err = tracker
        .start_tracking(&CUSTOMER, &EntityRef::new(()), &row)
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::InvalidArgument);
}

#[test]
fn current_values_diverge_from_original_snapshot() {
    let tracker = SnapshotStateManager::new();
    let instance = EntityRef::new(());
    tracker
        .start_tracking(&CUSTOMER, &instance, &customer_row(1, "ada"))
        .unwrap();

    let name = &CUSTOMER_FIELDS[1];
    let entry = tracker.snapshot(&instance).unwrap();
    entry.set_current_value(name, "grace").unwrap();

    assert_eq!(entry.property_value(name).unwrap(), Value::from("grace"));
    assert_eq!(entry.original_value(name).unwrap(), Value::from("ada"));
}

#[test]
fn dependent_key_is_tagged_with_principal() {
    let tracker = SnapshotStateManager::new();
    let instance = tracked_order(&tracker, 10, Some(3));
    let entry = tracker.entry_by_instance(&instance).unwrap();

    assert_eq!(
        entry.dependent_key(&ORDER_CUSTOMER_FK).unwrap(),
        Some(EntityKey::simple("Customer", 3_i64))
    );
    assert_eq!(
        entry.primary_key().unwrap(),
        Some(EntityKey::simple("Order", 10_i64))
    );
}

#[test]
fn dependent_key_with_null_foreign_key_is_none() {
    let tracker = SnapshotStateManager::new();
    let instance = tracked_order(&tracker, 10, None);
    let entry = tracker.entry_by_instance(&instance).unwrap();

    assert_eq!(entry.dependent_key(&ORDER_CUSTOMER_FK).unwrap(), None);
}

#[test]
fn dependent_key_rejects_foreign_key_of_other_entity() {
    let tracker = SnapshotStateManager::new();
    let instance = tracked_order(&tracker, 10, Some(3));
    let entry = tracker.entry_by_instance(&instance).unwrap();

    let err = entry.dependent_key(&PROFILE_CUSTOMER_FK).unwrap_err();
    assert_eq!(err.class, ErrorClass::InvalidArgument);
}
