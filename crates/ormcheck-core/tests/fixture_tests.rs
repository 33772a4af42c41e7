#![allow(clippy::unwrap_used, clippy::expect_used)]

use ormcheck_core::fixture::{create_fixture, create_fixtures, fixture_guid, CALENDAR_CYCLE};
use ormcheck_core::model::SubType;
use ormcheck_core::{structural_equals, StructuralEq};
use proptest::prelude::*;

#[test]
fn test_seed_zero_values() {
    // Given: seed 0
    let f = create_fixture(0);

    // Then: the documented values come out
    assert_eq!(f.id, 1);
    assert_eq!(f.byte, 3);
    assert_eq!(f.string, "String0");
    assert_eq!(f.string_array, vec!["0".to_string()]);
    assert_eq!(f.sub_type, SubType::new(0, "Name0"));
    assert_eq!(
        f.sub_types,
        vec![SubType::new(0, "Name0"), SubType::new(1, "Name1")]
    );
    assert_eq!(f.string_map.get("Key0").map(String::as_str), Some("Value0"));
    assert_eq!(f.int_string_map.get(&0).map(String::as_str), Some("Value0"));
}

#[test]
fn test_fixture_is_pure() {
    assert!(structural_equals(&create_fixture(42), &create_fixture(42)));
}

#[test]
fn test_adjacent_fixtures_differ_first_at_id() {
    let m = create_fixture(0)
        .first_mismatch(&create_fixture(1))
        .unwrap();
    assert_eq!(m.field, "Id");
    assert_eq!(m.expected, "1");
    assert_eq!(m.actual, "2");
}

#[test]
fn test_seeds_one_cycle_apart_still_differ() {
    // Calendar fields repeat, the record does not
    let a = create_fixture(7);
    let b = create_fixture(7 + CALENDAR_CYCLE);
    assert_eq!(a.date_time, b.date_time);
    assert!(!structural_equals(&a, &b));
}

#[test]
fn test_guid_is_seed_derived() {
    assert_eq!(create_fixture(9).guid, fixture_guid(9));
    assert_ne!(fixture_guid(9), fixture_guid(10));
    assert_eq!(fixture_guid(-1).get_version_num(), 8);
}

#[test]
fn test_create_fixtures_counts_from_zero() {
    let rows = create_fixtures(3);
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

proptest! {
    #[test]
    fn prop_distinct_seeds_give_distinct_records(i in any::<i32>(), j in any::<i32>()) {
        prop_assume!(i != j);
        prop_assert!(!structural_equals(&create_fixture(i), &create_fixture(j)));
    }

    #[test]
    fn prop_fixture_is_total(seed in any::<i32>()) {
        let f = create_fixture(seed);
        prop_assert_eq!(f.string, format!("String{}", seed));
        prop_assert_eq!(f.char_array.len(), 2);
        prop_assert!(f.custom_text.chars().count() <= 100);
    }
}
