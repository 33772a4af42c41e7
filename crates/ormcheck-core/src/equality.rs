//! Structural equality oracle
//!
//! Every record type compares itself field by field and reports the first
//! difference as a path (`SubTypes[1].Name`, `StringMap["Key0"]`) with both
//! renderings, so a failed round trip says exactly what changed.
//!
//! Scalars compare with `==`. For floats this is IEEE equality: no epsilon,
//! and NaN never equals itself.

use std::collections::BTreeMap;
use std::fmt::Debug;

/// First difference found between an expected and an actual value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl FieldMismatch {
    pub fn new(field: impl Into<String>, expected: &dyn Debug, actual: &dyn Debug) -> Self {
        Self {
            field: field.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Prefix the path with the enclosing field, e.g. `Name` → `SubType.Name`
    pub fn within(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }

    /// Top-level column the path starts at
    pub fn root(&self) -> &str {
        let end = self
            .field
            .find(|c| c == '.' || c == '[')
            .unwrap_or(self.field.len());
        &self.field[..end]
    }
}

impl std::fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {} but got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Field-by-field equality with diagnostics
pub trait StructuralEq {
    /// The first field that differs, in declaration order
    fn first_mismatch(&self, other: &Self) -> Option<FieldMismatch>;

    fn structural_equals(&self, other: &Self) -> bool {
        self.first_mismatch(other).is_none()
    }
}

pub fn structural_equals<T: StructuralEq>(a: &T, b: &T) -> bool {
    a.structural_equals(b)
}

/// Scalar comparison by value
pub fn compare<T: PartialEq + Debug>(
    field: &str,
    expected: &T,
    actual: &T,
) -> Option<FieldMismatch> {
    (expected != actual).then(|| FieldMismatch::new(field, expected, actual))
}

/// Sequence comparison: equal length, then pairwise in order
pub fn compare_seq<T: PartialEq + Debug>(
    field: &str,
    expected: &[T],
    actual: &[T],
) -> Option<FieldMismatch> {
    if expected.len() != actual.len() {
        return Some(FieldMismatch {
            field: format!("{}.len", field),
            expected: expected.len().to_string(),
            actual: actual.len().to_string(),
        });
    }
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (e, a))| e != a)
        .map(|(i, (e, a))| FieldMismatch::new(format!("{}[{}]", field, i), e, a))
}

/// Mapping comparison: equal key sets, then equal value per key
pub fn compare_map<K: Ord + Debug, V: PartialEq + Debug>(
    field: &str,
    expected: &BTreeMap<K, V>,
    actual: &BTreeMap<K, V>,
) -> Option<FieldMismatch> {
    let expected_keys: Vec<_> = expected.keys().collect();
    let actual_keys: Vec<_> = actual.keys().collect();
    if expected_keys != actual_keys {
        return Some(FieldMismatch::new(
            format!("{}.keys", field),
            &expected_keys,
            &actual_keys,
        ));
    }
    expected
        .iter()
        .find(|(k, v)| actual.get(*k) != Some(*v))
        .and_then(|(k, v)| {
            actual
                .get(k)
                .map(|a| FieldMismatch::new(format!("{}[{:?}]", field, k), v, a))
        })
}

/// Nested record comparison
pub fn compare_nested<T: StructuralEq>(
    field: &str,
    expected: &T,
    actual: &T,
) -> Option<FieldMismatch> {
    expected.first_mismatch(actual).map(|m| m.within(field))
}

/// Sequence of nested records: equal length, then recursive per element
pub fn compare_nested_seq<T: StructuralEq>(
    field: &str,
    expected: &[T],
    actual: &[T],
) -> Option<FieldMismatch> {
    if expected.len() != actual.len() {
        return Some(FieldMismatch {
            field: format!("{}.len", field),
            expected: expected.len().to_string(),
            actual: actual.len().to_string(),
        });
    }
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .find_map(|(i, (e, a))| compare_nested(&format!("{}[{}]", field, i), e, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_equality_is_exact() {
        assert!(compare("F", &0.1f64, &0.1f64).is_none());
        assert!(compare("F", &0.1f64, &(0.1f64 + f64::EPSILON)).is_some());
        assert!(compare("F", &f64::NAN, &f64::NAN).is_some());
    }

    #[test]
    fn test_sequence_reports_index() {
        let m = compare_seq("IntArray", &[1, 2], &[1, 3]).unwrap();
        assert_eq!(m.field, "IntArray[1]");
        assert_eq!(m.expected, "2");
        assert_eq!(m.actual, "3");
        assert_eq!(m.root(), "IntArray");
    }

    #[test]
    fn test_sequence_reports_length() {
        let m = compare_seq("IntArray", &[1, 2], &[1]).unwrap();
        assert_eq!(m.field, "IntArray.len");
    }

    #[test]
    fn test_map_key_set_and_values() {
        let mut a = BTreeMap::new();
        a.insert("Key0".to_string(), "Value0".to_string());
        let mut b = a.clone();
        assert!(compare_map("StringMap", &a, &b).is_none());

        b.insert("Key0".to_string(), "Other".to_string());
        let m = compare_map("StringMap", &a, &b).unwrap();
        assert_eq!(m.field, "StringMap[\"Key0\"]");

        b.insert("Key1".to_string(), "Value1".to_string());
        let m = compare_map("StringMap", &a, &b).unwrap();
        assert_eq!(m.field, "StringMap.keys");
    }
}
