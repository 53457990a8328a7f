//! Difference detector output types.
//!
//! All types implement `Debug, Clone, Serialize, PartialEq`.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One step into a composite value
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Mapping key
    Key(String),
    /// Sequence position
    Index(usize),
}

/// Path from the compared value's root to a divergence.
///
/// Displays as `root`, `root.name` or `root.items[2]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
pub struct Location {
    pub segments: Vec<Segment>,
}

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend this location by one mapping key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Extend this location by one sequence index
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// What kind of divergence was found at a location
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Same shape, different scalar (or opaque) value
    ValueMismatch,
    /// The two sides hold different JSON types (e.g. number vs string)
    TypeMismatch,
    /// Sequences of different length; reported at the sequence itself
    LengthMismatch { expected_len: usize, actual_len: usize },
    /// Key present in the expected mapping only
    MissingInActual,
    /// Key present in the actual mapping only
    UnexpectedInActual,
}

/// A single divergence record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Difference {
    pub location: Location,
    pub kind: DifferenceKind,
    /// Expected sub-value; `None` when the key only exists in actual
    pub expected: Option<Value>,
    /// Actual sub-value; `None` when the key only exists in expected
    pub actual: Option<Value>,
}

impl Difference {
    pub fn value_mismatch(location: Location, expected: Value, actual: Value) -> Self {
        Self {
            location,
            kind: DifferenceKind::ValueMismatch,
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    pub fn type_mismatch(location: Location, expected: Value, actual: Value) -> Self {
        Self {
            location,
            kind: DifferenceKind::TypeMismatch,
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    pub fn length_mismatch(location: Location, expected: &[Value], actual: &[Value]) -> Self {
        Self {
            location,
            kind: DifferenceKind::LengthMismatch {
                expected_len: expected.len(),
                actual_len: actual.len(),
            },
            expected: Some(Value::Array(expected.to_vec())),
            actual: Some(Value::Array(actual.to_vec())),
        }
    }

    pub fn missing_in_actual(location: Location, expected: Value) -> Self {
        Self {
            location,
            kind: DifferenceKind::MissingInActual,
            expected: Some(expected),
            actual: None,
        }
    }

    pub fn unexpected_in_actual(location: Location, actual: Value) -> Self {
        Self {
            location,
            kind: DifferenceKind::UnexpectedInActual,
            expected: None,
            actual: Some(actual),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn show(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "<absent>".to_string())
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DifferenceKind::ValueMismatch => write!(
                f,
                "{}: expected {}, actual {}",
                self.location,
                show(&self.expected),
                show(&self.actual)
            ),
            DifferenceKind::TypeMismatch => {
                let expected_type = self.expected.as_ref().map(type_name).unwrap_or("absent");
                let actual_type = self.actual.as_ref().map(type_name).unwrap_or("absent");
                write!(
                    f,
                    "{}: type mismatch, expected {} ({}), actual {} ({})",
                    self.location,
                    show(&self.expected),
                    expected_type,
                    show(&self.actual),
                    actual_type
                )
            }
            DifferenceKind::LengthMismatch {
                expected_len,
                actual_len,
            } => write!(
                f,
                "{}: length mismatch, expected {}, actual {}",
                self.location, expected_len, actual_len
            ),
            DifferenceKind::MissingInActual => write!(
                f,
                "{}: missing in actual, expected {}",
                self.location,
                show(&self.expected)
            ),
            DifferenceKind::UnexpectedInActual => write!(
                f,
                "{}: unexpected in actual, actual {}",
                self.location,
                show(&self.actual)
            ),
        }
    }
}

/// Ordered divergence records for one comparison; empty when the values are equal.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DifferenceGroup {
    records: Vec<Difference>,
}

impl DifferenceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Difference) {
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Difference> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Difference] {
        &self.records
    }

    /// First record at exactly `location`, if any
    pub fn at(&self, location: &Location) -> Option<&Difference> {
        self.records.iter().find(|r| &r.location == location)
    }

    /// One rendered line per record
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }
}

impl From<Vec<Difference>> for DifferenceGroup {
    fn from(records: Vec<Difference>) -> Self {
        Self { records }
    }
}

impl IntoIterator for DifferenceGroup {
    type Item = Difference;
    type IntoIter = std::vec::IntoIter<Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a DifferenceGroup {
    type Item = &'a Difference;
    type IntoIter = std::slice::Iter<'a, Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for DifferenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::root().to_string(), "root");
        assert_eq!(
            Location::root().key("items").index(2).key("name").to_string(),
            "root.items[2].name"
        );
    }

    #[test]
    fn test_difference_display_formats() {
        let value = Difference::value_mismatch(Location::root().key("a"), json!("b"), json!("c"));
        assert_eq!(value.to_string(), r#"root.a: expected "b", actual "c""#);

        let ty = Difference::type_mismatch(Location::root(), json!(1), json!("1"));
        assert_eq!(
            ty.to_string(),
            r#"root: type mismatch, expected 1 (number), actual "1" (string)"#
        );

        let len = Difference::length_mismatch(
            Location::root().key("xs"),
            &[json!(1), json!(2)],
            &[json!(1)],
        );
        assert_eq!(len.to_string(), "root.xs: length mismatch, expected 2, actual 1");

        let missing = Difference::missing_in_actual(Location::root().key("k"), json!(true));
        assert_eq!(missing.to_string(), "root.k: missing in actual, expected true");

        let extra = Difference::unexpected_in_actual(Location::root().key("z"), json!(null));
        assert_eq!(extra.to_string(), "root.z: unexpected in actual, actual null");
    }

    #[test]
    fn test_group_display_one_line_per_record() {
        let group = DifferenceGroup::from(vec![
            Difference::value_mismatch(Location::root().index(0), json!(1), json!(2)),
            Difference::value_mismatch(Location::root().index(1), json!(3), json!(4)),
        ]);
        assert_eq!(
            group.to_string(),
            "root[0]: expected 1, actual 2\nroot[1]: expected 3, actual 4"
        );
        assert_eq!(group.lines().len(), 2);
    }

    #[test]
    fn test_group_lookup_by_location() {
        let group = DifferenceGroup::from(vec![Difference::missing_in_actual(
            Location::root().key("gone"),
            json!(1),
        )]);
        assert!(group.at(&Location::root().key("gone")).is_some());
        assert!(group.at(&Location::root()).is_none());
    }
}
