//! Difference detection over the structural (serde) form of two values.
//!
//! The core entry point is [`find_differences`]; [`DiffChecker`] is the seam
//! the report formatter calls through so tests can substitute it.

use crate::diff::model::{Difference, DifferenceGroup, Location, Segment};
use crate::render::lift;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use unitsim_errors::Result;

/// Computes where two structural values diverge
#[cfg_attr(test, mockall::automock)]
pub trait DiffChecker: Send + Sync {
    fn find_differences(&self, expected: &Value, actual: &Value) -> DifferenceGroup;
}

/// Recursive position-by-position / key-by-key comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralDiffChecker;

impl DiffChecker for StructuralDiffChecker {
    fn find_differences(&self, expected: &Value, actual: &Value) -> DifferenceGroup {
        let mut path = Vec::new();
        let mut out = DifferenceGroup::new();
        walk(&mut path, expected, actual, &mut out);
        out
    }
}

fn same_type(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn walk(path: &mut Vec<Segment>, expected: &Value, actual: &Value, out: &mut DifferenceGroup) {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            let keys: BTreeSet<&String> = e.keys().chain(a.keys()).collect();
            for key in keys {
                path.push(Segment::Key(key.clone()));
                match (e.get(key), a.get(key)) {
                    (Some(ev), Some(av)) => walk(path, ev, av, out),
                    (Some(ev), None) => out.push(Difference::missing_in_actual(
                        Location::new(path.clone()),
                        ev.clone(),
                    )),
                    (None, Some(av)) => out.push(Difference::unexpected_in_actual(
                        Location::new(path.clone()),
                        av.clone(),
                    )),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                out.push(Difference::length_mismatch(Location::new(path.clone()), e, a));
            }
            for (index, (ev, av)) in e.iter().zip(a.iter()).enumerate() {
                path.push(Segment::Index(index));
                walk(path, ev, av, out);
                path.pop();
            }
        }
        (e, a) if !same_type(e, a) => out.push(Difference::type_mismatch(
            Location::new(path.clone()),
            e.clone(),
            a.clone(),
        )),
        (e, a) => {
            if e != a {
                out.push(Difference::value_mismatch(
                    Location::new(path.clone()),
                    e.clone(),
                    a.clone(),
                ));
            }
        }
    }
}

/// Find the differences between any two serializable values.
///
/// # Errors
///
/// - `Render` — either value cannot be represented structurally
pub fn find_differences<E, A>(expected: &E, actual: &A) -> Result<DifferenceGroup>
where
    E: Serialize + ?Sized,
    A: Serialize + ?Sized,
{
    let expected = serde_json::to_value(expected)?;
    let actual = serde_json::to_value(actual)?;
    Ok(StructuralDiffChecker.find_differences(&expected, &actual))
}

/// Like [`find_differences`], but values that cannot be serialized are
/// compared by their error text instead of failing.
pub(crate) fn find_differences_lossy<E, A>(
    checker: &dyn DiffChecker,
    expected: &E,
    actual: &A,
) -> DifferenceGroup
where
    E: Serialize + ?Sized,
    A: Serialize + ?Sized,
{
    checker.find_differences(&lift(expected), &lift(actual))
}
