//! Structural difference detector.
//!
//! Compares an expected and an actual value and describes where they
//! diverge, for the failure report.
//!
//! ## Entry point
//!
//! ```
//! use unitsim_core::diff::find_differences;
//! use std::collections::{BTreeMap, HashMap};
//!
//! let expected: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
//! let actual: BTreeMap<&str, i32> = [("a", 1), ("b", 3)].into_iter().collect();
//!
//! let group = find_differences(&expected, &actual).unwrap();
//! assert_eq!(group.len(), 1);
//! assert_eq!(group.iter().next().unwrap().location.to_string(), "root.b");
//! ```
//!
//! ## Guarantees
//!
//! - **Structural**: values are compared through their serde form, so two
//!   containers of different concrete types with equal contents are equal.
//! - **Exact scalars**: no tolerance is applied to numbers.
//! - **Determinism**: mapping keys are visited in sorted order, so output
//!   does not depend on hash iteration order.

pub mod engine;
pub mod model;

pub use engine::{find_differences, DiffChecker, StructuralDiffChecker};
pub use model::{Difference, DifferenceGroup, DifferenceKind, Location, Segment};
