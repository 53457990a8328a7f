//! Comparison step shared by both engines.

use crate::diff::{Difference, Location};
use crate::render::{describe_value, lift};
use crate::report::DebugLogging;
use serde::Serialize;
use std::time::Instant;
use unitsim_core_types::SimId;
use unitsim_errors::{Result, SimError};
use unitsim_logging::log_op_error;

/// Per-engine settings the comparison step reads
pub(crate) struct Verdict<'a> {
    pub op: &'static str,
    pub sim_id: &'a SimId,
    pub title: Option<&'a str>,
    pub logging: &'a DebugLogging,
    pub log_differences: bool,
    pub started: Instant,
}

impl Verdict<'_> {
    /// Succeed silently on equality; otherwise report and fail with a mismatch.
    pub fn judge<T: PartialEq + Serialize>(&self, expected: &T, actual: &T) -> Result<()> {
        if expected == actual {
            return Ok(());
        }

        let expected_value = lift(expected);
        let actual_value = lift(actual);
        let mut differences = self
            .logging
            .diff_checker()
            .find_differences(&expected_value, &actual_value);
        if differences.is_empty() {
            // `PartialEq` disagrees with the structural form; still name the root.
            differences.push(Difference::value_mismatch(
                Location::root(),
                expected_value.clone(),
                actual_value.clone(),
            ));
        }

        self.logging
            .log_assertion(Some(expected), Some(actual), self.title, false);
        if self.log_differences {
            self.logging.log_difference_group(&differences);
        }

        let err = SimError::AssertionMismatch {
            title: self.title.map(str::to_string),
            expected: describe_value(&expected_value),
            actual: describe_value(&actual_value),
            differences: differences.lines(),
        };
        let duration_ms = self.started.elapsed().as_millis() as u64;
        log_op_error!(
            self.op,
            err,
            duration_ms = duration_ms,
            sim_id = self.sim_id.as_str(),
            diff_count = differences.len() as u64,
        );
        Err(err)
    }
}
