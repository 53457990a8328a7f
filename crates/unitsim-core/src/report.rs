//! Failure report formatter.
//!
//! Turns an expected/actual pair into report lines and writes them to a
//! [`DebugLogger`]. Two layouts exist:
//!
//! ```text
//! EXPECT: <expected>
//! ACTUAL: <actual>
//! ```
//!
//! and, when the assertion has a title, a header line followed by an aligned
//! two-column block (see [`DebugLogging::make_horizontal_logs`]):
//!
//! ```text
//! FAILED <title>
//! EXPECT       |ACTUAL
//! Ready set    |Go
//! ```

use crate::diff::engine::find_differences_lossy;
use crate::diff::{DiffChecker, DifferenceGroup, StructuralDiffChecker};
use crate::render::{describe, describe_opt};
use serde::Serialize;
use std::sync::Arc;
use unitsim_logging::{DebugLogger, TracingLogger};

const EXPECT_HEADER: &str = "EXPECT";
const ACTUAL_HEADER: &str = "ACTUAL";
const COLUMN_SEPARATOR: char = '|';
/// Padding added after an expected value wider than the header
const COLUMN_GAP: usize = 4;

/// Width of the expected column for an expected value of `expected_len` chars.
///
/// The header width when the value fits under it, otherwise the value
/// width plus [`COLUMN_GAP`].
pub fn column_width(expected_len: usize) -> usize {
    let header_len = EXPECT_HEADER.len();
    if expected_len <= header_len {
        header_len
    } else {
        expected_len + COLUMN_GAP
    }
}

/// Writes assertion reports through a logger, using a diff checker for the
/// difference listing
#[derive(Clone)]
pub struct DebugLogging {
    logger: Arc<dyn DebugLogger>,
    diff_checker: Arc<dyn DiffChecker>,
}

impl std::fmt::Debug for DebugLogging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLogging").finish_non_exhaustive()
    }
}

impl Default for DebugLogging {
    fn default() -> Self {
        Self::with_logger(Arc::new(TracingLogger::new()))
    }
}

impl DebugLogging {
    pub fn new(logger: Arc<dyn DebugLogger>, diff_checker: Arc<dyn DiffChecker>) -> Self {
        Self {
            logger,
            diff_checker,
        }
    }

    /// Formatter over `logger` with the structural diff checker
    pub fn with_logger(logger: Arc<dyn DebugLogger>) -> Self {
        Self::new(logger, Arc::new(StructuralDiffChecker))
    }

    pub fn logger(&self) -> &Arc<dyn DebugLogger> {
        &self.logger
    }

    pub fn diff_checker(&self) -> &Arc<dyn DiffChecker> {
        &self.diff_checker
    }

    /// Log an expected/actual pair.
    ///
    /// Without a title this writes `EXPECT: ..` and `ACTUAL: ..`. With a title
    /// it writes `FAILED <title>` followed by the horizontal block. The header
    /// does not depend on `_failed`.
    pub fn log_assertion<T: Serialize + ?Sized>(
        &self,
        expected: Option<&T>,
        actual: Option<&T>,
        title: Option<&str>,
        _failed: bool,
    ) {
        match title {
            None => {
                self.logger
                    .log(&format!("{}: {}", EXPECT_HEADER, describe_opt(expected)));
                self.logger
                    .log(&format!("{}: {}", ACTUAL_HEADER, describe_opt(actual)));
            }
            Some(title) => {
                self.logger.log(&format!("FAILED {}", title));
                self.logger
                    .log(&self.make_horizontal_logs(&expected, &actual));
            }
        }
    }

    /// Render the two-row, two-column block with the `|` separators aligned.
    pub fn make_horizontal_logs<E, A>(&self, expected: &E, actual: &A) -> String
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        let expected = describe(expected);
        let actual = describe(actual);
        let width = column_width(expected.chars().count());
        format!(
            "{:<width$}{sep}{}\n{:<width$}{sep}{}",
            EXPECT_HEADER,
            ACTUAL_HEADER,
            expected,
            actual,
            width = width,
            sep = COLUMN_SEPARATOR,
        )
    }

    /// Run the diff checker over both values; does not log
    pub fn find_differences<E, A>(&self, expected: &E, actual: &A) -> DifferenceGroup
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        find_differences_lossy(self.diff_checker.as_ref(), expected, actual)
    }

    /// Run the diff checker and log what it found
    pub fn log_differences<E, A>(&self, expected: &E, actual: &A) -> DifferenceGroup
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        let group = self.find_differences(expected, actual);
        self.log_difference_group(&group);
        group
    }

    /// Log an already computed group: a count line, then one line per record
    pub fn log_difference_group(&self, group: &DifferenceGroup) {
        self.logger
            .log(&format!("DIFFERENCES ({})", group.len()));
        for record in group {
            self.logger.log(&format!("  - {}", record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::engine::MockDiffChecker;
    use crate::diff::{Difference, Location};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;
    use unitsim_logging::BufferLogger;

    mockall::mock! {
        pub Logger {}
        impl DebugLogger for Logger {
            fn log(&self, line: &str);
        }
    }

    fn relaxed_checker() -> Arc<dyn DiffChecker> {
        let mut checker = MockDiffChecker::new();
        checker
            .expect_find_differences()
            .returning(|_, _| DifferenceGroup::new());
        Arc::new(checker)
    }

    #[test]
    fn test_log_assertion_defaults_to_null_markers() {
        let mut logger = MockLogger::new();
        let mut seq = Sequence::new();
        logger
            .expect_log()
            .with(eq("EXPECT: null"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        logger
            .expect_log()
            .with(eq("ACTUAL: null"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let logging = DebugLogging::new(Arc::new(logger), relaxed_checker());
        logging.log_assertion::<i32>(None, None, None, true);
    }

    #[test]
    fn test_log_assertion_with_title_logs_header_then_horizontal_block() {
        let mut logger = MockLogger::new();
        let mut seq = Sequence::new();
        logger
            .expect_log()
            .with(eq("FAILED Test"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        logger
            .expect_log()
            .with(eq("EXPECT|ACTUAL\n1     |2"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let logging = DebugLogging::new(Arc::new(logger), relaxed_checker());
        logging.log_assertion(Some(&1), Some(&2), Some("Test"), true);
    }

    #[test]
    fn test_log_assertion_header_ignores_failed_flag() {
        for failed in [true, false] {
            let buffer = BufferLogger::new();
            let logging = DebugLogging::with_logger(Arc::new(buffer.clone()));
            logging.log_assertion(Some(&1), Some(&2), Some("Test"), failed);
            assert_eq!(
                buffer.lines(),
                vec!["FAILED Test".to_string(), "EXPECT|ACTUAL\n1     |2".to_string()]
            );
        }
    }

    #[test]
    fn test_log_differences_calls_diff_checker() {
        let mut checker = MockDiffChecker::new();
        checker
            .expect_find_differences()
            .with(eq(json!("first")), eq(json!("second")))
            .times(1)
            .returning(|e, a| {
                DifferenceGroup::from(vec![Difference::value_mismatch(
                    Location::root(),
                    e.clone(),
                    a.clone(),
                )])
            });

        let buffer = BufferLogger::new();
        let logging = DebugLogging::new(Arc::new(buffer.clone()), Arc::new(checker));
        let group = logging.log_differences("first", "second");

        assert_eq!(group.len(), 1);
        assert_eq!(
            buffer.lines(),
            vec![
                "DIFFERENCES (1)".to_string(),
                r#"  - root: expected "first", actual "second""#.to_string(),
            ]
        );
    }

    #[test]
    fn test_make_horizontal_logs_narrow_values() {
        let logging = DebugLogging::default();
        let result = logging.make_horizontal_logs(&1, &2);
        assert_eq!(result, "EXPECT|ACTUAL\n1     |2");
    }

    #[test]
    fn test_make_horizontal_logs_wide_expected_adds_gap() {
        let logging = DebugLogging::default();
        let result = logging.make_horizontal_logs("Ready set", "Go");
        assert_eq!(result, "EXPECT       |ACTUAL\nReady set    |Go");
    }

    #[test]
    fn test_column_width_boundary() {
        assert_eq!(column_width(0), 6);
        assert_eq!(column_width(6), 6);
        assert_eq!(column_width(7), 11);
    }
}
