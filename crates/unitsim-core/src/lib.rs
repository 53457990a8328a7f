//! UnitSim Core - deferred expectation/actual assertion engine
//!
//! A test registers a producer for the value it expects and a producer for
//! the value it observes, in either order, and resolves both at one
//! evaluation point. On mismatch the engine computes a structural
//! [`DifferenceGroup`], writes an aligned report through a [`DebugLogger`],
//! and fails with [`SimError::AssertionMismatch`].
//!
//! - [`UnitSim`]: blocking engine
//! - [`CoUnitSim`]: suspending engine, bridged onto a call-scoped runtime
//! - [`JsonCodec`]: canonical JSON for `expect_json` / `whenever_json`
//! - [`find_differences`]: structural difference detector
//! - [`DebugLogging`]: report formatter
//!
//! ```
//! use unitsim_core::test;
//!
//! test(|sim| {
//!     sim.expect(|| vec![1, 2, 3]);
//!     sim.whenever(|| (1..=3).collect::<Vec<i32>>());
//! });
//! ```

pub mod cancel;
pub mod co_sim;
pub mod config;
pub mod diff;
pub mod json;
pub mod render;
pub mod report;
pub mod sim;
mod verdict;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use co_sim::{test_blocking, try_test_blocking, CoUnitSim};
pub use config::SimConfig;
pub use diff::{find_differences, DiffChecker, Difference, DifferenceGroup, StructuralDiffChecker};
pub use json::{canonicalize, JsonCodec, SerdeJsonCodec};
pub use report::DebugLogging;
pub use sim::{test, try_test, UnitSim};
pub use unitsim_errors::{Cancelled, ExError, ExErrorKind, Result, SimError, Track};
pub use unitsim_logging::{BufferLogger, ConsoleLogger, DebugLogger, TracingLogger};
