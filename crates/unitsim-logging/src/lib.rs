//! UnitSim logging facility
//!
//! - [`init`]: one-shot subscriber installation per [`Profile`]
//! - `log_op_start!` / `log_op_end!` / `log_op_error!`: canonical operation events
//! - [`test_capture`]: in-memory capture layer for asserting on emitted events
//! - [`sinks`]: the line-oriented [`DebugLogger`] capability the report formatter writes to

pub mod init;
pub mod macros;
pub mod sinks;
pub mod test_capture;

pub use init::{init, Profile};
pub use sinks::{BufferLogger, ConsoleLogger, DebugLogger, TracingLogger};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
    pub use unitsim_core_types::schema;
    pub use unitsim_errors::ExError;
}
