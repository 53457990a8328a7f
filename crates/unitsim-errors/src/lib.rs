//! UnitSim error facility
//!
//! Two layers, kept in step:
//!
//! - [`SimError`]: the typed error every engine entry point returns
//! - [`ExError`] / [`ExErrorKind`]: the structured, code-stable view used by
//!   logging and by hosts that need to classify a failure programmatically

pub mod errors;

pub use errors::{BoxError, Cancelled, ExError, ExErrorKind, Result, SimError, Track};
