//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SIM_ID: &str = "sim_id";

// Assertion context
pub const FIELD_TITLE: &str = "title";
pub const FIELD_TRACK: &str = "track";
pub const FIELD_LINE: &str = "line";
pub const FIELD_DIFF_COUNT: &str = "diff_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_REPORT: &str = "report";

// Canonical operation names
pub const OP_EVALUATE: &str = "evaluate";
pub const OP_CO_EVALUATE: &str = "co_evaluate";
pub const OP_REPORT: &str = "report";
