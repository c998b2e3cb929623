//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SESSION_ID: &str = "session_id";

// Comparison positions
pub const FIELD_PATH: &str = "path";
pub const FIELD_STEP: &str = "step";
pub const FIELD_DEPTH: &str = "depth";

// Outcome sizes
pub const FIELD_FAILURE_COUNT: &str = "failure_count";
pub const FIELD_ITEM_COUNT: &str = "item_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Lifecycle event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
