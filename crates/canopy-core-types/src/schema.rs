//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the resolver, the
//! lifecycle manager and the stores.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_PAGE_ID: &str = "page_id";
pub const FIELD_VERSION_ID: &str = "version_id";
pub const FIELD_WIDGET_ID: &str = "widget_id";
pub const FIELD_SLOT: &str = "slot";

// Resolution details
pub const FIELD_DEPTH: &str = "depth";
pub const FIELD_MODE: &str = "mode";
pub const FIELD_CHAIN_LEN: &str = "chain_len";
pub const FIELD_WIDGET_COUNT: &str = "widget_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
