use canopy_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::VersionStatus;

/// Result type alias using CanopyError
pub type Result<T> = std::result::Result<T, CanopyError>;

/// Result type alias for store and engine boundaries
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error surfaced by the engine maps to one of these kinds, and each
/// kind maps to a stable error code usable by callers, tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup
    NotFound,
    AlreadyExists,

    // Lifecycle
    InvalidTransition,
    InconsistentState,

    // Structural/Validation
    InvalidInput,
    CapacityExceeded,
    CycleDetected,
    TraversalBroken,
    DeterminismViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidTransition => "ERR_INVALID_TRANSITION",
            ExErrorKind::InconsistentState => "ERR_INCONSISTENT_STATE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::CapacityExceeded => "ERR_CAPACITY_EXCEEDED",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::TraversalBroken => "ERR_TRAVERSAL_BROKEN",
            ExErrorKind::DeterminismViolation => "ERR_DETERMINISM_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the page,
/// version, widget and slot context needed to debug a failed operation.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    page_id: Option<String>,
    version_id: Option<String>,
    widget_id: Option<String>,
    slot: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            page_id: None,
            version_id: None,
            widget_id: None,
            slot: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add page ID context
    pub fn with_page_id(mut self, id: impl Into<String>) -> Self {
        self.page_id = Some(id.into());
        self
    }

    /// Add version ID context
    pub fn with_version_id(mut self, id: impl Into<String>) -> Self {
        self.version_id = Some(id.into());
        self
    }

    /// Add widget ID context
    pub fn with_widget_id(mut self, id: impl Into<String>) -> Self {
        self.widget_id = Some(id.into());
        self
    }

    /// Add slot name context
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the page ID context, if any
    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    /// Get the version ID context, if any
    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// Get the widget ID context, if any
    pub fn widget_id(&self) -> Option<&str> {
        self.widget_id.as_deref()
    }

    /// Get the slot context, if any
    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(page_id) = &self.page_id {
            write!(f, " (page_id: {})", page_id)?;
        }
        if let Some(version_id) = &self.version_id {
            write!(f, " (version_id: {})", version_id)?;
        }
        if let Some(widget_id) = &self.widget_id {
            write!(f, " (widget_id: {})", widget_id)?;
        }
        if let Some(slot) = &self.slot {
            write!(f, " (slot: {})", slot)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for Canopy operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanopyError {
    // ===== Lookup Errors =====
    /// Page not found in the hierarchy store
    #[error("Page not found: {page_id}")]
    PageNotFound { page_id: String },

    /// Parent page referenced on creation does not exist
    #[error("Parent page not found: {page_id}")]
    ParentNotFound { page_id: String },

    /// Version not found in the version store
    #[error("Version not found: {version_id}")]
    VersionNotFound { version_id: String },

    /// No slot policy registered for a layout/slot pair
    #[error("Slot policy not found: layout={layout_id}, slot={slot_name}")]
    SlotPolicyNotFound {
        layout_id: String,
        slot_name: String,
    },

    /// Page id already taken
    #[error("Page already exists: {page_id}")]
    PageAlreadyExists { page_id: String },

    // ===== Hierarchy Errors =====
    /// Parent pointers loop back onto a page already visited
    #[error("Cycle detected in ancestor chain of page {page_id}")]
    CycleDetected { page_id: String },

    /// A parent pointer references a page that does not exist
    #[error("Ancestor chain broken at page {page_id}: parent {parent_id} does not exist")]
    AncestorChainBroken { page_id: String, parent_id: String },

    // ===== Lifecycle Errors =====
    /// Requested lifecycle transition is not legal from the current status
    #[error("Cannot {action} version {version_id}: status is {status}")]
    InvalidTransition {
        version_id: String,
        status: VersionStatus,
        action: String,
    },

    /// New versions start as draft or published, never archived
    #[error("Cannot create a version of page {page_id} with status {status}")]
    InvalidInitialStatus {
        page_id: String,
        status: VersionStatus,
    },

    /// More than one published version exists for a page
    #[error("Page {page_id} has {count} current published versions: {version_ids:?}")]
    MultipleCurrentVersions {
        page_id: String,
        count: usize,
        version_ids: Vec<String>,
    },

    /// Version used as a base or restore source belongs to another page
    #[error("Version {version_id} belongs to page {owner_page_id}, not {page_id}")]
    VersionPageMismatch {
        version_id: String,
        page_id: String,
        owner_page_id: String,
    },

    // ===== Content Validation Errors =====
    /// Page ids must be non-empty
    #[error("Page id cannot be empty")]
    EmptyPageId,

    /// Slot names must be non-empty
    #[error("Slot name cannot be empty")]
    EmptySlotName,

    /// Widget ids must be non-empty
    #[error("Widget id cannot be empty in slot {slot}")]
    EmptyWidgetId { slot: String },

    /// Widget id appears twice in one version
    #[error("Duplicate widget id {widget_id} in slot {slot}")]
    DuplicateWidgetId { slot: String, widget_id: String },

    /// inheritance_level below -1
    #[error("Invalid inheritance level {level} on widget {widget_id}: must be -1 or greater")]
    InvalidInheritanceLevel { widget_id: String, level: i32 },

    /// publish_effective_date after publish_expire_date
    #[error("Invalid visibility window on widget {widget_id}: effective date is after expire date")]
    InvalidVisibilityWindow { widget_id: String },

    /// Slot holds more widgets than its policy allows
    #[error("Slot {slot} holds {actual} widgets, policy allows at most {limit}")]
    SlotCapacityExceeded {
        slot: String,
        limit: usize,
        actual: usize,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON/TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A lock guarding shared state was poisoned by a panicking writer
    #[error("Lock poisoned: {message}")]
    LockPoisoned { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from CanopyError to ExError
impl From<CanopyError> for ExError {
    fn from(err: CanopyError) -> Self {
        match err {
            CanopyError::PageNotFound { page_id } => ExError::new(ExErrorKind::NotFound)
                .with_page_id(page_id)
                .with_message("Page not found"),

            CanopyError::ParentNotFound { page_id } => ExError::new(ExErrorKind::NotFound)
                .with_page_id(page_id)
                .with_op("find_parent")
                .with_message("Parent page not found"),

            CanopyError::VersionNotFound { version_id } => ExError::new(ExErrorKind::NotFound)
                .with_version_id(version_id)
                .with_message("Version not found"),

            CanopyError::SlotPolicyNotFound {
                layout_id,
                slot_name,
            } => ExError::new(ExErrorKind::NotFound)
                .with_slot(slot_name)
                .with_message(format!("No slot policy for layout {}", layout_id)),

            CanopyError::PageAlreadyExists { page_id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_page_id(page_id)
                    .with_message("Page already exists")
            }

            CanopyError::CycleDetected { page_id } => ExError::new(ExErrorKind::CycleDetected)
                .with_page_id(page_id)
                .with_message("Parent pointers form a cycle"),

            CanopyError::AncestorChainBroken { page_id, parent_id } => {
                ExError::new(ExErrorKind::TraversalBroken)
                    .with_page_id(page_id)
                    .with_message(format!("Parent {} does not exist", parent_id))
            }

            CanopyError::InvalidTransition {
                version_id,
                status,
                action,
            } => ExError::new(ExErrorKind::InvalidTransition)
                .with_version_id(version_id)
                .with_op(action)
                .with_message(format!("Version status is {}", status)),

            CanopyError::InvalidInitialStatus { page_id, status } => {
                ExError::new(ExErrorKind::InvalidTransition)
                    .with_page_id(page_id)
                    .with_op("put_version")
                    .with_message(format!("New versions cannot start as {}", status))
            }

            CanopyError::MultipleCurrentVersions {
                page_id,
                count,
                version_ids,
            } => ExError::new(ExErrorKind::InconsistentState)
                .with_page_id(page_id)
                .with_message(format!(
                    "{} current published versions: {:?}",
                    count, version_ids
                )),

            CanopyError::VersionPageMismatch {
                version_id,
                page_id,
                owner_page_id,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_version_id(version_id)
                .with_page_id(page_id)
                .with_message(format!("Version belongs to page {}", owner_page_id)),

            CanopyError::EmptyPageId => {
                ExError::new(ExErrorKind::InvalidInput).with_message("Page id cannot be empty")
            }

            CanopyError::EmptySlotName => {
                ExError::new(ExErrorKind::InvalidInput).with_message("Slot name cannot be empty")
            }

            CanopyError::EmptyWidgetId { slot } => ExError::new(ExErrorKind::InvalidInput)
                .with_slot(slot)
                .with_message("Widget id cannot be empty"),

            CanopyError::DuplicateWidgetId { slot, widget_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_slot(slot)
                    .with_widget_id(widget_id)
                    .with_message("Duplicate widget id")
            }

            CanopyError::InvalidInheritanceLevel { widget_id, level } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_widget_id(widget_id)
                    .with_message(format!("Invalid inheritance level {}", level))
            }

            CanopyError::InvalidVisibilityWindow { widget_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_widget_id(widget_id)
                    .with_message("Effective date is after expire date")
            }

            CanopyError::SlotCapacityExceeded {
                slot,
                limit,
                actual,
            } => ExError::new(ExErrorKind::CapacityExceeded)
                .with_slot(slot)
                .with_message(format!("{} widgets, limit is {}", actual, limit)),

            CanopyError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            CanopyError::LockPoisoned { message } => {
                ExError::new(ExErrorKind::Concurrency).with_message(message)
            }

            CanopyError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to CanopyError
impl From<serde_json::Error> for CanopyError {
    fn from(err: serde_json::Error) -> Self {
        CanopyError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_kind_codes() {
        let cases = [
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::InvalidTransition, "ERR_INVALID_TRANSITION"),
            (ExErrorKind::InconsistentState, "ERR_INCONSISTENT_STATE"),
            (ExErrorKind::CapacityExceeded, "ERR_CAPACITY_EXCEEDED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_invalid_transition_maps_kind_and_context() {
        let err: ExError = CanopyError::InvalidTransition {
            version_id: "v1".to_string(),
            status: VersionStatus::Archived,
            action: "publish".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::InvalidTransition);
        assert_eq!(err.version_id(), Some("v1"));
        assert_eq!(err.op(), Some("publish"));
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("resolve_slot")
            .with_page_id("p1")
            .with_slot("header")
            .with_message("Page not found");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("resolve_slot"));
        assert!(rendered.contains("(page_id: p1)"));
        assert!(rendered.contains("(slot: header)"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error as _;

        let inner = ExError::new(ExErrorKind::Persistence).with_message("disk full");
        let outer = ExError::new(ExErrorKind::Internal).with_source(inner);

        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Persistence)
        );
        assert!(outer.source().is_some());
    }
}
