use equivex_core_types::SessionId;
use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Structural mismatches between subject and expectation are never errors:
/// they are collected as failures in the equivalency report. The kinds below
/// cover the conditions under which a comparison cannot be carried out at
/// all, plus the adapters (profiles, JSON, CLI) built around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    InvalidProfile,

    // Host object model
    /// A member getter failed or was read off something that is not an object
    MemberAccess,

    // Engine
    /// No step in the pipeline handled a position (missing fallback step)
    NoStepFound,
    /// The comparison completed and reported failures
    NotEquivalent,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidProfile => "ERR_INVALID_PROFILE",
            ExErrorKind::MemberAccess => "ERR_MEMBER_ACCESS",
            ExErrorKind::NoStepFound => "ERR_NO_STEP_FOUND",
            ExErrorKind::NotEquivalent => "ERR_NOT_EQUIVALENT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind signals a defect in the engine or its pipeline
    /// rather than a problem with the caller's data.
    pub fn is_defect(&self) -> bool {
        matches!(self, ExErrorKind::NoStepFound | ExErrorKind::Internal)
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    member: Option<String>,
    session_id: Option<SessionId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            member: None,
            session_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the path of the position being compared
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the member name involved
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Add comparison session context
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
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

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the member context, if any
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Get the session context, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
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
        if self.kind.is_defect() {
            write!(f, "[{}] engine defect", self.code())?;
        } else {
            write!(f, "[{}]", self.code())?;
        }
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(member) = &self.member {
            write!(f, " (member: {})", member)?;
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

/// Domain errors raised by the host object model and the engine's adapters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquivError {
    /// A computed member's getter failed
    #[error("Reading member {member} of {type_name} failed: {reason}")]
    MemberReadFailed {
        type_name: String,
        member: String,
        reason: String,
    },

    /// An indexed member was read with the wrong number of index arguments
    #[error("Member {member} of {type_name} requires {expected} index argument(s), got {actual}")]
    IndexArgumentMismatch {
        type_name: String,
        member: String,
        expected: usize,
        actual: usize,
    },

    /// A member was read off a value that is not an object
    #[error("Cannot read member {member} from a {found} value")]
    NotAnObject { member: String, found: String },

    /// A multi-dimensional array was built with the wrong number of items
    #[error("Array of shape {lengths:?} needs {expected} items, got {actual}")]
    InvalidArrayShape {
        lengths: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// A JSON document could not be mapped onto the object model
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// No step in the pipeline handled the position
    #[error("No equivalency step was found to handle {path}")]
    NoStepFound { path: String },

    /// An option profile could not be parsed or applied
    #[error("Invalid option profile: {reason}")]
    InvalidProfile { reason: String },

    /// Serialization error (JSON/YAML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from EquivError to ExError
impl From<EquivError> for ExError {
    fn from(err: EquivError) -> Self {
        let message = err.to_string();
        match err {
            EquivError::MemberReadFailed { member, .. }
            | EquivError::IndexArgumentMismatch { member, .. }
            | EquivError::NotAnObject { member, .. } => ExError::new(ExErrorKind::MemberAccess)
                .with_op("read_member")
                .with_member(member)
                .with_message(message),

            EquivError::InvalidArrayShape { .. } | EquivError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            EquivError::NoStepFound { path } => ExError::new(ExErrorKind::NoStepFound)
                .with_op("assert_equality_using")
                .with_path(path)
                .with_message(message),

            EquivError::InvalidProfile { .. } => {
                ExError::new(ExErrorKind::InvalidProfile).with_message(message)
            }

            EquivError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            EquivError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_read_failure_maps_to_member_access() {
        let err = EquivError::MemberReadFailed {
            type_name: "Customer".to_string(),
            member: "Balance".to_string(),
            reason: "ledger offline".to_string(),
        };

        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::MemberAccess);
        assert_eq!(ex.code(), "ERR_MEMBER_ACCESS");
        assert_eq!(ex.member(), Some("Balance"));
        assert!(ex.message().contains("ledger offline"));
    }

    #[test]
    fn test_no_step_found_is_reported_as_defect() {
        let ex: ExError = EquivError::NoStepFound {
            path: "orders[2]".to_string(),
        }
        .into();

        assert!(ex.kind().is_defect());
        assert_eq!(ex.path(), Some("orders[2]"));
        assert!(ex.to_string().contains("engine defect"));
    }

    #[test]
    fn test_display_includes_context() {
        let ex = ExError::new(ExErrorKind::InvalidProfile)
            .with_op("load_profile")
            .with_message("unknown field `strictness`");

        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_INVALID_PROFILE]"));
        assert!(rendered.contains("load_profile"));
        assert!(!ExErrorKind::InvalidProfile.is_defect());
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Io).with_message("file missing");
        let outer = ExError::new(ExErrorKind::InvalidProfile).with_source(inner);

        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Io)
        );
        assert!(std::error::Error::source(&outer).is_some());
    }
}
