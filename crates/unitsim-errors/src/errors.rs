use unitsim_core_types::SimId;
use thiserror::Error;

/// Result type alias using SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Boxed error raised from inside a producer
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that hosts and tests can match on
/// without parsing messages. A cancelled or failed resolution never maps to
/// `AssertionMismatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Comparison
    AssertionMismatch,

    // Resolution
    ResolutionFailure,
    CanonicalizationFailure,
    Cancellation,
    MissingProducer,

    // Rendering / configuration
    Serialization,
    InvalidConfig,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::AssertionMismatch => "ERR_ASSERTION_MISMATCH",
            ExErrorKind::ResolutionFailure => "ERR_RESOLUTION_FAILURE",
            ExErrorKind::CanonicalizationFailure => "ERR_CANONICALIZATION_FAILURE",
            ExErrorKind::Cancellation => "ERR_CANCELLATION",
            ExErrorKind::MissingProducer => "ERR_MISSING_PRODUCER",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Which of the two deferred producers a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Expectation,
    Actual,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Expectation => "expectation",
            Track::Actual => "actual",
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and enough
/// context (operation, engine id, track) to find the failing test in logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    sim_id: Option<SimId>,
    track: Option<Track>,
    title: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            sim_id: None,
            track: None,
            title: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add engine instance context
    pub fn with_sim_id(mut self, sim_id: SimId) -> Self {
        self.sim_id = Some(sim_id);
        self
    }

    /// Add producer track context
    pub fn with_track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    /// Add test title context
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
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

    /// Get the engine instance, if any
    pub fn sim_id(&self) -> Option<&SimId> {
        self.sim_id.as_ref()
    }

    /// Get the producer track, if any
    pub fn track(&self) -> Option<Track> {
        self.track
    }

    /// Get the test title, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
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
        if let Some(track) = self.track {
            write!(f, " (track: {})", track)?;
        }
        if let Some(title) = &self.title {
            write!(f, " (title: {})", title)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Marker error a producer returns to signal that it was cancelled
///
/// The engines classify it as [`SimError::Cancelled`] rather than as a
/// resolution failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cancelled: {reason}")]
pub struct Cancelled {
    pub reason: String,
}

impl Cancelled {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Every way a single assertion can end other than success
#[derive(Error, Debug)]
pub enum SimError {
    /// Resolved values differ
    #[error("{}", mismatch_message(.title.as_deref(), .expected, .actual, .differences.len()))]
    AssertionMismatch {
        title: Option<String>,
        expected: String,
        actual: String,
        differences: Vec<String>,
    },

    /// A producer raised while being resolved; the source is the producer's own error
    #[error("failed to resolve {track} producer: {source}")]
    Resolution {
        track: Track,
        #[source]
        source: BoxError,
    },

    /// A JSON-mode producer yielded text that does not parse
    #[error("failed to canonicalize {track} JSON: {message}")]
    Canonicalization { track: Track, message: String },

    /// Cancellation or timeout arrived while a producer was suspended
    #[error("{track} resolution cancelled: {reason}")]
    Cancelled { track: Track, reason: String },

    /// `evaluate` was reached before both producers were registered
    #[error("no {track} producer registered")]
    MissingProducer { track: Track },

    /// A value could not be lifted to its structural form
    #[error("failed to render value: {message}")]
    Render { message: String },

    /// Configuration could not be read or parsed
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// The scoped runtime used to wait on suspending producers could not start
    #[error("failed to start bridging runtime: {message}")]
    Bridge { message: String },
}

fn mismatch_message(
    title: Option<&str>,
    expected: &str,
    actual: &str,
    difference_count: usize,
) -> String {
    let prefix = match title {
        Some(title) => format!("assertion '{}' failed", title),
        None => "assertion failed".to_string(),
    };
    format!(
        "{}: expected <{}> but was <{}> ({} difference(s))",
        prefix, expected, actual, difference_count
    )
}

impl SimError {
    /// Get the canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            SimError::AssertionMismatch { .. } => ExErrorKind::AssertionMismatch,
            SimError::Resolution { .. } => ExErrorKind::ResolutionFailure,
            SimError::Canonicalization { .. } => ExErrorKind::CanonicalizationFailure,
            SimError::Cancelled { .. } => ExErrorKind::Cancellation,
            SimError::MissingProducer { .. } => ExErrorKind::MissingProducer,
            SimError::Render { .. } => ExErrorKind::Serialization,
            SimError::Config { .. } => ExErrorKind::InvalidConfig,
            SimError::Bridge { .. } => ExErrorKind::Internal,
        }
    }

    /// Whether this is a value mismatch, as opposed to any failure to get the values
    pub fn is_mismatch(&self) -> bool {
        matches!(self, SimError::AssertionMismatch { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SimError::Cancelled { .. })
    }

    /// The track the failure came from, if it is tied to one producer
    pub fn track(&self) -> Option<Track> {
        match self {
            SimError::Resolution { track, .. }
            | SimError::Canonicalization { track, .. }
            | SimError::Cancelled { track, .. }
            | SimError::MissingProducer { track } => Some(*track),
            _ => None,
        }
    }

    /// Take back the producer's own error from a resolution failure
    pub fn into_resolution_source(self) -> Option<BoxError> {
        match self {
            SimError::Resolution { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Conversion from SimError to ExError
impl From<&SimError> for ExError {
    fn from(err: &SimError) -> Self {
        let base = ExError::new(err.kind());
        let base = match err.track() {
            Some(track) => base.with_track(track),
            None => base,
        };
        match err {
            SimError::AssertionMismatch { title, .. } => {
                let base = base
                    .with_op("compare")
                    .with_message(err.to_string());
                match title {
                    Some(title) => base.with_title(title.clone()),
                    None => base,
                }
            }
            SimError::Resolution { .. } | SimError::Cancelled { .. } => {
                base.with_op("resolve").with_message(err.to_string())
            }
            SimError::Canonicalization { .. } => {
                base.with_op("canonicalize").with_message(err.to_string())
            }
            SimError::MissingProducer { .. } => {
                base.with_op("evaluate").with_message(err.to_string())
            }
            SimError::Render { message } => base.with_op("render").with_message(message.clone()),
            SimError::Config { message } => base.with_op("config").with_message(message.clone()),
            SimError::Bridge { message } => base.with_op("bridge").with_message(message.clone()),
        }
    }
}

impl From<SimError> for ExError {
    fn from(err: SimError) -> Self {
        ExError::from(&err)
    }
}

/// Conversion from serde_json::Error to SimError
impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Render {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_codes() {
        let cases = [
            (ExErrorKind::AssertionMismatch, "ERR_ASSERTION_MISMATCH"),
            (ExErrorKind::ResolutionFailure, "ERR_RESOLUTION_FAILURE"),
            (
                ExErrorKind::CanonicalizationFailure,
                "ERR_CANONICALIZATION_FAILURE",
            ),
            (ExErrorKind::Cancellation, "ERR_CANCELLATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let err = ExError::new(ExErrorKind::Cancellation)
            .with_op("resolve")
            .with_track(Track::Actual)
            .with_message("timed out");
        assert_eq!(
            err.to_string(),
            "[ERR_CANCELLATION] in operation 'resolve': timed out (track: actual)"
        );
    }

    #[test]
    fn test_ex_error_context_none_by_default() {
        let err = ExError::new(ExErrorKind::Internal);
        assert!(err.op().is_none());
        assert!(err.track().is_none());
        assert!(err.sim_id().is_none());
        assert!(err.title().is_none());
    }

    #[test]
    fn test_serde_json_error_becomes_render() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SimError = parse.into();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
