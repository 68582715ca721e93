// Error taxonomy: collaborator failures, per-item failures (skipped), request-level failures (fatal)

use thiserror::Error;

/// Failure reported by a provider collaborator (inventory or telemetry read).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("throttled: {0}")]
    Throttled(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

/// One (instance, metric) read failed. The assembler skips the chart and continues.
#[derive(Debug, Clone, Error)]
#[error("fetch {metric} for {instance_id}: {cause}")]
pub struct FetchError {
    pub instance_id: String,
    pub metric: String,
    #[source]
    pub cause: SourceError,
}

/// Chart construction failed for a non-empty series. Recovered like [`FetchError`].
#[derive(Debug, Clone, Error)]
#[error("render {metric}: {message}")]
pub struct RenderError {
    pub metric: String,
    pub message: String,
}

impl RenderError {
    pub fn new(metric: &str, message: impl ToString) -> Self {
        Self {
            metric: metric.to_string(),
            message: message.to_string(),
        }
    }
}

/// Request-level failures. Any of these aborts the request and no document is returned.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid request body: {0}")]
    InvalidRequest(String),
    #[error("invalid frequency {0:?}: expected daily, weekly or monthly")]
    InvalidFrequency(String),
    #[error("no instances selected")]
    EmptySelection,
    #[error("invalid instance at index {index}: {reason}")]
    InvalidInstance { index: usize, reason: String },
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("document write failed: {0}")]
    Write(String),
}

impl ReportError {
    /// Short machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::InvalidFrequency(_) => "InvalidFrequency",
            Self::EmptySelection => "EmptySelection",
            Self::InvalidInstance { .. } => "InvalidInstance",
            Self::Auth(_) => "AuthError",
            Self::ProviderUnavailable(_) => "ProviderUnavailable",
            Self::Write(_) => "WriteError",
        }
    }
}

impl From<SourceError> for ReportError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Unauthorized(msg) => Self::Auth(msg),
            other => Self::ProviderUnavailable(other.to_string()),
        }
    }
}
