//! Error taxonomy shared across the orchestration engine.
//!
//! Variants split into transient failures (absorbed by the retry handler up
//! to budget) and fatal ones (rejected immediately, no retry). Degraded mode
//! is deliberately *not* an error: it is the `degraded` flag carried on
//! outcomes and turn responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Provider rejected the call due to rate limiting. Retryable.
    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    /// Provider is unreachable or returned a server-side failure. Retryable.
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// An external call exceeded its deadline. Retryable.
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// Caller input problem. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Credential or policy rejection from a provider. Never retried.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Unknown session id. Structured rejection, no retry.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Explicit session id collision on create/import.
    #[error("session already exists: {0}")]
    DuplicateSession(String),

    /// Irrecoverable collaboration stage failure.
    #[error("collaboration pipeline failed at {stage}: {message}")]
    Pipeline { stage: String, message: String },
}

impl OrchestratorError {
    /// Whether the retry handler may re-attempt the failed operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Timeout { .. }
        )
    }

    /// Short reason code for structured rejections and logs.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::Unavailable { .. } => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PermissionDenied(_) => "permission_denied",
            Self::SessionNotFound(_) => "session_not_found",
            Self::DuplicateSession(_) => "duplicate_session",
            Self::Pipeline { .. } => "pipeline_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(OrchestratorError::RateLimited {
            provider: "openai".into()
        }
        .is_transient());
        assert!(OrchestratorError::Unavailable {
            provider: "openai".into(),
            message: "502".into()
        }
        .is_transient());
        assert!(OrchestratorError::Timeout {
            operation: "complete".into(),
            seconds: 30
        }
        .is_transient());
    }

    #[test]
    fn fatal_classification() {
        assert!(!OrchestratorError::InvalidRequest("empty query".into()).is_transient());
        assert!(!OrchestratorError::PermissionDenied("bad key".into()).is_transient());
        assert!(!OrchestratorError::SessionNotFound("s1".into()).is_transient());
        assert!(!OrchestratorError::Pipeline {
            stage: "gather".into(),
            message: "boom".into()
        }
        .is_transient());
    }

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(
            OrchestratorError::SessionNotFound("x".into()).reason_code(),
            "session_not_found"
        );
        assert_eq!(
            OrchestratorError::InvalidRequest("x".into()).reason_code(),
            "invalid_request"
        );
    }
}
