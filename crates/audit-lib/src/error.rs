//! Audit error types.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{resource} not found: {detail}")]
    NotFound {
        resource: &'static str,
        detail: String,
    },

    #[error("upstream call {operation} failed: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("malformed response from {operation}: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
}

impl AuditError {
    pub fn not_found(resource: &'static str, detail: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            detail: detail.into(),
        }
    }

    pub fn upstream(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Upstream {
            operation,
            source: source.into(),
        }
    }

    pub fn malformed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            detail: detail.into(),
        }
    }

    /// Returns true for the NotFound class of failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuditError::NotFound { .. })
    }

    /// Returns true for transport or response-shape failures from an API
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AuditError::Upstream { .. } | AuditError::MalformedResponse { .. }
        )
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
