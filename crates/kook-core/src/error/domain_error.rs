//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid reply target: {0:?}")]
    InvalidTarget(String),

    #[error("Kook token missing for account \"{0}\"")]
    MissingToken(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Reply router failed: {0}")]
    Router(String),
}

impl DomainError {
    /// Get an error code string for logs and status snapshots
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::MissingToken(_) => "MISSING_TOKEN",
            Self::Router(_) => "ROUTER_ERROR",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidTarget(_) | Self::MissingToken(_))
    }
}
