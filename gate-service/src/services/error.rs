use gate_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing or invalid Authorization header")]
    MissingCredentials,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Untrusted issuer: {issuer}")]
    UntrustedIssuer { issuer: String },

    #[error("Missing required capability: {capability}")]
    InsufficientCapability { capability: String },

    #[error("Tenant store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingCredentials => {
                AppError::AuthError(anyhow::anyhow!("Missing or invalid Authorization header"))
            }
            ServiceError::MalformedToken(e) => {
                AppError::AuthError(anyhow::anyhow!("Malformed token: {}", e))
            }
            ServiceError::InvalidToken(e) => AppError::InvalidToken(e),
            ServiceError::UntrustedIssuer { issuer } => {
                AppError::AuthError(anyhow::anyhow!("Untrusted issuer: {}", issuer))
            }
            ServiceError::InsufficientCapability { capability } => AppError::Forbidden(
                anyhow::anyhow!("Missing required capability: {}", capability),
            ),
            ServiceError::Store(e) => AppError::InternalError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
