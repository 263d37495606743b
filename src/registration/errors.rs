use thiserror::Error;

use crate::payments::PaymentError;
use crate::store::StoreError;

use super::types::UserId;

/// Coarse error categories surfaced to the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    NotFound,
    Forbidden,
    Internal,
}

/// Errors returned by registration coordinator operations
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    #[error("Registration not found for user {user_id}")]
    NotFound { user_id: UserId },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Registration store error: {0}")]
    Store(#[from] StoreError),

    #[error("Payment provider error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RegistrationError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        RegistrationError::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        RegistrationError::BadRequest {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        RegistrationError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(user_id: &UserId) -> Self {
        RegistrationError::NotFound {
            user_id: user_id.clone(),
        }
    }

    /// Collaborator failures (store, payment provider) all report as `Internal`
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::Unauthorized { .. } => ErrorKind::Unauthorized,
            RegistrationError::BadRequest { .. } => ErrorKind::BadRequest,
            RegistrationError::NotFound { .. } => ErrorKind::NotFound,
            RegistrationError::Forbidden { .. } => ErrorKind::Forbidden,
            RegistrationError::Store(_)
            | RegistrationError::Payment(_)
            | RegistrationError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// HTTP status a transport layer would map this error to
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Unauthorized => 401,
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::Internal => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
