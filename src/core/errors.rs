// Domain error types - client-facing messages never carry internal detail

use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or disallowed input (HTTP 400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Authentication or ownership failure (HTTP 401)
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Missing user, profile, post, comment or subdocument (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate like, or unlike without a like (HTTP 400)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External repository lookup failed (HTTP 404)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Backing store or driver failure (HTTP 500)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Hashing or token signing failure (HTTP 500)
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Authentication failures
///
/// Every token failure renders the same client message so a caller cannot
/// probe which check rejected it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No bearer token on the request
    #[error("missing token")]
    MissingToken,

    /// Token is malformed, badly signed, or names a user that does not exist
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token verifies but is no longer in the user's active list
    #[error("revoked token")]
    RevokedToken,

    /// Acting user does not own the resource
    #[error("not owner: {0}")]
    NotOwner(String),
}

/// Cryptographic operation errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Failed to hash a password
    #[error("Failed to hash password: {0}")]
    HashingError(String),

    /// Stored password hash could not be parsed
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    /// Failed to sign token
    #[error("Failed to sign token: {0}")]
    SigningError(String),
}

pub const LOGIN_FAILED_MESSAGE: &str = "Unable to login";
pub const UNAUTHENTICATED_MESSAGE: &str = "Please authenticate";
pub const GITHUB_NOT_FOUND_MESSAGE: &str = "No Github Profile Found...";

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Auth(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 400,
            AppError::Upstream(_) => 404,
            AppError::Store(_) => 500,
            AppError::Configuration(_) => 500,
            AppError::Crypto(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(reason) => reason.clone(),
            AppError::Auth(AuthError::InvalidCredentials) => LOGIN_FAILED_MESSAGE.to_string(),
            AppError::Auth(AuthError::NotOwner(reason)) => reason.clone(),
            AppError::Auth(_) => UNAUTHENTICATED_MESSAGE.to_string(),
            AppError::NotFound(what) => what.clone(),
            AppError::Conflict(reason) => reason.clone(),
            AppError::Upstream(_) => GITHUB_NOT_FOUND_MESSAGE.to_string(),
            AppError::Store(_) => "Server Error".to_string(),
            AppError::Configuration(_) => "Server Error".to_string(),
            AppError::Crypto(_) => "Server Error".to_string(),
        }
    }

    /// True for failures the client did not cause
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    pub fn not_owner(message: &str) -> Self {
        AppError::Auth(AuthError::NotOwner(message.to_string()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.to_string())
    }
}
