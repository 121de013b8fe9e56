// Axum authentication middleware

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::api::responses::ApiError;
use crate::auth::audit_logger::{AuditLogger, AuthEvent, ClientInfo};
use crate::core::crypto::TokenSigner;
use crate::core::errors::{AppError, AuthError};
use crate::core::metrics::Metrics;
use crate::core::models::User;
use crate::state::UserStore;

/// Resolved caller, placed in request extensions for handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// Raw bearer token, needed for single-session logout
    pub token: String,
}

/// Validates bearer tokens against the per-user ledger
///
/// Nothing is cached: every call re-reads the user so a revocation takes
/// effect on the next request.
pub struct AuthGate {
    signer: Arc<TokenSigner>,
    users: Arc<dyn UserStore>,
}

impl AuthGate {
    pub fn new(signer: Arc<TokenSigner>, users: Arc<dyn UserStore>) -> Self {
        Self { signer, users }
    }

    pub async fn authenticate(&self, raw_token: Option<&str>) -> Result<AuthContext, AppError> {
        let token = raw_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let user_id = self.signer.verify_token(token)?;

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Token names an unknown user".to_string()))?;

        if !user.tokens.iter().any(|t| t.token == token) {
            return Err(AuthError::RevokedToken.into());
        }

        Ok(AuthContext {
            user,
            token: token.to_string(),
        })
    }

    /// Subject of a correctly signed token, whether or not it is still active
    pub fn claimed_user(&self, raw_token: &str) -> Option<Uuid> {
        self.signer.verify_token(raw_token.trim()).ok()
    }
}

/// Authentication state containing all dependencies
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<AuthGate>,
    pub audit_logger: Arc<AuditLogger>,
    pub metrics: Arc<Metrics>,
}

/// Authentication middleware function
///
/// Extracts the bearer token from `Authorization`, resolves the caller and
/// sets an [`AuthContext`] in request extensions for handlers to use.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_token = extract_bearer_token(request.headers());
    let client = ClientInfo::from_headers(request.headers());

    match auth_state.gate.authenticate(raw_token.as_deref()).await {
        Ok(context) => {
            auth_state
                .audit_logger
                .log_auth_event(AuthEvent::AuthSuccess, Some(context.user.id), &client);
            auth_state.metrics.auth_outcomes.with_label_values(&["success"]).inc();

            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(e) => {
            if e.is_internal() {
                error!(error = %e, "User lookup failed during authentication");
                auth_state.metrics.auth_outcomes.with_label_values(&["error"]).inc();
            } else {
                auth_state.audit_logger.log_auth_event(
                    AuthEvent::AuthFailure { reason: e.to_string() },
                    raw_token.as_deref().and_then(|t| auth_state.gate.claimed_user(t)),
                    &client,
                );
                auth_state.metrics.auth_outcomes.with_label_values(&["rejected"]).inc();
            }
            Err(ApiError::from(e))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}
