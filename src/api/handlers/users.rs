// Account and session endpoints

use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use secrecy::Secret;
use serde::Deserialize;
use tracing::info;

use crate::api::extract::ApiJson;
use crate::api::responses::{ApiError, AuthResponse, MessageResponse};
use crate::api::AppState;
use crate::auth::audit_logger::{AuthEvent, ClientInfo};
use crate::auth::auth_middleware::AuthContext;
use crate::auth::credentials::AccountUpdate;
use crate::core::errors::{AppError, AuthError};
use crate::core::models::PublicUser;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users
pub async fn register_handler(
    State(app_state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = app_state
        .credentials
        .register(&request.name, &request.email, Secret::new(request.password))
        .await?;
    app_state.metrics.registrations.inc();

    let token = app_state.ledger.issue(user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

/// POST /api/users/login
///
/// The reason for a rejection goes to the audit log only; the client always
/// sees the same message.
pub async fn login_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let client = ClientInfo::from_headers(&headers);

    let user = match app_state
        .credentials
        .verify(&request.email, Secret::new(request.password))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AppError::Auth(AuthError::InvalidCredentials)) {
                app_state.audit_logger.log_auth_event(
                    AuthEvent::LoginFailure { reason: e.to_string() },
                    None,
                    &client,
                );
                app_state.metrics.logins.with_label_values(&["failure"]).inc();
            }
            return Err(e.into());
        }
    };

    let token = app_state.ledger.issue(user.id).await?;
    app_state
        .audit_logger
        .log_auth_event(AuthEvent::LoginSuccess, Some(user.id), &client);
    app_state.metrics.logins.with_label_values(&["success"]).inc();

    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

/// GET /api/users/auth
pub async fn current_user_handler(Extension(auth): Extension<AuthContext>) -> Json<PublicUser> {
    Json(PublicUser::from(&auth.user))
}

/// POST /api/users/logout
pub async fn logout_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.ledger.revoke(auth.user.id, &auth.token).await?;
    app_state.audit_logger.log_auth_event(
        AuthEvent::Logout,
        Some(auth.user.id),
        &ClientInfo::from_headers(&headers),
    );

    Ok(Json(MessageResponse::new("User logged out")))
}

/// POST /api/users/logoutAll
pub async fn logout_all_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.ledger.revoke_all(auth.user.id).await?;
    app_state.audit_logger.log_auth_event(
        AuthEvent::LogoutAll,
        Some(auth.user.id),
        &ClientInfo::from_headers(&headers),
    );

    Ok(Json(MessageResponse::new("All User instances logged out")))
}

/// PATCH /api/users/me
pub async fn update_account_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let update = AccountUpdate {
        name: request.name,
        email: request.email,
        password: request.password.map(Secret::new),
    };
    let user = app_state
        .credentials
        .update_account(auth.user.id, update)
        .await?;

    Ok(Json(PublicUser::from(&user)))
}

/// POST /api/users/avatar
pub async fn regenerate_avatar_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = app_state.credentials.regenerate_avatar(auth.user.id).await?;
    Ok(Json(PublicUser::from(&user)))
}

/// DELETE /api/users/deleteAccount
pub async fn delete_account_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.credentials.delete_account(auth.user.id).await?;
    info!(user_id = %auth.user.id, "Account closed by owner");

    Ok(Json(MessageResponse::new("Account successfully deleted")))
}
