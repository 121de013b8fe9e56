// Security event logging

use axum::http::HeaderMap;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Authentication event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    AuthSuccess,
    AuthFailure { reason: String },
    LoginSuccess,
    LoginFailure { reason: String },
    Logout,
    LogoutAll,
}

impl AuthEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AuthEvent::AuthSuccess => "AUTH_SUCCESS",
            AuthEvent::AuthFailure { .. } => "AUTH_FAILURE",
            AuthEvent::LoginSuccess => "LOGIN_SUCCESS",
            AuthEvent::LoginFailure { .. } => "LOGIN_FAILURE",
            AuthEvent::Logout => "LOGOUT",
            AuthEvent::LogoutAll => "LOGOUT_ALL",
        }
    }
}

/// Caller details recorded alongside an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("X-Forwarded-For")
            .or_else(|| headers.get("X-Real-IP"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let user_agent = headers
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Audit logger for security events
pub struct AuditLogger {
    db_pool: Option<PgPool>,
}

impl AuditLogger {
    /// If `db_pool` is `None`, only structured logging is used.
    pub fn new(db_pool: Option<PgPool>) -> Self {
        Self { db_pool }
    }

    /// Log an authentication event
    ///
    /// Fire-and-forget: the database insert runs on a spawned task and its
    /// errors never reach the request.
    pub fn log_auth_event(&self, event: AuthEvent, user_id: Option<Uuid>, client: &ClientInfo) {
        let ip = client.ip_address.clone();
        let ua = client.user_agent.clone();

        match event {
            AuthEvent::AuthFailure { ref reason } | AuthEvent::LoginFailure { ref reason } => {
                warn!(
                    event = event.event_type(),
                    user_id = ?user_id,
                    ip_address = ?ip,
                    user_agent = ?ua,
                    reason = %reason,
                    "Authentication failed"
                );
            }
            _ => {
                info!(
                    event = event.event_type(),
                    user_id = ?user_id,
                    ip_address = ?ip,
                    user_agent = ?ua,
                    "Authentication event"
                );
            }
        }

        let Some(pool) = self.db_pool.clone() else {
            return;
        };

        tokio::spawn(async move {
            if let Err(e) = sqlx::query(
                "INSERT INTO auth_audit_log (user_id, event_type, ip_address, user_agent, created_at)
                 VALUES ($1, $2, $3, $4, NOW())",
            )
            .bind(user_id)
            .bind(event.event_type())
            .bind(ip.as_deref())
            .bind(ua.as_deref())
            .execute(&pool)
            .await
            {
                warn!(error = %e, "Failed to write audit log to database");
            }
        });
    }
}
