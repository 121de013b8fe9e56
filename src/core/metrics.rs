// Prometheus counters for account, session and post activity

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::core::errors::AppError;

/// Service metrics, registered on a private registry so tests can build
/// as many instances as they like
pub struct Metrics {
    registry: Registry,
    pub auth_outcomes: IntCounterVec,
    pub registrations: IntCounter,
    pub logins: IntCounterVec,
    pub posts_created: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let auth_outcomes = IntCounterVec::new(
            Opts::new("devhub_auth_requests_total", "Bearer token checks by outcome"),
            &["outcome"],
        )
        .map_err(metrics_error)?;
        let registrations = IntCounter::new(
            "devhub_registrations_total",
            "Accounts created",
        )
        .map_err(metrics_error)?;
        let logins = IntCounterVec::new(
            Opts::new("devhub_logins_total", "Login attempts by outcome"),
            &["outcome"],
        )
        .map_err(metrics_error)?;
        let posts_created = IntCounter::new("devhub_posts_created_total", "Posts created")
            .map_err(metrics_error)?;

        registry.register(Box::new(auth_outcomes.clone())).map_err(metrics_error)?;
        registry.register(Box::new(registrations.clone())).map_err(metrics_error)?;
        registry.register(Box::new(logins.clone())).map_err(metrics_error)?;
        registry.register(Box::new(posts_created.clone())).map_err(metrics_error)?;

        Ok(Self {
            registry,
            auth_outcomes,
            registrations,
            logins,
            posts_created,
        })
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Configuration(e.to_string()))
    }
}

fn metrics_error(e: prometheus::Error) -> AppError {
    AppError::Configuration(format!("Metrics error: {}", e))
}
