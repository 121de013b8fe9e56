// Circuit breaker for outbound lookups

use crate::core::errors::AppError;
use failsafe::futures::CircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error, StateMachine};
use std::time::Duration;

/// Circuit breaker guarding outbound calls
///
/// Policy:
/// - 5 consecutive failures triggers OPEN state
/// - 5 seconds cool-down period before HALF-OPEN (retry)
pub type UpstreamCircuitBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Constant>, ()>;

pub fn create_circuit_breaker() -> UpstreamCircuitBreaker {
    Config::new()
        .failure_policy(failure_policy::consecutive_failures(
            5,
            backoff::constant(Duration::from_secs(5)),
        ))
        .build()
}

/// Run `operation` under the breaker
///
/// Both an inner failure and a rejected call surface as
/// `AppError::Upstream` naming `service`.
pub async fn execute_with_cb<F, Fut, T, E>(
    cb: &UpstreamCircuitBreaker,
    service: &str,
    operation: F,
) -> Result<T, AppError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match cb.call(operation()).await {
        Ok(val) => Ok(val),
        Err(Error::Inner(e)) => Err(AppError::Upstream(format!("{}: {}", service, e))),
        Err(Error::Rejected) => Err(AppError::Upstream(format!(
            "{}: circuit breaker open",
            service
        ))),
    }
}
