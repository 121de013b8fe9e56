// Request handlers for API endpoints

use uuid::Uuid;

use crate::core::errors::AppError;

pub mod health;
pub mod posts;
pub mod profile;
pub mod users;

/// Parse a path id; anything that is not a UUID is a missing resource
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found.to_string()))
}
