// Configuration management

use crate::core::errors::AppError;
use secrecy::{ExposeSecret, Secret};
use std::env;
use std::path::Path;

/// Minimum accepted length of JWT_SECRET in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables
///
/// Loaded once in `main` and handed to constructors explicitly; nothing in
/// the library reads the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Database configuration (optional, in-memory store when absent)
    pub database_url: Option<String>,
    pub db_pool_max_size: u32,

    // Token signing secret
    pub jwt_secret: Secret<String>,

    // Password hashing cost
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,

    // GitHub lookup configuration
    pub github_api_url: String,
    pub github_token: Option<Secret<String>>,
    pub github_timeout_secs: u64,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, AppError> {
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok();
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0"),
            port: Self::parse_port()?,
            database_url: Self::get_optional_env("DATABASE_URL"),
            db_pool_max_size: Self::parse_or_default("DB_POOL_MAX_SIZE", 10u32)?,
            jwt_secret: Self::get_required_secret("JWT_SECRET")?,
            password_hash_memory_kib: Self::parse_or_default("PASSWORD_HASH_MEMORY_KIB", 19_456u32)?,
            password_hash_iterations: Self::parse_or_default("PASSWORD_HASH_ITERATIONS", 2u32)?,
            github_api_url: Self::get_env_or_default("GITHUB_API_URL", "https://api.github.com"),
            github_token: Self::get_optional_env("GITHUB_TOKEN").map(Secret::new),
            github_timeout_secs: Self::parse_or_default("GITHUB_TIMEOUT_SECS", 10u64)?,
            request_timeout_secs: Self::parse_or_default("REQUEST_TIMEOUT_SECS", 30u64)?,
            body_size_limit_bytes: Self::parse_or_default("BODY_SIZE_LIMIT_BYTES", 2 * 1024 * 1024usize)?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info"),
            log_format: Self::get_env_or_default("LOG_FORMAT", "json"),
        };

        config.validate()?;

        Ok(config)
    }

    /// Load variables from a dotenv-format file, then read the environment
    ///
    /// Variables already set in the process environment win over the file.
    pub fn from_env_file(path: &Path) -> Result<Self, AppError> {
        dotenv::from_path(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_env()
    }

    fn get_env_or_default(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn get_optional_env(key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    fn get_required_secret(key: &str) -> Result<Secret<String>, AppError> {
        let value = env::var(key)
            .map_err(|_| AppError::Configuration(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(AppError::Configuration(format!("{} is empty", key)));
        }

        Ok(Secret::new(value))
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, AppError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            AppError::Configuration(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(AppError::Configuration(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    /// Parse a positive number from the environment or return `default`
    fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
    where
        T: std::str::FromStr + PartialEq + Default,
        T::Err: std::fmt::Display,
    {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<T>().map_err(|e| {
                    AppError::Configuration(format!("Invalid {} value '{}': {}", key, value, e))
                })?;

                if parsed == T::default() {
                    return Err(AppError::Configuration(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }

        if let Some(ref url) = self.database_url {
            Self::validate_url(url, "Database URL")?;
        }
        Self::validate_url(&self.github_api_url, "GitHub API URL")?;

        // Argon2 requires at least 8 KiB per lane
        if self.password_hash_memory_kib < 8 {
            return Err(AppError::Configuration(
                "PASSWORD_HASH_MEMORY_KIB must be at least 8".to_string(),
            ));
        }

        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    fn validate_url(url: &str, description: &str) -> Result<(), AppError> {
        url::Url::parse(url).map_err(|e| {
            AppError::Configuration(format!("Invalid {} '{}': {}", description, url, e))
        })?;
        Ok(())
    }

    fn validate_log_level(level: &str) -> Result<(), AppError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(AppError::Configuration(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_log_format(format: &str) -> Result<(), AppError> {
        if format != "json" && format != "text" {
            return Err(AppError::Configuration(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Test configuration that bypasses environment loading
    ///
    /// Uses the in-memory store and a cheap password hash cost.
    pub fn test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            database_url: None,
            db_pool_max_size: 2,
            jwt_secret: Secret::new("test-secret-0123456789abcdef-0123456789".to_string()),
            password_hash_memory_kib: 1024,
            password_hash_iterations: 1,
            github_api_url: "https://api.github.com".to_string(),
            github_token: None,
            github_timeout_secs: 5,
            request_timeout_secs: 30,
            body_size_limit_bytes: 2 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
