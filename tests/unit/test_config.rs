// Unit tests for configuration loading and validation

use devhub_api::config::Config;
use devhub_api::core::errors::AppError;
use secrecy::{ExposeSecret, Secret};
use std::io::Write;

// The only test in this binary that touches the process environment
#[test]
fn test_from_env_file_loads_and_validates() {
    for key in ["JWT_SECRET", "PORT", "LOG_FORMAT", "GITHUB_API_URL", "DATABASE_URL"] {
        std::env::remove_var(key);
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "JWT_SECRET=file-secret-0123456789abcdef-0123456789").unwrap();
    writeln!(file, "PORT=8080").unwrap();
    writeln!(file, "LOG_FORMAT=text").unwrap();
    file.flush().unwrap();

    let config = Config::from_env_file(file.path()).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.log_format, "text");
    assert_eq!(
        config.jwt_secret.expose_secret(),
        "file-secret-0123456789abcdef-0123456789"
    );
    assert!(config.database_url.is_none());
    assert_eq!(config.github_api_url, "https://api.github.com");

    let missing = Config::from_env_file(std::path::Path::new("/nonexistent/devhub.env"));
    assert!(matches!(missing, Err(AppError::Configuration(_))));

    for key in ["JWT_SECRET", "PORT", "LOG_FORMAT"] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_validate_rejects_bad_github_url() {
    let mut config = Config::test_config();
    config.github_api_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(AppError::Configuration(_))));
}

#[test]
fn test_validate_rejects_bad_database_url() {
    let mut config = Config::test_config();
    config.database_url = Some("::::".to_string());
    assert!(config.validate().is_err());

    config.database_url = Some("postgres://devhub@localhost/devhub".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_short_secret() {
    let mut config = Config::test_config();
    config.jwt_secret = Secret::new("too-short".to_string());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("JWT_SECRET"));
    assert!(err.is_internal());
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_validate_rejects_bad_logging() {
    let mut config = Config::test_config();
    config.log_level = "chatty".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::test_config();
    config.log_format = "yaml".to_string();
    assert!(config.validate().is_err());
}
