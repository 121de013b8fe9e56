// Credential store: registration, login verification, account maintenance

use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::core::crypto::{avatar_url, PasswordHasher};
use crate::core::errors::{AppError, AuthError, CryptoError};
use crate::core::models::{PasswordDigest, User};
use crate::state::{modify_user, ProfileStore, UserStore};

pub const MIN_PASSWORD_LEN: usize = 7;

/// Changes a user may make to their own account
#[derive(Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
}

/// Owns password hashing and the identity fields of users
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    pub fn new(
        users: Arc<dyn UserStore>,
        profiles: Arc<dyn ProfileStore>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            profiles,
            hasher,
        }
    }

    /// Create an account
    ///
    /// All field problems are reported together. The stored user carries a
    /// hash of `password` and an avatar derived from the normalized email.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: Secret<String>,
    ) -> Result<User, AppError> {
        let name = name.trim().to_string();
        let email = normalize_email(email);

        let mut problems = Vec::new();
        if name.is_empty() {
            problems.push("Name is required".to_string());
        }
        if let Err(msg) = check_email(&email) {
            problems.push(msg);
        }
        if let Err(msg) = check_password(password.expose_secret()) {
            problems.push(msg);
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems.join("; ")));
        }

        let digest = self.hash_password(password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            avatar: Some(avatar_url(&email)),
            email,
            password: digest,
            tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.users.insert_user(&user).await?;
        info!(user_id = %user.id, "Account registered");

        Ok(user)
    }

    /// Resolve a user from email and password
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn verify(&self, email: &str, password: Secret<String>) -> Result<User, AppError> {
        let email = normalize_email(email);

        let user = match self.users.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login rejected: no account for email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.check_password_hash(password, user.password.clone()).await? {
            warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Apply an account update
    ///
    /// The password is re-hashed only when a new one is supplied; otherwise
    /// the stored hash is written back unchanged.
    pub async fn update_account(&self, user_id: Uuid, update: AccountUpdate) -> Result<User, AppError> {
        let mut problems = Vec::new();
        let name = update.name.map(|n| n.trim().to_string());
        if matches!(name.as_deref(), Some("")) {
            problems.push("Name is required".to_string());
        }
        let email = update.email.as_deref().map(normalize_email);
        if let Some(ref email) = email {
            if let Err(msg) = check_email(email) {
                problems.push(msg);
            }
        }
        if let Some(ref password) = update.password {
            if let Err(msg) = check_password(password.expose_secret()) {
                problems.push(msg);
            }
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems.join("; ")));
        }

        let digest = match update.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let (user, ()) = modify_user(self.users.as_ref(), user_id, move |user| {
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(digest) = digest {
                user.password = digest;
            }
            Ok(())
        })
        .await?;

        info!(user_id = %user.id, "Account updated");
        Ok(user)
    }

    /// Recompute the avatar URL from the user's current email
    pub async fn regenerate_avatar(&self, user_id: Uuid) -> Result<User, AppError> {
        let (user, ()) = modify_user(self.users.as_ref(), user_id, |user| {
            user.avatar = Some(avatar_url(&user.email));
            Ok(())
        })
        .await?;
        Ok(user)
    }

    /// Delete the account and the profile it owns
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        let removed_profile = self.profiles.delete_profile(user_id).await?;
        if !self.users.delete_user(user_id).await? {
            return Err(AppError::NotFound("Could not Delete".to_string()));
        }

        info!(user_id = %user_id, removed_profile, "Account deleted");
        Ok(())
    }

    async fn hash_password(&self, plain: Secret<String>) -> Result<PasswordDigest, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| CryptoError::HashingError(format!("Hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    async fn check_password_hash(
        &self,
        plain: Secret<String>,
        digest: PasswordDigest,
    ) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &digest))
            .await
            .map_err(|e| CryptoError::HashingError(format!("Verification task failed: {}", e)))?
            .map_err(AppError::from)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<(), String> {
    if email.to_string().validate_email() {
        Ok(())
    } else {
        Err("Please enter a valid email address".to_string())
    }
}

/// Password rules: at least seven characters, never containing "password"
pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.to_lowercase().contains("password") {
        return Err("Password cannot contain any variation of the word \"password\"".to_string());
    }
    Ok(())
}
