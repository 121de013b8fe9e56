// Cryptographic utilities: HS256 session tokens, Argon2id password hashing, avatar hashing

use crate::core::errors::{AuthError, CryptoError};
use crate::core::models::PasswordDigest;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Claims carried by a session token
///
/// There is deliberately no `exp`: a token stays valid until it is removed
/// from the owner's token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub iat: u64,
    pub jti: String,
}

/// Signs and verifies session tokens with the process-wide shared secret
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &Secret<String>) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Mint a token binding `user_id`
    ///
    /// Payload structure:
    /// - _id: user identifier
    /// - iat: issue timestamp
    /// - jti: UUID v4, keeps two tokens minted in the same second distinct
    pub fn mint_token(&self, user_id: Uuid) -> Result<String, CryptoError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CryptoError::SigningError(format!("System time error: {}", e)))?
            .as_secs();

        let claims = TokenClaims {
            user_id: user_id.to_string(),
            iat,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CryptoError::SigningError(e.to_string()))
    }

    /// Verify signature and structure, returning the embedded user id
    ///
    /// This says nothing about revocation; callers must still check the
    /// owner's token list.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Uuid::parse_str(&data.claims.user_id)
            .map_err(|e| AuthError::InvalidToken(format!("Bad subject: {}", e)))
    }
}

/// Argon2id password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the given memory cost (KiB) and iteration count
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, CryptoError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| CryptoError::HashingError(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plain: &Secret<String>) -> Result<PasswordDigest, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plain.expose_secret().as_bytes(), &salt)
            .map_err(|e| CryptoError::HashingError(e.to_string()))?
            .to_string();

        Ok(PasswordDigest::from_phc(phc))
    }

    /// Check a plaintext password against a stored digest
    pub fn verify(&self, plain: &Secret<String>, digest: &PasswordDigest) -> Result<bool, CryptoError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(plain.expose_secret().as_bytes(), &parsed)
            .is_ok())
    }
}

/// Hash-based identicon URL for an email address
///
/// Deterministic: the same normalized email always maps to the same URL.
pub fn avatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm", digest)
}
