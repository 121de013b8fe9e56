// Session ledger: per-user list of bearer tokens that are still valid

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::crypto::TokenSigner;
use crate::core::errors::AppError;
use crate::core::models::SessionToken;
use crate::state::{modify_user, UserStore};

pub struct TokenLedger {
    signer: Arc<TokenSigner>,
    users: Arc<dyn UserStore>,
}

impl TokenLedger {
    pub fn new(signer: Arc<TokenSigner>, users: Arc<dyn UserStore>) -> Self {
        Self { signer, users }
    }

    /// Mint a token for `user_id` and append it to the active list
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = self.signer.mint_token(user_id)?;

        let entry = SessionToken {
            token: token.clone(),
        };
        let (user, ()) = modify_user(self.users.as_ref(), user_id, move |user| {
            user.tokens.push(entry);
            Ok(())
        })
        .await?;

        debug!(user_id = %user.id, active_sessions = user.tokens.len(), "Session issued");
        Ok(token)
    }

    /// Remove the first entry equal to `token`
    ///
    /// Returns whether anything was removed. Other sessions are untouched.
    pub async fn revoke(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        let (_, removed) = modify_user(self.users.as_ref(), user_id, |user| {
            match user.tokens.iter().position(|t| t.token == token) {
                Some(pos) => {
                    user.tokens.remove(pos);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await?;

        info!(user_id = %user_id, removed, "Session revoked");
        Ok(removed)
    }

    /// Clear every active session, returning how many were dropped
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<usize, AppError> {
        let (_, cleared) = modify_user(self.users.as_ref(), user_id, |user| {
            let count = user.tokens.len();
            user.tokens.clear();
            Ok(count)
        })
        .await?;

        info!(user_id = %user_id, cleared, "All sessions revoked");
        Ok(cleared)
    }
}
