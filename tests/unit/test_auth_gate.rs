// Unit tests for bearer token authentication

use devhub_api::auth::auth_middleware::AuthGate;
use devhub_api::auth::token_ledger::TokenLedger;
use devhub_api::core::crypto::TokenSigner;
use devhub_api::core::errors::{AppError, AuthError, UNAUTHENTICATED_MESSAGE};
use devhub_api::core::models::User;
use devhub_api::state::Stores;
use secrecy::Secret;
use std::sync::Arc;

use crate::common;

struct Fixture {
    gate: AuthGate,
    ledger: TokenLedger,
    stores: Stores,
    user: User,
}

async fn fixture() -> Fixture {
    let stores = Stores::memory();
    let config = devhub_api::config::Config::test_config();
    let signer = Arc::new(TokenSigner::new(&config.jwt_secret));
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;

    Fixture {
        gate: AuthGate::new(signer.clone(), stores.users.clone()),
        ledger: TokenLedger::new(signer, stores.users.clone()),
        stores,
        user,
    }
}

fn assert_unauthenticated(err: &AppError) {
    assert!(matches!(err, AppError::Auth(_)), "got {:?}", err);
    assert_eq!(err.status_code(), 401);
    assert_eq!(err.user_message(), UNAUTHENTICATED_MESSAGE);
}

#[tokio::test]
async fn test_active_token_resolves_user() {
    let f = fixture().await;
    let token = f.ledger.issue(f.user.id).await.unwrap();

    let ctx = f.gate.authenticate(Some(&token)).await.unwrap();
    assert_eq!(ctx.user.id, f.user.id);
    assert_eq!(ctx.token, token);
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let f = fixture().await;

    let err = f.gate.authenticate(None).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::MissingToken)));
    assert_unauthenticated(&err);

    let err = f.gate.authenticate(Some("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::MissingToken)));
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let f = fixture().await;
    let err = f.gate.authenticate(Some("abc.def.ghi")).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidToken(_))));
    assert_unauthenticated(&err);
}

#[tokio::test]
async fn test_foreign_secret_rejected() {
    let f = fixture().await;
    let foreign = TokenSigner::new(&Secret::new("another-secret-0123456789abcdef-xyz".to_string()));
    let token = foreign.mint_token(f.user.id).unwrap();

    let err = f.gate.authenticate(Some(&token)).await.unwrap_err();
    assert_unauthenticated(&err);
}

#[tokio::test]
async fn test_revoked_token_rejected_other_still_valid() {
    let f = fixture().await;
    let first = f.ledger.issue(f.user.id).await.unwrap();
    let second = f.ledger.issue(f.user.id).await.unwrap();

    f.ledger.revoke(f.user.id, &first).await.unwrap();

    let err = f.gate.authenticate(Some(&first)).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::RevokedToken)));
    assert_unauthenticated(&err);

    assert!(f.gate.authenticate(Some(&second)).await.is_ok());
}

#[tokio::test]
async fn test_revoke_all_rejects_every_session() {
    let f = fixture().await;
    let first = f.ledger.issue(f.user.id).await.unwrap();
    let second = f.ledger.issue(f.user.id).await.unwrap();

    f.ledger.revoke_all(f.user.id).await.unwrap();

    assert!(f.gate.authenticate(Some(&first)).await.is_err());
    assert!(f.gate.authenticate(Some(&second)).await.is_err());
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let f = fixture().await;
    let token = f.ledger.issue(f.user.id).await.unwrap();
    f.stores.users.delete_user(f.user.id).await.unwrap();

    let err = f.gate.authenticate(Some(&token)).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidToken(_))));
}

#[tokio::test]
async fn test_claimed_user_ignores_ledger() {
    let f = fixture().await;
    let token = f.ledger.issue(f.user.id).await.unwrap();
    f.ledger.revoke_all(f.user.id).await.unwrap();

    assert_eq!(f.gate.claimed_user(&token), Some(f.user.id));
    assert_eq!(f.gate.claimed_user("garbage"), None);
}
