// Compile-time and construction checks for shared state

use devhub_api::api::AppState;
use devhub_api::auth::auth_middleware::{AuthContext, AuthState};
use devhub_api::core::errors::AppError;
use devhub_api::infra::pg_store::PgDocumentStore;
use devhub_api::state::memory_store::MemoryStore;
use devhub_api::state::Stores;
use static_assertions::assert_impl_all;
use std::sync::Arc;

use crate::common;

assert_impl_all!(AppState: Send, Sync, Clone);
assert_impl_all!(AuthState: Send, Sync, Clone);
assert_impl_all!(AuthContext: Send, Sync, Clone);
assert_impl_all!(Stores: Send, Sync, Clone);
assert_impl_all!(MemoryStore: Send, Sync);
assert_impl_all!(PgDocumentStore: Send, Sync);

#[test]
fn test_state_rejects_invalid_config() {
    let mut config = common::create_test_app_state().config.as_ref().clone();
    config.password_hash_memory_kib = 1;

    let result = AppState::new(
        config,
        Stores::memory(),
        Arc::new(common::MockRepoLookup::default()),
        None,
    );
    assert!(matches!(result, Err(AppError::Crypto(_)) | Err(AppError::Configuration(_))));
}

#[tokio::test]
async fn test_state_shares_stores() {
    let state = common::create_test_app_state();
    let user = state
        .credentials
        .register("Ada", "ada@x.com", secrecy::Secret::new("secretpw".to_string()))
        .await
        .unwrap();

    let token = state.ledger.issue(user.id).await.unwrap();
    let ctx = state.auth.gate.authenticate(Some(&token)).await.unwrap();
    assert_eq!(ctx.user.id, user.id);
    assert!(state.users.find_user(user.id).await.unwrap().is_some());
}
