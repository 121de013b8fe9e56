// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod responses;

pub use crate::config::Config;

use crate::auth::audit_logger::AuditLogger;
use crate::auth::auth_middleware::{auth_middleware, AuthGate, AuthState};
use crate::auth::credentials::CredentialStore;
use crate::auth::token_ledger::TokenLedger;
use crate::core::crypto::{PasswordHasher, TokenSigner};
use crate::core::errors::AppError;
use crate::core::metrics::Metrics;
use crate::engine::post_manager::PostManager;
use crate::engine::profile_manager::ProfileManager;
use crate::proxy::RepoLookup;
use crate::state::{Stores, UserStore};

/// Application state containing all shared dependencies
///
/// Every component is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub ledger: Arc<TokenLedger>,
    pub auth: Arc<AuthState>,
    pub profiles: Arc<ProfileManager>,
    pub posts: Arc<PostManager>,
    pub repo_lookup: Arc<dyn RepoLookup>,
    pub users: Arc<dyn UserStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub metrics: Arc<Metrics>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every component from configuration and the chosen stores
    ///
    /// `audit_pool` enables persistence of auth audit events.
    pub fn new(
        config: Config,
        stores: Stores,
        repo_lookup: Arc<dyn RepoLookup>,
        audit_pool: Option<PgPool>,
    ) -> Result<Self, AppError> {
        let signer = Arc::new(TokenSigner::new(&config.jwt_secret));
        let hasher = PasswordHasher::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
        )?;
        let metrics = Arc::new(Metrics::new()?);
        let audit_logger = Arc::new(AuditLogger::new(audit_pool));

        let auth = Arc::new(AuthState {
            gate: Arc::new(AuthGate::new(signer.clone(), stores.users.clone())),
            audit_logger: audit_logger.clone(),
            metrics: metrics.clone(),
        });

        Ok(Self {
            credentials: Arc::new(CredentialStore::new(
                stores.users.clone(),
                stores.profiles.clone(),
                hasher,
            )),
            ledger: Arc::new(TokenLedger::new(signer, stores.users.clone())),
            auth,
            profiles: Arc::new(ProfileManager::new(
                stores.profiles.clone(),
                stores.users.clone(),
            )),
            posts: Arc::new(PostManager::new(stores.posts)),
            repo_lookup,
            users: stores.users,
            audit_logger,
            metrics,
            config: Arc::new(config),
        })
    }
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Tracing (tower-http::trace)
/// - Request timeout (tower::timeout), 408 on elapse
/// - Body size limit (tower-http::limit), 413 when exceeded
/// - Auth middleware, on protected routes only
pub fn create_router(app_state: &AppState) -> Router<AppState> {
    use handlers::{health, posts, profile, users};

    let public = Router::new()
        .route("/api/users", post(users::register_handler))
        .route("/api/users/login", post(users::login_handler))
        .route("/api/profiles", get(profile::list_profiles_handler))
        .route("/api/profileById/:id", get(profile::profile_by_id_handler))
        .route("/api/profile/github/:username", get(profile::github_repos_handler))
        .route("/api/posts/post/:id", get(posts::get_post_handler))
        .route("/health", get(health::health_handler))
        .route("/metrics", get(health::metrics_handler));

    let protected = Router::new()
        .route("/api/users/auth", get(users::current_user_handler))
        .route("/api/users/logout", post(users::logout_handler))
        .route("/api/users/logoutAll", post(users::logout_all_handler))
        .route("/api/users/me", patch(users::update_account_handler))
        .route("/api/users/avatar", post(users::regenerate_avatar_handler))
        .route("/api/users/deleteAccount", delete(users::delete_account_handler))
        .route(
            "/api/profile/me",
            get(profile::my_profile_handler).delete(profile::delete_my_profile_handler),
        )
        .route("/api/profile", post(profile::upsert_profile_handler))
        .route("/api/profile/me/experience", patch(profile::add_experience_handler))
        .route(
            "/api/profile/me/experience/:id",
            delete(profile::remove_experience_handler),
        )
        .route("/api/profile/me/education", patch(profile::add_education_handler))
        .route(
            "/api/profile/me/education/:id",
            delete(profile::remove_education_handler),
        )
        .route("/api/posts", post(posts::create_post_handler))
        .route("/api/posts/all", get(posts::list_posts_handler))
        .route("/api/posts/delete/:id", delete(posts::delete_post_handler))
        .route("/api/posts/like/:id", patch(posts::like_handler))
        .route("/api/posts/unlike/:id", patch(posts::unlike_handler))
        .route("/api/posts/comment/:id", post(posts::add_comment_handler))
        .route(
            "/api/posts/comment/:id/:comment_id",
            delete(posts::delete_comment_handler),
        )
        .route(
            "/api/comment/edit/:id/:comment_id",
            patch(posts::edit_comment_handler),
        )
        .route_layer(from_fn_with_state(app_state.auth.clone(), auth_middleware));

    let timeout = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(middleware::handle_middleware_error))
        .timeout(Duration::from_secs(app_state.config.request_timeout_secs));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::body_size_limit_layer(
            app_state.config.body_size_limit_bytes,
        ))
        .layer(timeout)
        .layer(middleware::tracing_layer())
}
