// Document store seam: one trait per collection, backed by memory or Postgres

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::errors::AppError;
use crate::core::models::{Post, Profile, User};

pub mod memory_store;

/// User collection
///
/// `insert_user` and `save_user` must reject a second user with the same
/// email as `AppError::Validation`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Whole-document rewrite of an existing user
    async fn save_user(&self, user: &User) -> Result<(), AppError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

/// Profile collection, keyed by owner
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, owner: Uuid) -> Result<Option<Profile>, AppError>;
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;
    /// Insert or whole-document rewrite
    async fn save_profile(&self, profile: &Profile) -> Result<(), AppError>;
    async fn delete_profile(&self, owner: Uuid) -> Result<bool, AppError>;
}

/// Post collection
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &Post) -> Result<(), AppError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, AppError>;
    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>, AppError>;
    async fn save_post(&self, post: &Post) -> Result<(), AppError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, AppError>;
}

/// The three collections, as handed to the managers
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub posts: Arc<dyn PostStore>,
}

impl Stores {
    /// Serve every collection from one backend
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore + ProfileStore + PostStore + 'static,
    {
        Self {
            users: backend.clone(),
            profiles: backend.clone(),
            posts: backend,
        }
    }

    pub fn memory() -> Self {
        Self::from_backend(Arc::new(memory_store::MemoryStore::new()))
    }
}

/// Load a user, apply `mutate`, and write the whole document back
///
/// The closure's error aborts the write. This is the single read-modify-write
/// path for users, so concurrent writers to the same user are last-writer-wins.
pub async fn modify_user<T, F>(
    store: &dyn UserStore,
    id: Uuid,
    mutate: F,
) -> Result<(User, T), AppError>
where
    F: FnOnce(&mut User) -> Result<T, AppError>,
{
    let mut user = store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let out = mutate(&mut user)?;
    user.updated_at = chrono::Utc::now();
    store.save_user(&user).await?;

    Ok((user, out))
}

/// Profile counterpart of [`modify_user`]
pub async fn modify_profile<T, F>(
    store: &dyn ProfileStore,
    owner: Uuid,
    mutate: F,
) -> Result<(Profile, T), AppError>
where
    F: FnOnce(&mut Profile) -> Result<T, AppError>,
{
    let mut profile = store
        .find_profile(owner)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let out = mutate(&mut profile)?;
    profile.updated_at = chrono::Utc::now();
    store.save_profile(&profile).await?;

    Ok((profile, out))
}

/// Post counterpart of [`modify_user`]
pub async fn modify_post<T, F>(
    store: &dyn PostStore,
    id: Uuid,
    mutate: F,
) -> Result<(Post, T), AppError>
where
    F: FnOnce(&mut Post) -> Result<T, AppError>,
{
    let mut post = store
        .find_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found...".to_string()))?;

    let out = mutate(&mut post)?;
    store.save_post(&post).await?;

    Ok((post, out))
}
