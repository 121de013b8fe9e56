// In-memory document store used when no DATABASE_URL is configured

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::errors::AppError;
use crate::core::models::{Post, Profile, User};
use crate::state::{PostStore, ProfileStore, UserStore};

/// Process-local store implementing all three collections
///
/// Documents are cloned in and out, so callers never hold references into
/// the maps. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Uuid) -> bool {
    users.values().any(|u| u.id != except && u.email == email)
}

fn duplicate_email() -> AppError {
    AppError::Validation("Email is already registered".to_string())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(duplicate_email());
        }
        if users.contains_key(&user.id) {
            return Err(AppError::Store(format!("Duplicate user id {}", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if email_taken(&users, &user.email, user.id) {
            return Err(duplicate_email());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, owner: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.read().await.get(&owner).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let mut profiles: Vec<Profile> = self.profiles.read().await.values().cloned().collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.profiles
            .write()
            .await
            .insert(profile.owner, profile.clone());
        Ok(())
    }

    async fn delete_profile(&self, owner: Uuid) -> Result<bool, AppError> {
        Ok(self.profiles.write().await.remove(&owner).is_some())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        let mut posts = self.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(AppError::NotFound("Post not found...".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
