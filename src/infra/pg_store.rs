// Postgres-backed document store: one JSONB document per row

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::core::errors::AppError;
use crate::core::models::{Post, Profile, User};
use crate::state::{PostStore, ProfileStore, UserStore};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        doc JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS profiles (
        owner UUID PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL,
        doc JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id UUID PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL,
        doc JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS posts_created_at_idx ON posts (created_at DESC)",
    "CREATE TABLE IF NOT EXISTS auth_audit_log (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID,
        event_type TEXT NOT NULL,
        ip_address TEXT,
        user_agent TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
];

#[derive(FromRow)]
struct UserRow {
    doc: Json<User>,
}

#[derive(FromRow)]
struct ProfileRow {
    doc: Json<Profile>,
}

#[derive(FromRow)]
struct PostRow {
    doc: Json<Post>,
}

/// Document store over a Postgres pool
///
/// Embedded arrays (tokens, experience, likes, comments) are never updated in
/// place: every save rewrites the whole document.
#[derive(Clone)]
pub struct PgDocumentStore {
    db_pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let db_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { db_pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }

    /// Create tables and indexes if they do not exist
    pub async fn migrate(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.db_pool).await?;
        }
        info!(statements = SCHEMA.len(), "Database schema ensured");
        Ok(())
    }
}

fn map_user_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::Validation("Email is already registered".to_string());
        }
    }
    AppError::from(err)
}

#[async_trait]
impl UserStore for PgDocumentStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users (id, email, doc) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.email)
            .bind(Json(user))
            .execute(&self.db_pool)
            .await
            .map_err(map_user_write_error)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT doc FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.map(|r| r.doc.0))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT doc FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.map(|r| r.doc.0))
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET email = $2, doc = $3 WHERE id = $1")
            .bind(user.id)
            .bind(&user.email)
            .bind(Json(user))
            .execute(&self.db_pool)
            .await
            .map_err(map_user_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgDocumentStore {
    async fn find_profile(&self, owner: Uuid) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT doc FROM profiles WHERE owner = $1")
            .bind(owner)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.map(|r| r.doc.0))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let rows = sqlx::query_as::<_, ProfileRow>("SELECT doc FROM profiles ORDER BY created_at")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.doc.0).collect())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO profiles (owner, created_at, doc) VALUES ($1, $2, $3)
             ON CONFLICT (owner) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(profile.owner)
        .bind(profile.created_at)
        .bind(Json(profile))
        .execute(&self.db_pool)
        .await?;
        Ok(())
    }

    async fn delete_profile(&self, owner: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE owner = $1")
            .bind(owner)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PostStore for PgDocumentStore {
    async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query("INSERT INTO posts (id, created_at, doc) VALUES ($1, $2, $3)")
            .bind(post.id)
            .bind(post.date)
            .bind(Json(post))
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>("SELECT doc FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.map(|r| r.doc.0))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>("SELECT doc FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.doc.0).collect())
    }

    async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE posts SET doc = $2 WHERE id = $1")
            .bind(post.id)
            .bind(Json(post))
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found...".to_string()));
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
