// Post, like and comment endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::ApiJson;
use crate::api::handlers::parse_id;
use crate::api::responses::{ApiError, MessageResponse};
use crate::api::AppState;
use crate::auth::auth_middleware::AuthContext;
use crate::core::models::{Comment, Like, Post};
use crate::engine::post_manager::POST_NOT_FOUND_MESSAGE;

#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

fn post_id(raw: &str) -> Result<Uuid, ApiError> {
    Ok(parse_id(raw, POST_NOT_FOUND_MESSAGE)?)
}

/// POST /api/posts
pub async fn create_post_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = app_state
        .posts
        .create_post(&auth.user, request.text.as_deref())
        .await?;
    app_state.metrics.posts_created.inc();

    Ok(Json(post))
}

/// GET /api/posts/post/:id
pub async fn get_post_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(app_state.posts.get_post(post_id(&id)?).await?))
}

/// GET /api/posts/all
pub async fn list_posts_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(app_state.posts.list_posts().await?))
}

/// DELETE /api/posts/delete/:id
pub async fn delete_post_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state
        .posts
        .delete_post(post_id(&id)?, auth.user.id)
        .await?;
    Ok(Json(MessageResponse::new("Post successfully deleted")))
}

/// PATCH /api/posts/like/:id
pub async fn like_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    Ok(Json(app_state.posts.like(post_id(&id)?, auth.user.id).await?))
}

/// PATCH /api/posts/unlike/:id
pub async fn unlike_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    Ok(Json(app_state.posts.unlike(post_id(&id)?, auth.user.id).await?))
}

/// POST /api/posts/comment/:id
pub async fn add_comment_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = app_state
        .posts
        .add_comment(post_id(&id)?, &auth.user, request.text.as_deref())
        .await?;
    Ok(Json(comments))
}

/// DELETE /api/posts/comment/:id/:comment_id
pub async fn delete_comment_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Uuid>, ApiError> {
    let removed = app_state
        .posts
        .delete_comment(post_id(&id)?, &comment_id, auth.user.id)
        .await?;
    Ok(Json(removed))
}

/// PATCH /api/comment/edit/:id/:comment_id
pub async fn edit_comment_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, comment_id)): Path<(String, String)>,
    body: Option<ApiJson<TextRequest>>,
) -> Result<Json<Comment>, ApiError> {
    // An absent or unreadable body is an edit without text
    let text = body.and_then(|ApiJson(request)| request.text);
    let comment = app_state
        .posts
        .edit_comment(post_id(&id)?, &comment_id, auth.user.id, text.as_deref())
        .await?;
    Ok(Json(comment))
}
