// Profile endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::extract::ApiJson;
use crate::api::handlers::parse_id;
use crate::api::responses::{ApiError, MessageResponse};
use crate::api::AppState;
use crate::auth::auth_middleware::AuthContext;
use crate::core::models::{Profile, ProfileView};
use crate::engine::profile_manager::{parse_entry, EducationFields, ExperienceFields, ProfileFields};

/// GET /api/profile/me
pub async fn my_profile_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileView>, ApiError> {
    let view = app_state.profiles.get_profile_view(auth.user.id).await?;
    Ok(Json(view))
}

/// POST /api/profile
pub async fn upsert_profile_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(fields): ApiJson<ProfileFields>,
) -> Result<Json<Profile>, ApiError> {
    let profile = app_state
        .profiles
        .upsert_profile(auth.user.id, fields)
        .await?;
    Ok(Json(profile))
}

/// GET /api/profiles
pub async fn list_profiles_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProfileView>>, ApiError> {
    Ok(Json(app_state.profiles.list_profiles().await?))
}

/// GET /api/profileById/:id
pub async fn profile_by_id_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let owner = parse_id(&id, "Profile not found")?;
    Ok(Json(app_state.profiles.get_profile_view(owner).await?))
}

/// DELETE /api/profile/me
///
/// Closes the whole account, the profile going with it.
pub async fn delete_my_profile_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    app_state.credentials.delete_account(auth.user.id).await?;
    Ok(Json(MessageResponse::new("Successfully deleted account")))
}

/// PATCH /api/profile/me/experience
pub async fn add_experience_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<ProfileView>, ApiError> {
    let fields: ExperienceFields = parse_entry(body)?;
    let profile = app_state
        .profiles
        .add_experience(auth.user.id, fields)
        .await?;
    Ok(Json(app_state.profiles.with_owner(profile).await?))
}

/// DELETE /api/profile/me/experience/:id
pub async fn remove_experience_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = app_state
        .profiles
        .remove_experience(auth.user.id, &entry_id)
        .await?;
    Ok(Json(app_state.profiles.with_owner(profile).await?))
}

/// PATCH /api/profile/me/education
pub async fn add_education_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<ProfileView>, ApiError> {
    let fields: EducationFields = parse_entry(body)?;
    let profile = app_state
        .profiles
        .add_education(auth.user.id, fields)
        .await?;
    Ok(Json(app_state.profiles.with_owner(profile).await?))
}

/// DELETE /api/profile/me/education/:id
pub async fn remove_education_handler(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(entry_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = app_state
        .profiles
        .remove_education(auth.user.id, &entry_id)
        .await?;
    Ok(Json(app_state.profiles.with_owner(profile).await?))
}

/// GET /api/profile/github/:username
pub async fn github_repos_handler(
    State(app_state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repos = app_state.repo_lookup.list_repos(&username).await?;
    Ok(Json(repos))
}
