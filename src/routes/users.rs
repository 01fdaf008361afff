// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, profile and skill routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{PublicProfile, Rating, User};
use crate::services::user::{
    OnboardingInput, ProfileUpdate, RegisterInput, SkillInput, SkillList,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/me/onboarding", post(complete_onboarding))
        .route("/api/me/skills/{list}", post(add_skill))
        .route("/api/me/skills/{list}/{skill_id}", delete(remove_skill))
        .route("/api/users/search", get(search_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/ratings", get(get_user_ratings))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<User>> {
    input.validate()?;
    Ok(Json(state.users.register(&auth.user_id, input).await?))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get(&auth.user_id).await?))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    update.validate()?;
    Ok(Json(state.users.update_profile(&auth.user_id, update).await?))
}

async fn complete_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<OnboardingInput>,
) -> Result<Json<User>> {
    input.validate()?;
    Ok(Json(
        state.users.complete_onboarding(&auth.user_id, input).await?,
    ))
}

async fn add_skill(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(list): Path<SkillList>,
    Json(input): Json<SkillInput>,
) -> Result<Json<User>> {
    input.validate()?;
    Ok(Json(state.users.add_skill(&auth.user_id, list, input).await?))
}

async fn remove_skill(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((list, skill_id)): Path<(SkillList, String)>,
) -> Result<Json<User>> {
    Ok(Json(
        state
            .users
            .remove_skill(&auth.user_id, list, &skill_id)
            .await?,
    ))
}

/// Another user's public profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PublicProfile>> {
    let user = state.users.get(&id).await?;
    if user.is_banned {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }
    Ok(Json(PublicProfile::from(&user)))
}

async fn get_user_ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.received(&id).await?))
}

#[derive(Deserialize)]
struct SearchQuery {
    skill: String,
}

async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PublicProfile>>> {
    Ok(Json(state.matching.search(&params.skill).await?))
}
