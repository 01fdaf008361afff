// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console routes. Gated by `require_admin` in routes/mod.rs.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{PlatformStatistics, User};
use crate::services::admin::{BanInput, RoleInput};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/stats", get(get_stats))
        .route("/api/admin/users/{id}/ban", post(ban_user))
        .route("/api/admin/users/{id}/unban", post(unban_user))
        .route("/api/admin/users/{id}/role", post(set_role))
        .route("/api/admin/users/{id}", delete(delete_user))
}

#[derive(Deserialize)]
struct UsersQuery {
    q: Option<String>,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersQuery>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.admin.list_users(params.q.as_deref()).await?))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<PlatformStatistics>> {
    Ok(Json(state.admin.statistics().await?))
}

async fn ban_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<BanInput>,
) -> Result<Json<User>> {
    input.validate()?;
    Ok(Json(
        state.admin.ban(&admin.user_id, &id, &input.reason).await?,
    ))
}

async fn unban_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.admin.unban(&admin.user_id, &id).await?))
}

async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<RoleInput>,
) -> Result<Json<User>> {
    Ok(Json(
        state.admin.set_role(&admin.user_id, &id, input.role).await?,
    ))
}

#[derive(Serialize)]
struct DeleteUserResponse {
    deleted_documents: usize,
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>> {
    let deleted_documents = state.admin.delete_user(&admin.user_id, &id).await?;
    Ok(Json(DeleteUserResponse { deleted_documents }))
}
