//! Notification routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Notification;
use crate::services::notification::DEFAULT_NOTIFICATION_LIMIT;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/unread", get(list_unread))
        .route("/api/notifications/read-all", post(mark_all_read))
        .route("/api/notifications/{id}/read", post(mark_read))
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<u32>,
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
        .clamp(1, DEFAULT_NOTIFICATION_LIMIT);
    Ok(Json(state.notifications.list(&auth.user_id, limit).await?))
}

async fn list_unread(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.unread(&auth.user_id).await?))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Notification>> {
    Ok(Json(state.notifications.mark_read(&auth.user_id, &id).await?))
}

#[derive(Serialize)]
struct MarkAllReadResponse {
    updated: usize,
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = state.notifications.mark_all_read(&auth.user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
