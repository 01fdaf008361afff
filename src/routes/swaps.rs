// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Swap, SwapRequest, SwapRequestAction, SwapStatus};
use crate::services::swap::{CreateSwapRequest, SwapRequestOutcome};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/swap-requests",
            get(list_swap_requests).post(create_swap_request),
        )
        .route("/api/swap-requests/pending", get(list_pending))
        .route("/api/swap-requests/{id}", get(get_swap_request))
        .route("/api/swap-requests/{id}/accept", post(accept))
        .route("/api/swap-requests/{id}/reject", post(reject))
        .route("/api/swap-requests/{id}/cancel", post(cancel))
        .route("/api/swaps", get(list_swaps))
        .route("/api/swaps/{id}", get(get_swap))
}

async fn create_swap_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<CreateSwapRequest>,
) -> Result<(StatusCode, Json<SwapRequest>)> {
    input.validate()?;
    let request = state.swaps.create_request(&auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_swap_requests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<SwapRequest>>> {
    Ok(Json(state.swaps.list_for_user(&auth.user_id).await?))
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<SwapRequest>>> {
    Ok(Json(state.swaps.pending_for_user(&auth.user_id).await?))
}

async fn get_swap_request(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequest>> {
    Ok(Json(state.swaps.get_request_for(&id, &auth.user_id).await?))
}

async fn respond(
    state: &AppState,
    auth: &AuthUser,
    id: &str,
    action: SwapRequestAction,
) -> Result<Json<SwapRequestOutcome>> {
    Ok(Json(state.swaps.respond(id, &auth.user_id, action).await?))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestOutcome>> {
    respond(&state, &auth, &id, SwapRequestAction::Accept).await
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestOutcome>> {
    respond(&state, &auth, &id, SwapRequestAction::Reject).await
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestOutcome>> {
    respond(&state, &auth, &id, SwapRequestAction::Cancel).await
}

async fn get_swap(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Swap>> {
    Ok(Json(state.swaps.get_swap_for(&id, &auth.user_id).await?))
}

#[derive(Debug, Deserialize)]
struct SwapsQuery {
    status: Option<SwapStatus>,
}

async fn list_swaps(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<SwapsQuery>,
) -> Result<Json<Vec<Swap>>> {
    Ok(Json(
        state.swaps.list_swaps(&auth.user_id, params.status).await?,
    ))
}
