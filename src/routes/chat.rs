// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversation and message routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Conversation, Message};
use crate::services::chat::SendMessageInput;
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
            "/api/conversations",
            get(list_conversations).post(start_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route(
            "/api/conversations/{id}/messages/{message_id}/read",
            post(mark_read),
        )
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Conversation>>> {
    Ok(Json(state.chat.list_conversations(&auth.user_id).await?))
}

#[derive(Deserialize)]
struct StartConversation {
    swap_request_id: String,
}

/// Open (or reopen) the conversation for an accepted swap request.
async fn start_conversation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<StartConversation>,
) -> Result<Json<Conversation>> {
    Ok(Json(
        state
            .chat
            .start_from_request(&auth.user_id, &body.swap_request_id)
            .await?,
    ))
}

#[derive(Deserialize)]
struct MessagesQuery {
    limit: Option<u32>,
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(
        state
            .chat
            .list_messages(&id, &auth.user_id, params.limit)
            .await?,
    ))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Message>)> {
    input.validate()?;
    let message = state.chat.send_message(&id, &auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, message_id)): Path<(String, String)>,
) -> Result<Json<Message>> {
    Ok(Json(
        state
            .chat
            .mark_read(&id, &message_id, &auth.user_id)
            .await?,
    ))
}
