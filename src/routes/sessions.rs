//! Session routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::session::{ScheduleSessionInput, SessionView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(schedule_session))
        .route("/api/sessions/upcoming", get(list_upcoming))
        .route("/api/sessions/{id}/start", post(start_session))
        .route("/api/sessions/{id}/complete", post(complete_session))
        .route("/api/sessions/{id}/cancel", post(cancel_session))
}

fn views(sessions: Vec<crate::models::Session>) -> Json<Vec<SessionView>> {
    Json(sessions.into_iter().map(SessionView::from).collect())
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<SessionView>>> {
    Ok(views(state.sessions.list(&auth.user_id).await?))
}

async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<SessionView>>> {
    Ok(views(state.sessions.upcoming(&auth.user_id).await?))
}

async fn schedule_session(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<ScheduleSessionInput>,
) -> Result<(StatusCode, Json<SessionView>)> {
    input.validate()?;
    let session = state.sessions.schedule(&auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.sessions.start(&id, &auth.user_id).await?.into()))
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.sessions.complete(&id, &auth.user_id).await?.into()))
}

async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.sessions.cancel(&id, &auth.user_id).await?.into()))
}
