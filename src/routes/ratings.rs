//! Rating routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Rating;
use crate::services::rating::RateInput;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ratings", post(submit_rating))
        .route("/api/ratings/received", get(list_received))
        .route("/api/ratings/given", get(list_given))
}

async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<RateInput>,
) -> Result<(StatusCode, Json<Rating>)> {
    input.validate()?;
    let rating = state.ratings.rate(&auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

async fn list_received(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.received(&auth.user_id).await?))
}

async fn list_given(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.given(&auth.user_id).await?))
}
