//! Match routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::PublicProfile;
use crate::services::matching::{ScoredMatch, DEFAULT_RECOMMENDED_LIMIT, DEFAULT_SUGGESTED_LIMIT};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound on `?limit=` for match lists.
const MAX_MATCH_LIMIT: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/matches", get(get_matches))
        .route("/api/matches/recommended", get(get_recommended))
        .route("/api/matches/suggested", get(get_suggested))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_MATCH_LIMIT)
    }
}

async fn get_matches(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ScoredMatch>>> {
    Ok(Json(state.matching.find_matches(&auth.user_id).await?))
}

async fn get_recommended(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ScoredMatch>>> {
    let limit = params.or(DEFAULT_RECOMMENDED_LIMIT);
    Ok(Json(state.matching.recommended(&auth.user_id, limit).await?))
}

async fn get_suggested(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<PublicProfile>>> {
    let limit = params.or(DEFAULT_SUGGESTED_LIMIT);
    Ok(Json(state.matching.suggested(&auth.user_id, limit).await?))
}
