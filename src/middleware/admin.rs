//! Admin gate for the moderation routes.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::user::require_user;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;

/// Let the request through only if the caller's profile has the admin role.
///
/// Must run after [`require_auth`](crate::middleware::auth::require_auth).
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = require_user(&state.db, &auth.user_id).await?;
    if !user.is_admin() || user.is_banned {
        tracing::warn!(user_id = %auth.user_id, "Non-admin tried an admin route");
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }
    Ok(next.run(request).await)
}
