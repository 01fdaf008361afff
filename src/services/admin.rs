//! Admin console: user moderation and platform statistics.

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{NotificationType, PlatformStatistics, Role, User};
use crate::services::notification::NotificationService;
use crate::services::user::require_user;
use crate::time_utils::now_rfc3339;

/// Body of `POST /api/admin/users/{id}/ban`.
#[derive(Debug, Deserialize, Validate)]
pub struct BanInput {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Body of `POST /api/admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleInput {
    pub role: Role,
}

/// Case-insensitive substring match on name or email.
fn matches_query(user: &User, query: &str) -> bool {
    let query = query.to_lowercase();
    user.name.to_lowercase().contains(&query) || user.email.to_lowercase().contains(&query)
}

fn refuse_self(admin_id: &str, user_id: &str, action: &str) -> Result<()> {
    if admin_id == user_id {
        return Err(AppError::BadRequest(format!("Admins cannot {} themselves", action)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AdminService {
    db: FirestoreDb,
    notifications: NotificationService,
}

impl AdminService {
    pub fn new(db: FirestoreDb, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// All users, optionally filtered by name or email, newest first.
    pub async fn list_users(&self, query: Option<&str>) -> Result<Vec<User>> {
        let mut users = self.db.list_all_users().await?;
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            users.retain(|u| matches_query(u, q));
        }
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn ban(&self, admin_id: &str, user_id: &str, reason: &str) -> Result<User> {
        refuse_self(admin_id, user_id, "ban")?;
        let mut user = require_user(&self.db, user_id).await?;

        user.is_banned = true;
        user.banned_reason = Some(reason.trim().to_string());
        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;

        tracing::warn!(admin_id, user_id, reason, "User banned");
        Ok(user)
    }

    pub async fn unban(&self, admin_id: &str, user_id: &str) -> Result<User> {
        let mut user = require_user(&self.db, user_id).await?;
        if !user.is_banned {
            return Ok(user);
        }

        user.is_banned = false;
        user.banned_reason = None;
        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;

        tracing::info!(admin_id, user_id, "User unbanned");
        self.notifications
            .send_logged(NotificationService::compose(
                user_id,
                NotificationType::System,
                "Account restored",
                "Your account has been reinstated",
            ))
            .await;
        Ok(user)
    }

    pub async fn set_role(&self, admin_id: &str, user_id: &str, role: Role) -> Result<User> {
        if role != Role::Admin {
            refuse_self(admin_id, user_id, "demote")?;
        }
        let mut user = require_user(&self.db, user_id).await?;
        if user.role == role {
            return Ok(user);
        }

        user.role = role;
        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;

        tracing::info!(admin_id, user_id, role = ?role, "User role changed");
        Ok(user)
    }

    /// Delete a user's profile and notifications. Returns documents deleted.
    pub async fn delete_user(&self, admin_id: &str, user_id: &str) -> Result<usize> {
        refuse_self(admin_id, user_id, "delete")?;
        require_user(&self.db, user_id).await?;

        let deleted = self.db.delete_user_data(user_id).await?;
        tracing::warn!(admin_id, user_id, deleted, "User deleted");
        Ok(deleted)
    }

    pub async fn statistics(&self) -> Result<PlatformStatistics> {
        let users = self.db.list_all_users().await?;
        let month_key = Utc::now().format("%Y-%m").to_string();
        Ok(PlatformStatistics::from_users(&users, &month_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_matches_name_or_email() {
        let user = User::new("u1", "ada@lovelace.org", "Ada King", "2024-01-01T00:00:00.000Z");
        assert!(matches_query(&user, "king"));
        assert!(matches_query(&user, "LOVELACE"));
        assert!(!matches_query(&user, "babbage"));
    }

    #[test]
    fn test_self_moderation_refused() {
        assert!(matches!(
            refuse_self("a", "a", "ban"),
            Err(AppError::BadRequest(_))
        ));
        assert!(refuse_self("a", "b", "ban").is_ok());
    }

    #[test]
    fn test_ban_requires_reason() {
        let input = BanInput {
            reason: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
