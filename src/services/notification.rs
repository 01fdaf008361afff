//! Notification delivery: store in Firestore, then push to live connections.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Notification, NotificationType};
use crate::services::live::{LiveEvent, LiveHub};
use crate::time_utils::now_rfc3339;

/// Default page size for the notification list.
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct NotificationService {
    db: FirestoreDb,
    live: LiveHub,
}

impl NotificationService {
    pub fn new(db: FirestoreDb, live: LiveHub) -> Self {
        Self { db, live }
    }

    /// Build a notification with a fresh ID.
    pub fn compose(
        user_id: &str,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        Notification::new(
            uuid::Uuid::new_v4().to_string(),
            user_id,
            kind,
            title,
            message,
            &now_rfc3339(),
        )
    }

    /// Store a notification and push it to the recipient's live connections.
    pub async fn send(&self, notification: Notification) -> Result<Notification> {
        self.db.set_notification(&notification).await?;

        let receivers = self.live.publish(
            &notification.user_id,
            LiveEvent::Notification {
                notification: notification.clone(),
            },
        );
        tracing::debug!(
            user_id = %notification.user_id,
            kind = ?notification.kind,
            receivers,
            "Notification sent"
        );

        Ok(notification)
    }

    /// Send a notification that follows an already committed write.
    ///
    /// The primary write is not rolled back, so a failure here is only logged.
    pub async fn send_logged(&self, notification: Notification) {
        let user_id = notification.user_id.clone();
        if let Err(e) = self.send(notification).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to send notification");
        }
    }

    pub async fn list(&self, user_id: &str, limit: u32) -> Result<Vec<Notification>> {
        self.db.list_notifications(user_id, limit).await
    }

    pub async fn unread(&self, user_id: &str) -> Result<Vec<Notification>> {
        let mut notifications = self.db.list_unread_notifications(user_id).await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<Notification> {
        let mut notification = self
            .db
            .get_notification(notification_id)
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Notification {} not found", notification_id))
            })?;

        if notification.mark_read(&now_rfc3339()) {
            self.db.set_notification(&notification).await?;
        }
        Ok(notification)
    }

    /// Mark every unread notification of the user read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        let now = now_rfc3339();
        let mut unread = self.db.list_unread_notifications(user_id).await?;
        unread.retain_mut(|n| n.mark_read(&now));

        self.db.batch_set_notifications(&unread).await?;
        tracing::info!(user_id, count = unread.len(), "Marked notifications read");
        Ok(unread.len())
    }
}
