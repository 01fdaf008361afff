//! In-app notification model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum NotificationType {
    #[serde(rename = "New Match")]
    NewMatch,
    #[serde(rename = "Swap Request")]
    SwapRequest,
    #[serde(rename = "Request Accepted")]
    RequestAccepted,
    #[serde(rename = "Request Rejected")]
    RequestRejected,
    #[serde(rename = "New Message")]
    NewMessage,
    #[serde(rename = "Session Reminder")]
    SessionReminder,
    #[serde(rename = "Session Completed")]
    SessionCompleted,
    #[serde(rename = "Rating Received")]
    RatingReceived,
    System,
}

/// Notification stored in Firestore (`notifications/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Notification {
    pub id: String,
    /// Recipient
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_item_id: Option<String>,
    pub related_user_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: String,
    pub read_at: Option<String>,
}

impl Notification {
    pub fn new(
        id: String,
        user_id: &str,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        now: &str,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            related_item_id: None,
            related_user_id: None,
            is_read: false,
            created_at: now.to_string(),
            read_at: None,
        }
    }

    /// Link the notification to the item and user it is about.
    pub fn about(mut self, item_id: &str, user_id: &str) -> Self {
        self.related_item_id = Some(item_id.to_string());
        self.related_user_id = Some(user_id.to_string());
        self
    }

    /// Mark as read. Returns `false` if it already was.
    pub fn mark_read(&mut self, now: &str) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_stamps_once() {
        let mut n = Notification::new(
            "n1".to_string(),
            "alice",
            NotificationType::RequestAccepted,
            "Request accepted",
            "Bob accepted your swap request",
            "2024-01-01T00:00:00.000Z",
        )
        .about("req-1", "bob");

        assert!(n.mark_read("2024-01-02T00:00:00.000Z"));
        assert!(!n.mark_read("2024-01-03T00:00:00.000Z"));
        assert_eq!(n.read_at.as_deref(), Some("2024-01-02T00:00:00.000Z"));
        assert_eq!(n.related_user_id.as_deref(), Some("bob"));
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let n = Notification::new(
            "n1".to_string(),
            "alice",
            NotificationType::NewMessage,
            "t",
            "m",
            "2024-01-01T00:00:00.000Z",
        );
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "New Message");
    }
}
