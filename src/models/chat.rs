//! Conversation and message models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Conversation between two users (`conversations/{id}`).
///
/// The document ID is derived from the participant pair, see
/// [`conversation_id_for`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Conversation {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub participant_names: Vec<String>,
    pub swap_request_id: Option<String>,
    pub last_message: Option<String>,
    pub last_message_time: Option<String>,
    /// Participants with unread messages
    #[serde(default)]
    pub unread_by: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn involves(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }

    /// The first participant that is not `user_id`.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        self.participant_ids
            .iter()
            .map(String::as_str)
            .find(|id| *id != user_id)
    }
}

/// Deterministic conversation ID for a pair of users, independent of order.
pub fn conversation_id_for(user_a: &str, user_b: &str) -> String {
    let (first, second) = if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    format!("{}__{}", first, second)
}

/// Message stored at `conversations/{conversation_id}/messages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_type: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub read_by: Vec<String>,
    pub created_at: String,
    pub edited_at: Option<String>,
}

impl Message {
    /// Record that `user_id` read the message. Returns `false` if already recorded.
    pub fn mark_read_by(&mut self, user_id: &str) -> bool {
        if self.read_by.iter().any(|id| id == user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        self.is_read = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_is_order_independent() {
        assert_eq!(
            conversation_id_for("alice", "bob"),
            conversation_id_for("bob", "alice")
        );
        assert_eq!(conversation_id_for("bob", "alice"), "alice__bob");
    }

    #[test]
    fn test_mark_read_by_is_idempotent() {
        let mut message = Message {
            id: "m1".to_string(),
            conversation_id: "alice__bob".to_string(),
            sender_id: "alice".to_string(),
            sender_name: "Alice".to_string(),
            content: "hi".to_string(),
            attachment_url: None,
            attachment_type: None,
            is_read: false,
            read_by: vec![],
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            edited_at: None,
        };
        assert!(message.mark_read_by("bob"));
        assert!(!message.mark_read_by("bob"));
        assert!(message.is_read);
        assert_eq!(message.read_by, vec!["bob".to_string()]);
    }
}
