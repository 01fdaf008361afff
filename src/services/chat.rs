// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversations between swap partners and their messages.

use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    conversation_id_for, Conversation, Message, NotificationType, SwapRequestStatus,
};
use crate::services::live::{LiveEvent, LiveHub};
use crate::services::notification::NotificationService;
use crate::time_utils::now_rfc3339;

pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;
pub const MAX_MESSAGE_LIMIT: u32 = 100;
pub const MAX_MESSAGE_LENGTH: usize = 2000;
/// Characters of the last message kept on the conversation preview.
const PREVIEW_CHARS: usize = 100;

/// Body of `POST /api/conversations/{id}/messages`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageInput {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[validate(url)]
    pub attachment_url: Option<String>,
    #[validate(length(max = 64))]
    pub attachment_type: Option<String>,
}

/// Clamp a requested page size to `1..=MAX_MESSAGE_LIMIT`.
pub fn clamp_message_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT)
}

fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

#[derive(Clone)]
pub struct ChatService {
    db: FirestoreDb,
    live: LiveHub,
    notifications: NotificationService,
}

impl ChatService {
    pub fn new(db: FirestoreDb, live: LiveHub, notifications: NotificationService) -> Self {
        Self {
            db,
            live,
            notifications,
        }
    }

    /// Return the pair's conversation, creating it on first use.
    ///
    /// The document ID comes from the sorted participant IDs, so two racing
    /// callers write the same document instead of creating duplicates.
    pub async fn get_or_create_conversation(
        &self,
        (a_id, a_name): (&str, &str),
        (b_id, b_name): (&str, &str),
        swap_request_id: Option<&str>,
    ) -> Result<Conversation> {
        let id = conversation_id_for(a_id, b_id);

        if let Some(mut existing) = self.db.get_conversation(&id).await? {
            if existing.swap_request_id.is_none() && swap_request_id.is_some() {
                existing.swap_request_id = swap_request_id.map(str::to_string);
                existing.updated_at = now_rfc3339();
                self.db.set_conversation(&existing).await?;
            }
            return Ok(existing);
        }

        let now = now_rfc3339();
        let conversation = Conversation {
            id,
            participant_ids: vec![a_id.to_string(), b_id.to_string()],
            participant_names: vec![a_name.to_string(), b_name.to_string()],
            swap_request_id: swap_request_id.map(str::to_string),
            last_message: None,
            last_message_time: None,
            unread_by: vec![a_id.to_string(), b_id.to_string()],
            created_at: now.clone(),
            updated_at: now,
        };
        self.db.set_conversation(&conversation).await?;

        tracing::info!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    /// Open the conversation for an accepted request the user is part of.
    pub async fn start_from_request(
        &self,
        user_id: &str,
        swap_request_id: &str,
    ) -> Result<Conversation> {
        let request = self
            .db
            .get_swap_request(swap_request_id)
            .await?
            .filter(|r| r.involves(user_id))
            .ok_or_else(|| {
                AppError::NotFound(format!("Swap request {} not found", swap_request_id))
            })?;

        if request.status != SwapRequestStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "Swap request is {}, not Accepted",
                request.status
            )));
        }

        self.get_or_create_conversation(
            (&request.sender_id, &request.sender_name),
            (&request.recipient_id, &request.recipient_name),
            Some(&request.id),
        )
        .await
    }

    async fn conversation_for(&self, conversation_id: &str, user_id: &str) -> Result<Conversation> {
        self.db
            .get_conversation(conversation_id)
            .await?
            .filter(|c| c.involves(user_id))
            .ok_or_else(|| {
                AppError::NotFound(format!("Conversation {} not found", conversation_id))
            })
    }

    /// Conversations of a user, most recently active first.
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut conversations = self.db.list_conversations_for_user(user_id).await?;
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    pub async fn list_messages(
        &self,
        conversation_id: &str,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Message>> {
        self.conversation_for(conversation_id, user_id).await?;
        self.db
            .list_messages(conversation_id, clamp_message_limit(limit))
            .await
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        input: SendMessageInput,
    ) -> Result<Message> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::BadRequest("Message is empty".to_string()));
        }

        let mut conversation = self.conversation_for(conversation_id, sender_id).await?;
        let sender_name = conversation
            .participant_ids
            .iter()
            .position(|id| id == sender_id)
            .and_then(|i| conversation.participant_names.get(i))
            .cloned()
            .unwrap_or_default();

        let now = now_rfc3339();
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            sender_id: sender_id.to_string(),
            sender_name: sender_name.clone(),
            content,
            attachment_url: input.attachment_url,
            attachment_type: input.attachment_type,
            is_read: false,
            read_by: vec![sender_id.to_string()],
            created_at: now.clone(),
            edited_at: None,
        };
        self.db.set_message(&message).await?;

        let recipient_id = conversation.other_participant(sender_id).map(str::to_string);

        conversation.last_message = Some(preview(&message.content));
        conversation.last_message_time = Some(now.clone());
        conversation.updated_at = now;
        conversation.unread_by.retain(|id| id != sender_id);
        if let Some(recipient) = &recipient_id {
            if !conversation.unread_by.contains(recipient) {
                conversation.unread_by.push(recipient.clone());
            }
        }
        self.db.set_conversation(&conversation).await?;

        for user_id in &conversation.participant_ids {
            self.live.publish(
                user_id,
                LiveEvent::MessageCreated {
                    message: message.clone(),
                },
            );
        }

        if let Some(recipient) = recipient_id {
            self.notifications
                .send_logged(
                    NotificationService::compose(
                        &recipient,
                        NotificationType::NewMessage,
                        format!("New message from {}", sender_name),
                        preview(&message.content),
                    )
                    .about(&conversation.id, sender_id),
                )
                .await;
        }

        tracing::debug!(conversation_id, message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// Record that `reader_id` read a message and clear their unread flag.
    pub async fn mark_read(
        &self,
        conversation_id: &str,
        message_id: &str,
        reader_id: &str,
    ) -> Result<Message> {
        let mut conversation = self.conversation_for(conversation_id, reader_id).await?;
        let mut message = self
            .db
            .get_message(conversation_id, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;

        if message.mark_read_by(reader_id) {
            self.db.set_message(&message).await?;
        }

        let before = conversation.unread_by.len();
        conversation.unread_by.retain(|id| id != reader_id);
        if conversation.unread_by.len() != before {
            self.db.set_conversation(&conversation).await?;
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(clamp_message_limit(None), DEFAULT_MESSAGE_LIMIT);
        assert_eq!(clamp_message_limit(Some(0)), 1);
        assert_eq!(clamp_message_limit(Some(500)), MAX_MESSAGE_LIMIT);
        assert_eq!(clamp_message_limit(Some(20)), 20);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("hi"), "hi");
    }

    #[test]
    fn test_message_length_bounds() {
        let too_long = SendMessageInput {
            content: "x".repeat(MAX_MESSAGE_LENGTH + 1),
            attachment_url: None,
            attachment_type: None,
        };
        assert!(too_long.validate().is_err());

        let empty = SendMessageInput {
            content: String::new(),
            attachment_url: None,
            attachment_type: None,
        };
        assert!(empty.validate().is_err());
    }
}
