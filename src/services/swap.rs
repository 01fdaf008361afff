// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request lifecycle.
//!
//! 1. A sender proposes a skill exchange to a recipient (Pending)
//! 2. The recipient accepts or rejects, or the sender cancels
//! 3. Acceptance creates the [`Swap`] and opens the pair's conversation
//!
//! The status change itself runs in a Firestore transaction. The follow-up
//! writes (swap, conversation, notifications) are not rolled back if they
//! fail after the status commit.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    NotificationType, SessionType, Skill, Swap, SwapRequest, SwapRequestAction, SwapRequestStatus,
    SwapStatus, User,
};
use crate::services::chat::ChatService;
use crate::services::notification::NotificationService;
use crate::services::user::require_user;
use crate::time_utils::now_rfc3339;

/// Body of `POST /api/swap-requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSwapRequest {
    #[validate(length(min = 1, max = 128))]
    pub recipient_id: String,
    /// One of the sender's taught skills; defaults to the first the recipient wants
    pub skill_offered_id: Option<String>,
    /// One of the recipient's taught skills; defaults to the first the sender wants
    pub skill_requested_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub message: String,
    #[serde(default)]
    pub session_type: SessionType,
    #[validate(length(max = 32))]
    pub proposed_date: Option<String>,
    #[validate(length(max = 32))]
    pub proposed_time: Option<String>,
}

/// Result of answering a request.
#[derive(Debug, Serialize)]
pub struct SwapRequestOutcome {
    pub request: SwapRequest,
    /// Present when the request was accepted
    pub swap: Option<Swap>,
}

/// Pick a skill from `teacher`'s list: the one with `id`, or else the first
/// one `learner` wants to learn.
fn choose_skill(teacher: &User, learner: &User, id: Option<&str>) -> Result<Skill> {
    let skill = match id {
        Some(id) => teacher.skills_i_teach.iter().find(|s| s.id == id).ok_or_else(|| {
            AppError::BadRequest(format!("{} does not teach skill {}", teacher.name, id))
        })?,
        None => teacher
            .skills_i_teach
            .iter()
            .find(|s| learner.wants_to_learn(&s.name))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "{} teaches nothing {} wants to learn",
                    teacher.name, learner.name
                ))
            })?,
    };
    Ok(skill.clone())
}

/// Keep swaps in `status` (all when `None`), newest first.
fn select_swaps(mut swaps: Vec<Swap>, status: Option<SwapStatus>) -> Vec<Swap> {
    if let Some(status) = status {
        swaps.retain(|s| s.status == status);
    }
    swaps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    swaps
}

#[derive(Clone)]
pub struct SwapService {
    db: FirestoreDb,
    chat: ChatService,
    notifications: NotificationService,
}

impl SwapService {
    pub fn new(db: FirestoreDb, chat: ChatService, notifications: NotificationService) -> Self {
        Self {
            db,
            chat,
            notifications,
        }
    }

    /// Create a pending request from `sender_id`.
    pub async fn create_request(
        &self,
        sender_id: &str,
        input: CreateSwapRequest,
    ) -> Result<SwapRequest> {
        if input.recipient_id == sender_id {
            return Err(AppError::BadRequest(
                "Cannot send a swap request to yourself".to_string(),
            ));
        }

        let sender = require_user(&self.db, sender_id).await?;
        if sender.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }
        if !sender.is_onboarding_complete {
            return Err(AppError::Forbidden(
                "Complete onboarding before sending requests".to_string(),
            ));
        }

        let recipient = require_user(&self.db, &input.recipient_id).await?;
        if recipient.is_banned || !recipient.is_active {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                input.recipient_id
            )));
        }

        let skill_offered = choose_skill(&sender, &recipient, input.skill_offered_id.as_deref())?;
        let skill_requested =
            choose_skill(&recipient, &sender, input.skill_requested_id.as_deref())?;

        let request = SwapRequest {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            recipient_id: recipient.id.clone(),
            recipient_name: recipient.name.clone(),
            skill_offered,
            skill_requested,
            message: input.message,
            session_type: input.session_type,
            proposed_date: input.proposed_date,
            proposed_time: input.proposed_time,
            status: SwapRequestStatus::Pending,
            conversation_id: None,
            swap_id: None,
            created_at: now_rfc3339(),
            responded_at: None,
            completed_at: None,
        };
        self.db.set_swap_request(&request).await?;

        tracing::info!(
            swap_request_id = %request.id,
            sender_id = %request.sender_id,
            recipient_id = %request.recipient_id,
            "Swap request created"
        );

        self.notifications
            .send_logged(
                NotificationService::compose(
                    &recipient.id,
                    NotificationType::SwapRequest,
                    "New swap request",
                    format!(
                        "{} wants to swap {} for {}",
                        sender.name, request.skill_offered.name, request.skill_requested.name
                    ),
                )
                .about(&request.id, &sender.id),
            )
            .await;

        Ok(request)
    }

    /// Accept, reject or cancel a request on behalf of `actor_id`.
    pub async fn respond(
        &self,
        request_id: &str,
        actor_id: &str,
        action: SwapRequestAction,
    ) -> Result<SwapRequestOutcome> {
        let now = now_rfc3339();
        let mut request = self
            .db
            .apply_swap_request_action_atomic(request_id, actor_id, action, &now)
            .await?;

        match action {
            SwapRequestAction::Accept => {
                let swap_id = uuid::Uuid::new_v4().to_string();
                let swap = Swap::from_accepted_request(swap_id, &request, &now);
                self.db.set_swap(&swap).await?;

                let conversation = self
                    .chat
                    .get_or_create_conversation(
                        (&request.sender_id, &request.sender_name),
                        (&request.recipient_id, &request.recipient_name),
                        Some(&request.id),
                    )
                    .await?;

                request.swap_id = Some(swap.id.clone());
                request.conversation_id = Some(conversation.id.clone());
                self.db.set_swap_request(&request).await?;

                tracing::info!(
                    swap_request_id = request_id,
                    swap_id = %swap.id,
                    conversation_id = %conversation.id,
                    "Swap created from accepted request"
                );

                self.notifications
                    .send_logged(
                        NotificationService::compose(
                            &request.sender_id,
                            NotificationType::RequestAccepted,
                            "Swap request accepted",
                            format!("{} accepted your swap request", request.recipient_name),
                        )
                        .about(&swap.id, &request.recipient_id),
                    )
                    .await;

                Ok(SwapRequestOutcome {
                    request,
                    swap: Some(swap),
                })
            }
            SwapRequestAction::Reject => {
                self.notifications
                    .send_logged(
                        NotificationService::compose(
                            &request.sender_id,
                            NotificationType::RequestRejected,
                            "Swap request declined",
                            format!("{} declined your swap request", request.recipient_name),
                        )
                        .about(&request.id, &request.recipient_id),
                    )
                    .await;
                Ok(SwapRequestOutcome {
                    request,
                    swap: None,
                })
            }
            SwapRequestAction::Cancel => Ok(SwapRequestOutcome {
                request,
                swap: None,
            }),
        }
    }

    /// Every request the user sent or received, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<SwapRequest>> {
        let (sent, received) = tokio::try_join!(
            self.db.list_swap_requests_sent(user_id),
            self.db.list_swap_requests_received(user_id),
        )?;

        let mut requests: Vec<SwapRequest> = sent.into_iter().chain(received).collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Pending requests waiting for the user's answer.
    pub async fn pending_for_user(&self, user_id: &str) -> Result<Vec<SwapRequest>> {
        self.db.list_pending_swap_requests(user_id).await
    }

    /// A single request the user sent or received.
    pub async fn get_request_for(&self, request_id: &str, user_id: &str) -> Result<SwapRequest> {
        self.db
            .get_swap_request(request_id)
            .await?
            .filter(|r| r.involves(user_id))
            .ok_or_else(|| AppError::NotFound(format!("Swap request {} not found", request_id)))
    }

    /// Swaps the user takes part in, optionally only those in `status`.
    pub async fn list_swaps(
        &self,
        user_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<Swap>> {
        let swaps = self.db.list_swaps_for_user(user_id).await?;
        Ok(select_swaps(swaps, status))
    }

    /// A swap the user participates in.
    pub async fn get_swap_for(&self, swap_id: &str, user_id: &str) -> Result<Swap> {
        self.db
            .get_swap(swap_id)
            .await?
            .filter(|s| s.involves(user_id))
            .ok_or_else(|| AppError::NotFound(format!("Swap {} not found", swap_id)))
    }
}
