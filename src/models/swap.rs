// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request and swap models, including their status state machines.
//!
//! A swap request moves `Pending → {Accepted, Rejected, Cancelled}` exactly
//! once. Accepting a request creates a [`Swap`], which then follows the
//! sessions scheduled for it: `Confirmed → In Progress → Completed`.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Skill, TransitionError};

/// Status of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SwapRequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SwapRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapRequestStatus::Pending => "Pending",
            SwapRequestStatus::Accepted => "Accepted",
            SwapRequestStatus::Rejected => "Rejected",
            SwapRequestStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != SwapRequestStatus::Pending
    }
}

impl fmt::Display for SwapRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a participant wants to do with a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRequestAction {
    /// Recipient agrees to the swap
    Accept,
    /// Recipient declines the swap
    Reject,
    /// Sender withdraws the request
    Cancel,
}

impl SwapRequestAction {
    pub fn target(self) -> SwapRequestStatus {
        match self {
            SwapRequestAction::Accept => SwapRequestStatus::Accepted,
            SwapRequestAction::Reject => SwapRequestStatus::Rejected,
            SwapRequestAction::Cancel => SwapRequestStatus::Cancelled,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            SwapRequestAction::Accept => "accept",
            SwapRequestAction::Reject => "reject",
            SwapRequestAction::Cancel => "cancel",
        }
    }
}

/// How a swap's sessions are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionType {
    #[default]
    Online,
    Offline,
    Hybrid,
}

/// Swap request stored in Firestore (`swap_requests/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SwapRequest {
    pub id: String,

    pub sender_id: String,
    pub sender_name: String,
    pub recipient_id: String,
    pub recipient_name: String,

    /// Skill the sender will teach
    pub skill_offered: Skill,
    /// Skill the sender wants from the recipient
    pub skill_requested: Skill,

    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_type: SessionType,
    pub proposed_date: Option<String>,
    pub proposed_time: Option<String>,

    pub status: SwapRequestStatus,

    /// Set once the request is accepted
    pub conversation_id: Option<String>,
    pub swap_id: Option<String>,

    pub created_at: String,
    pub responded_at: Option<String>,
    pub completed_at: Option<String>,
}

impl SwapRequest {
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }

    /// Apply a participant's action to a pending request.
    ///
    /// Accept and reject belong to the recipient, cancel to the sender. Every
    /// non-pending status is terminal, so a request is answered at most once.
    pub fn apply(
        &mut self,
        actor_id: &str,
        action: SwapRequestAction,
        now: &str,
    ) -> Result<SwapRequestStatus, TransitionError> {
        let (allowed, role) = match action {
            SwapRequestAction::Accept | SwapRequestAction::Reject => {
                (self.recipient_id == actor_id, "recipient")
            }
            SwapRequestAction::Cancel => (self.sender_id == actor_id, "sender"),
        };
        if !allowed {
            return Err(TransitionError::NotAllowed {
                entity: "swap request",
                action: action.verb(),
                role,
            });
        }

        let target = action.target();
        if self.status.is_terminal() {
            return Err(TransitionError::Invalid {
                entity: "swap request",
                from: self.status.as_str(),
                to: target.as_str(),
            });
        }

        self.status = target;
        self.responded_at = Some(now.to_string());
        Ok(target)
    }
}

/// Status of an agreed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SwapStatus {
    Confirmed,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl SwapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Confirmed => "Confirmed",
            SwapStatus::InProgress => "In Progress",
            SwapStatus::Completed => "Completed",
            SwapStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether new sessions can still be scheduled.
    pub fn is_open(self) -> bool {
        matches!(self, SwapStatus::Confirmed | SwapStatus::InProgress)
    }
}

/// Agreed exchange between two users (`swaps/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Swap {
    pub id: String,
    pub swap_request_id: String,

    /// The request sender teaches `skill_being_taught`
    pub teacher_id: String,
    pub teacher_name: String,
    /// The request recipient learns it, and teaches back `skill_being_learned`
    pub learner_id: String,
    pub learner_name: String,

    pub skill_being_taught: Skill,
    pub skill_being_learned: Skill,

    pub status: SwapStatus,

    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

impl Swap {
    /// Build the swap agreed by an accepted request.
    pub fn from_accepted_request(id: String, request: &SwapRequest, now: &str) -> Self {
        Self {
            id,
            swap_request_id: request.id.clone(),
            teacher_id: request.sender_id.clone(),
            teacher_name: request.sender_name.clone(),
            learner_id: request.recipient_id.clone(),
            learner_name: request.recipient_name.clone(),
            skill_being_taught: request.skill_offered.clone(),
            skill_being_learned: request.skill_requested.clone(),
            status: SwapStatus::Confirmed,
            created_at: now.to_string(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn participant_ids(&self) -> [&str; 2] {
        [self.teacher_id.as_str(), self.learner_id.as_str()]
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.teacher_id == user_id || self.learner_id == user_id
    }

    /// The participant on the other side of `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.teacher_id == user_id {
            &self.learner_id
        } else {
            &self.teacher_id
        }
    }

    /// First session started. Idempotent while in progress.
    pub fn start(&mut self, now: &str) -> Result<(), TransitionError> {
        match self.status {
            SwapStatus::Confirmed => {
                self.status = SwapStatus::InProgress;
                self.started_at = Some(now.to_string());
                Ok(())
            }
            SwapStatus::InProgress => Ok(()),
            other => Err(TransitionError::Invalid {
                entity: "swap",
                from: other.as_str(),
                to: SwapStatus::InProgress.as_str(),
            }),
        }
    }

    /// Mark the swap completed.
    ///
    /// Returns `true` if this call completed it, `false` if it already was.
    pub fn complete(&mut self, now: &str) -> Result<bool, TransitionError> {
        match self.status {
            SwapStatus::Confirmed | SwapStatus::InProgress => {
                self.status = SwapStatus::Completed;
                if self.started_at.is_none() {
                    self.started_at = Some(now.to_string());
                }
                self.completed_at = Some(now.to_string());
                Ok(true)
            }
            SwapStatus::Completed => Ok(false),
            SwapStatus::Cancelled => Err(TransitionError::Invalid {
                entity: "swap",
                from: SwapStatus::Cancelled.as_str(),
                to: SwapStatus::Completed.as_str(),
            }),
        }
    }
}
