// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chat;
pub mod notification;
pub mod rating;
pub mod session;
pub mod stats;
pub mod swap;
pub mod transition;
pub mod user;

pub use chat::{conversation_id_for, Conversation, Message};
pub use notification::{Notification, NotificationType};
pub use rating::{rating_id, Rating, RatingCategory, RatingSummary, MAX_RATING, MIN_RATING};
pub use session::{MeetingType, Session, SessionStatus};
pub use stats::PlatformStatistics;
pub use swap::{SessionType, Swap, SwapRequest, SwapRequestAction, SwapRequestStatus, SwapStatus};
pub use transition::TransitionError;
pub use user::{names_match, PublicProfile, Role, Skill, SkillCategory, SkillLevel, User};
