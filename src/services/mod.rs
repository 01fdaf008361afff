// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod admin;
pub mod chat;
pub mod live;
pub mod matching;
pub mod notification;
pub mod rating;
pub mod session;
pub mod swap;
pub mod user;

pub use admin::AdminService;
pub use chat::ChatService;
pub use live::{LiveEvent, LiveHub};
pub use matching::{MatchingService, ScoredMatch};
pub use notification::NotificationService;
pub use rating::RatingService;
pub use session::SessionService;
pub use swap::SwapService;
pub use user::UserService;
