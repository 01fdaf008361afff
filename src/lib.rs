// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SkillSwap: a skill-exchange platform backend.
//!
//! Users declare skills they teach and skills they want to learn, get
//! matched with compatible partners, agree on swaps, chat, run sessions and
//! rate each other afterward.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{
    AdminService, ChatService, LiveHub, MatchingService, NotificationService, RatingService,
    SessionService, SwapService, UserService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub live: LiveHub,
    pub users: UserService,
    pub matching: MatchingService,
    pub swaps: SwapService,
    pub chat: ChatService,
    pub sessions: SessionService,
    pub ratings: RatingService,
    pub notifications: NotificationService,
    pub admin: AdminService,
}

impl AppState {
    /// Wire every service onto one database handle and live hub.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let live = LiveHub::new();
        let notifications = NotificationService::new(db.clone(), live.clone());
        let chat = ChatService::new(db.clone(), live.clone(), notifications.clone());

        Self {
            users: UserService::new(db.clone()),
            matching: MatchingService::new(db.clone()),
            swaps: SwapService::new(db.clone(), chat.clone(), notifications.clone()),
            sessions: SessionService::new(db.clone(), notifications.clone()),
            ratings: RatingService::new(db.clone(), notifications.clone()),
            admin: AdminService::new(db.clone(), notifications.clone()),
            chat,
            notifications,
            live,
            config,
            db,
        }
    }
}
