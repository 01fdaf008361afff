// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-swap ratings and the reputation fields derived from them.

use serde::Deserialize;
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    rating_id, NotificationType, Rating, RatingCategory, RatingSummary, SwapStatus, MAX_RATING,
    MIN_RATING,
};
use crate::services::notification::NotificationService;
use crate::services::user::require_user;
use crate::time_utils::now_rfc3339;

/// Body of `POST /api/ratings`.
#[derive(Debug, Deserialize, Validate)]
pub struct RateInput {
    #[validate(length(min = 1, max = 128))]
    pub swap_id: String,
    #[validate(length(min = 1, max = 128))]
    pub rated_user_id: String,
    #[validate(range(min = MIN_RATING, max = MAX_RATING))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub review: String,
    #[serde(default)]
    pub category: RatingCategory,
}

#[derive(Clone)]
pub struct RatingService {
    db: FirestoreDb,
    notifications: NotificationService,
}

impl RatingService {
    pub fn new(db: FirestoreDb, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Rate the other participant of a completed swap. One rating per rater per swap.
    pub async fn rate(&self, rater_id: &str, input: RateInput) -> Result<Rating> {
        if input.rated_user_id == rater_id {
            return Err(AppError::BadRequest("Cannot rate yourself".to_string()));
        }

        let swap = self
            .db
            .get_swap(&input.swap_id)
            .await?
            .filter(|s| s.involves(rater_id))
            .ok_or_else(|| AppError::NotFound(format!("Swap {} not found", input.swap_id)))?;

        if !swap.involves(&input.rated_user_id) {
            return Err(AppError::BadRequest(
                "Rated user did not take part in this swap".to_string(),
            ));
        }
        if swap.status != SwapStatus::Completed {
            return Err(AppError::Conflict(format!(
                "Swap is {}, only completed swaps can be rated",
                swap.status.as_str()
            )));
        }

        let id = rating_id(&swap.id, rater_id);
        if self.db.get_rating(&id).await?.is_some() {
            return Err(AppError::Conflict("Swap already rated".to_string()));
        }

        let rater = require_user(&self.db, rater_id).await?;
        let rated = require_user(&self.db, &input.rated_user_id).await?;

        let rating = Rating {
            id,
            rated_by_id: rater.id.clone(),
            rated_by_name: rater.name.clone(),
            rated_user_id: rated.id.clone(),
            rated_user_name: rated.name.clone(),
            swap_id: swap.id.clone(),
            rating: input.rating,
            review: input.review,
            category: input.category,
            created_at: now_rfc3339(),
        };
        self.db.set_rating(&rating).await?;

        tracing::info!(
            swap_id = %rating.swap_id,
            rated_by = %rating.rated_by_id,
            rated_user = %rating.rated_user_id,
            rating = rating.rating,
            "Rating submitted"
        );

        // A failure here leaves the rating stored with stale aggregates.
        self.refresh_reputation(&rating.rated_user_id).await?;

        self.notifications
            .send_logged(
                NotificationService::compose(
                    &rating.rated_user_id,
                    NotificationType::RatingReceived,
                    "New rating",
                    format!("{} rated you {} stars", rating.rated_by_name, rating.rating),
                )
                .about(&rating.id, &rating.rated_by_id),
            )
            .await;

        Ok(rating)
    }

    /// Recompute a user's average rating, review count and trust score.
    pub async fn refresh_reputation(&self, user_id: &str) -> Result<Option<RatingSummary>> {
        let ratings = self.db.list_ratings_received(user_id).await?;
        let scores: Vec<u8> = ratings.iter().map(|r| r.rating).collect();
        let Some(summary) = RatingSummary::from_scores(&scores) else {
            return Ok(None);
        };

        let mut user = require_user(&self.db, user_id).await?;
        user.average_rating = summary.average_rating;
        user.total_reviews = summary.total_reviews;
        user.trust_score = summary.trust_score;
        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;

        tracing::debug!(
            user_id,
            average = summary.average_rating,
            reviews = summary.total_reviews,
            "Reputation updated"
        );
        Ok(Some(summary))
    }

    /// Ratings a user received, newest first.
    pub async fn received(&self, user_id: &str) -> Result<Vec<Rating>> {
        let mut ratings = self.db.list_ratings_received(user_id).await?;
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ratings)
    }

    /// Ratings a user gave, newest first.
    pub async fn given(&self, user_id: &str) -> Result<Vec<Rating>> {
        let mut ratings = self.db.list_ratings_given(user_id).await?;
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ratings)
    }
}
