// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rating model and reputation aggregation.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::user::INITIAL_TRUST_SCORE;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_TRUST_SCORE: f64 = 100.0;
/// Trust points per star of average rating.
const TRUST_PER_STAR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RatingCategory {
    Knowledge,
    Communication,
    Reliability,
    #[default]
    Overall,
}

/// Rating stored at `ratings/{swap_id}_{rater_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Rating {
    pub id: String,
    pub rated_by_id: String,
    pub rated_by_name: String,
    pub rated_user_id: String,
    pub rated_user_name: String,
    pub swap_id: String,
    /// 1-5 stars
    pub rating: u8,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub category: RatingCategory,
    pub created_at: String,
}

/// Document ID for a rater's rating of a swap; one rating per rater per swap.
pub fn rating_id(swap_id: &str, rater_id: &str) -> String {
    format!("{}_{}", swap_id, rater_id)
}

/// Reputation fields derived from all ratings a user received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean stars, rounded to one decimal
    pub average_rating: f64,
    pub total_reviews: u32,
    /// `min(100, 50 + 10 × mean)` on the unrounded mean
    pub trust_score: f64,
}

impl RatingSummary {
    /// Aggregate the star values of a user's received ratings.
    ///
    /// Returns `None` for an empty slice; the user's fields stay untouched.
    pub fn from_scores(scores: &[u8]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        let mean = f64::from(sum) / scores.len() as f64;

        Some(Self {
            average_rating: round_one_decimal(mean),
            total_reviews: scores.len() as u32,
            trust_score: (INITIAL_TRUST_SCORE + mean * TRUST_PER_STAR).min(MAX_TRUST_SCORE),
        })
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scores_have_no_summary() {
        assert_eq!(RatingSummary::from_scores(&[]), None);
    }

    #[test]
    fn test_average_is_rounded_but_trust_is_not() {
        let summary = RatingSummary::from_scores(&[4, 4, 5]).unwrap();
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.average_rating, 4.3);
        let expected_trust = 50.0 + (13.0 / 3.0) * 10.0;
        assert!((summary.trust_score - expected_trust).abs() < 1e-9);
    }

    #[test]
    fn test_trust_score_is_capped() {
        let summary = RatingSummary::from_scores(&[5, 5]).unwrap();
        assert_eq!(summary.average_rating, 5.0);
        assert_eq!(summary.trust_score, MAX_TRUST_SCORE);
    }

    #[test]
    fn test_rating_id_combines_swap_and_rater() {
        assert_eq!(rating_id("swap-1", "alice"), "swap-1_alice");
    }
}
