// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Matching engine.
//!
//! Two users match when each teaches something the other wants to learn and
//! their meeting modes are compatible. Matches are ranked by:
//!
//! ```text
//! score = skills they teach that you want
//!       + skills you teach that they want
//!       + 5 if both prefer online
//!       + 3 if both prefer offline
//!       + their average rating
//! ```
//!
//! Skill names compare case-insensitively. The scoring functions are pure so
//! they can be tested and benchmarked without Firestore.

use serde::Serialize;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{names_match, PublicProfile, Skill, User};

pub const ONLINE_BONUS: f64 = 5.0;
pub const OFFLINE_BONUS: f64 = 3.0;
pub const DEFAULT_RECOMMENDED_LIMIT: usize = 5;
pub const DEFAULT_SUGGESTED_LIMIT: usize = 10;

/// A ranked match candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMatch {
    pub user: PublicProfile,
    pub score: f64,
    /// Skills the candidate teaches that the current user wants
    pub skills_they_teach: Vec<String>,
    /// Skills the current user teaches that the candidate wants
    pub skills_you_teach: Vec<String>,
}

fn same_location(a: &User, b: &User) -> bool {
    match (a.location.as_deref(), b.location.as_deref()) {
        (Some(x), Some(y)) => !x.is_empty() && names_match(x, y),
        _ => false,
    }
}

/// Whether `user` can meet `candidate` in a mode they share.
///
/// Both online always works. Both offline requires the same location. Any
/// other combination is accepted as long as `user` states a preference, so
/// the relation is not symmetric.
pub fn modes_compatible(user: &User, candidate: &User) -> bool {
    if user.prefer_online && candidate.prefer_online {
        return true;
    }
    if user.prefer_offline && candidate.prefer_offline {
        return same_location(user, candidate);
    }
    user.prefer_online || user.prefer_offline
}

/// Names in `teaches` that appear in `wants`, case-insensitively.
///
/// Every entry of `teaches` is counted, so duplicate list entries count twice.
fn overlap(teaches: &[Skill], wants: &[Skill]) -> Vec<String> {
    teaches
        .iter()
        .filter(|t| wants.iter().any(|w| names_match(&w.name, &t.name)))
        .map(|t| t.name.clone())
        .collect()
}

/// Each side teaches at least one skill the other wants, and modes are compatible.
pub fn is_mutual_match(user: &User, candidate: &User) -> bool {
    let they_teach = user
        .skills_i_want_to_learn
        .iter()
        .any(|s| candidate.teaches(&s.name));
    let you_teach = candidate
        .skills_i_want_to_learn
        .iter()
        .any(|s| user.teaches(&s.name));

    they_teach && you_teach && modes_compatible(user, candidate)
}

/// Ranking score of `candidate` from `user`'s point of view.
pub fn match_score(user: &User, candidate: &User) -> f64 {
    let they_teach = overlap(&candidate.skills_i_teach, &user.skills_i_want_to_learn).len();
    let you_teach = overlap(&user.skills_i_teach, &candidate.skills_i_want_to_learn).len();

    let mut score = (they_teach + you_teach) as f64;
    if user.prefer_online && candidate.prefer_online {
        score += ONLINE_BONUS;
    }
    if user.prefer_offline && candidate.prefer_offline {
        score += OFFLINE_BONUS;
    }
    score + candidate.average_rating
}

fn is_candidate(user: &User, candidate: &User) -> bool {
    candidate.id != user.id && candidate.is_discoverable()
}

/// Mutual matches among `candidates`, best first.
pub fn rank_matches<'a>(
    user: &User,
    candidates: impl IntoIterator<Item = &'a User>,
) -> Vec<ScoredMatch> {
    let mut matches: Vec<ScoredMatch> = candidates
        .into_iter()
        .filter(|c| is_candidate(user, c) && is_mutual_match(user, c))
        .map(|c| ScoredMatch {
            user: PublicProfile::from(c),
            score: match_score(user, c),
            skills_they_teach: overlap(&c.skills_i_teach, &user.skills_i_want_to_learn),
            skills_you_teach: overlap(&user.skills_i_teach, &c.skills_i_want_to_learn),
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

/// Looser suggestions: anyone who teaches something `user` wants, by rating.
pub fn rank_suggestions<'a>(
    user: &User,
    candidates: impl IntoIterator<Item = &'a User>,
    limit: usize,
) -> Vec<PublicProfile> {
    let mut suggestions: Vec<&User> = candidates
        .into_iter()
        .filter(|c| is_candidate(user, c))
        .filter(|c| c.skills_i_teach.iter().any(|s| user.wants_to_learn(&s.name)))
        .collect();

    suggestions.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    suggestions
        .into_iter()
        .take(limit)
        .map(PublicProfile::from)
        .collect()
}

/// Users whose taught or wanted skill names contain `query`.
pub fn search<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a User>,
) -> Vec<PublicProfile> {
    let needle = query.trim().to_lowercase();
    let contains = |skills: &[Skill]| {
        skills
            .iter()
            .any(|s| s.name.to_lowercase().contains(&needle))
    };

    candidates
        .into_iter()
        .filter(|u| u.is_active && !u.is_banned)
        .filter(|u| contains(&u.skills_i_teach) || contains(&u.skills_i_want_to_learn))
        .map(PublicProfile::from)
        .collect()
}

/// Matching over the users stored in Firestore.
#[derive(Clone)]
pub struct MatchingService {
    db: FirestoreDb,
}

impl MatchingService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn find_matches(&self, user_id: &str) -> Result<Vec<ScoredMatch>> {
        let user = self.load_user(user_id).await?;
        let candidates = self.db.list_active_users().await?;
        let matches = rank_matches(&user, &candidates);

        tracing::debug!(
            user_id,
            candidates = candidates.len(),
            matches = matches.len(),
            "Computed matches"
        );
        Ok(matches)
    }

    pub async fn recommended(&self, user_id: &str, limit: usize) -> Result<Vec<ScoredMatch>> {
        let mut matches = self.find_matches(user_id).await?;
        matches.truncate(limit);
        Ok(matches)
    }

    pub async fn suggested(&self, user_id: &str, limit: usize) -> Result<Vec<PublicProfile>> {
        let user = self.load_user(user_id).await?;
        let candidates = self.db.list_active_users().await?;
        Ok(rank_suggestions(&user, &candidates, limit))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PublicProfile>> {
        if query.trim().is_empty() {
            return Err(AppError::BadRequest("Search query is empty".to_string()));
        }
        let candidates = self.db.list_active_users().await?;
        Ok(search(query, &candidates))
    }
}
