//! Platform-wide statistics for the admin console.
//!
//! Computed from one pass over the user collection; nothing is stored.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::User;

/// Aggregate counters across all users.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlatformStatistics {
    pub total_users: u32,
    /// Active and not banned
    pub active_users: u32,
    pub banned_users: u32,
    /// Each swap is counted once even though both users record it
    pub total_swaps_completed: u32,
    /// Mean of the average rating over users with at least one review
    pub average_rating: f64,
    /// Users created in the given month ("YYYY-MM")
    pub new_users_this_month: u32,

    #[serde(skip)]
    swap_counter_sum: u32,
    #[serde(skip)]
    rating_sum: f64,
    #[serde(skip)]
    rated_users: u32,
}

impl PlatformStatistics {
    /// Build statistics for `users`, counting sign-ups in `month_key` ("YYYY-MM").
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a User>, month_key: &str) -> Self {
        let mut stats = Self::default();
        for user in users {
            stats.update_from_user(user, month_key);
        }
        stats
    }

    fn update_from_user(&mut self, user: &User, month_key: &str) {
        self.total_users += 1;
        if user.is_banned {
            self.banned_users += 1;
        } else if user.is_active {
            self.active_users += 1;
        }

        self.swap_counter_sum += user.total_swaps_completed;
        self.total_swaps_completed = self.swap_counter_sum / 2;

        if user.total_reviews > 0 {
            self.rated_users += 1;
            self.rating_sum += user.average_rating;
            self.average_rating =
                (self.rating_sum / f64::from(self.rated_users) * 10.0).round() / 10.0;
        }

        if extract_month_key(&user.created_at) == Some(month_key) {
            self.new_users_this_month += 1;
        }
    }
}

/// Extract "YYYY-MM" from an ISO 8601 date string.
fn extract_month_key(date: &str) -> Option<&str> {
    date.get(..7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(id: &str, created_at: &str) -> User {
        User::new(id, &format!("{}@example.com", id), id, created_at)
    }

    #[test]
    fn test_counts_active_and_banned() {
        let mut banned = make_user("b", "2024-01-02T00:00:00.000Z");
        banned.is_banned = true;
        let mut inactive = make_user("i", "2023-12-02T00:00:00.000Z");
        inactive.is_active = false;
        let active = make_user("a", "2024-01-03T00:00:00.000Z");

        let stats = PlatformStatistics::from_users([&banned, &inactive, &active], "2024-01");

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.banned_users, 1);
        assert_eq!(stats.new_users_this_month, 2);
    }

    #[test]
    fn test_swaps_are_halved_and_ratings_averaged() {
        let mut a = make_user("a", "2024-01-01T00:00:00.000Z");
        a.total_swaps_completed = 3;
        a.total_reviews = 2;
        a.average_rating = 4.0;
        let mut b = make_user("b", "2024-01-01T00:00:00.000Z");
        b.total_swaps_completed = 3;
        b.total_reviews = 1;
        b.average_rating = 4.5;
        let unrated = make_user("c", "2024-01-01T00:00:00.000Z");

        let stats = PlatformStatistics::from_users([&a, &b, &unrated], "2024-02");

        assert_eq!(stats.total_swaps_completed, 3);
        assert_eq!(stats.average_rating, 4.3);
        assert_eq!(stats.new_users_this_month, 0);
    }

    #[test]
    fn test_empty_platform() {
        let stats = PlatformStatistics::from_users(std::iter::empty(), "2024-01");
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.average_rating, 0.0);
    }
}
