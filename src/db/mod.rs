//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const SWAP_REQUESTS: &str = "swap_requests";
    pub const SWAPS: &str = "swaps";
    pub const CONVERSATIONS: &str = "conversations";
    /// Nested under `conversations/{id}`
    pub const MESSAGES: &str = "messages";
    pub const SESSIONS: &str = "sessions";
    pub const RATINGS: &str = "ratings";
    pub const NOTIFICATIONS: &str = "notifications";
}
