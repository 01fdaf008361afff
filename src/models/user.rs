//! User profile and skill models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Trust score every new account starts with.
pub const INITIAL_TRUST_SCORE: f64 = 50.0;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User profile stored in Firestore (document ID = identity-issued user ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Role,

    // ─── Preferences ─────────────────────────────────────────────
    #[serde(default)]
    pub prefer_online: bool,
    #[serde(default)]
    pub prefer_offline: bool,
    pub location: Option<String>,

    // ─── Skills ──────────────────────────────────────────────────
    #[serde(default)]
    pub skills_i_teach: Vec<Skill>,
    #[serde(default)]
    pub skills_i_want_to_learn: Vec<Skill>,

    // ─── Account Status ──────────────────────────────────────────
    #[serde(default)]
    pub is_onboarding_complete: bool,
    #[serde(default)]
    pub is_verified: bool,

    // ─── Reputation ──────────────────────────────────────────────
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default = "default_trust_score")]
    pub trust_score: f64,

    // ─── Statistics ──────────────────────────────────────────────
    #[serde(default)]
    pub total_swaps_completed: u32,
    #[serde(default)]
    pub total_skills_taught: u32,
    #[serde(default)]
    pub total_skills_learned: u32,

    // ─── Account Management ──────────────────────────────────────
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_banned: bool,
    pub banned_reason: Option<String>,
}

fn default_trust_score() -> f64 {
    INITIAL_TRUST_SCORE
}

fn default_true() -> bool {
    true
}

impl User {
    /// Fresh profile for a newly registered identity.
    pub fn new(id: &str, email: &str, name: &str, now: &str) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            photo_url: None,
            bio: None,
            role: Role::User,
            prefer_online: false,
            prefer_offline: false,
            location: None,
            skills_i_teach: Vec::new(),
            skills_i_want_to_learn: Vec::new(),
            is_onboarding_complete: false,
            is_verified: false,
            average_rating: 0.0,
            total_reviews: 0,
            trust_score: INITIAL_TRUST_SCORE,
            total_swaps_completed: 0,
            total_skills_taught: 0,
            total_skills_learned: 0,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            last_login_at: Some(now.to_string()),
            is_active: true,
            is_banned: false,
            banned_reason: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user may show up as a match or suggestion.
    pub fn is_discoverable(&self) -> bool {
        self.is_active && !self.is_banned && self.is_onboarding_complete
    }

    /// Count a completed swap. Each side of a swap both teaches and learns.
    pub fn record_completed_swap(&mut self, now: &str) {
        self.total_swaps_completed += 1;
        self.total_skills_taught += 1;
        self.total_skills_learned += 1;
        self.updated_at = now.to_string();
    }

    pub fn teaches(&self, skill_name: &str) -> bool {
        contains_skill(&self.skills_i_teach, skill_name)
    }

    pub fn wants_to_learn(&self, skill_name: &str) -> bool {
        contains_skill(&self.skills_i_want_to_learn, skill_name)
    }
}

/// Profile as shown to other users: no email or moderation details.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub prefer_online: bool,
    pub prefer_offline: bool,
    pub skills_i_teach: Vec<Skill>,
    pub skills_i_want_to_learn: Vec<Skill>,
    pub is_verified: bool,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub trust_score: f64,
    pub total_swaps_completed: u32,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            prefer_online: user.prefer_online,
            prefer_offline: user.prefer_offline,
            skills_i_teach: user.skills_i_teach.clone(),
            skills_i_want_to_learn: user.skills_i_want_to_learn.clone(),
            is_verified: user.is_verified,
            average_rating: user.average_rating,
            total_reviews: user.total_reviews,
            trust_score: user.trust_score,
            total_swaps_completed: user.total_swaps_completed,
        }
    }
}

/// Case-insensitive name comparison (Unicode lowercase) for skills and locations.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_skill(skills: &[Skill], name: &str) -> bool {
    skills.iter().any(|s| names_match(&s.name, name))
}

/// A skill embedded in a user's teach/learn lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Skill {
    /// Generated server-side
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    pub level: SkillLevel,
    pub years_of_experience: Option<u32>,
    pub description: Option<String>,
    pub added_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SkillCategory {
    Language,
    Music,
    Sports,
    #[serde(rename = "Arts & Design")]
    Arts,
    Technology,
    Cooking,
    Fitness,
    Business,
    #[serde(rename = "Personal Development")]
    PersonalDevelopment,
    Academic,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("u1", "a@example.com", "Ada", "2024-01-01T00:00:00.000Z");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.trust_score, INITIAL_TRUST_SCORE);
        assert!(user.is_active);
        assert!(!user.is_banned);
        assert!(!user.is_onboarding_complete);
        assert!(!user.is_discoverable());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{
            "id": "u1",
            "email": "a@example.com",
            "name": "Ada",
            "photo_url": null,
            "bio": null,
            "location": null,
            "created_at": "2024-01-01T00:00:00.000Z",
            "updated_at": "2024-01-01T00:00:00.000Z",
            "last_login_at": null,
            "banned_reason": null
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_active);
        assert_eq!(user.trust_score, 50.0);
        assert!(user.skills_i_teach.is_empty());
    }

    #[test]
    fn test_public_profile_hides_private_fields() {
        let mut user = User::new("u1", "a@example.com", "Ada", "2024-01-01T00:00:00.000Z");
        user.banned_reason = Some("spam".to_string());

        let json = serde_json::to_value(PublicProfile::from(&user)).unwrap();
        assert_eq!(json["name"], "Ada");
        assert!(json.get("email").is_none());
        assert!(json.get("banned_reason").is_none());
    }

    #[test]
    fn test_skill_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&SkillCategory::Arts).unwrap(),
            "\"Arts & Design\""
        );
        assert_eq!(
            serde_json::to_string(&SkillCategory::PersonalDevelopment).unwrap(),
            "\"Personal Development\""
        );
    }
}
