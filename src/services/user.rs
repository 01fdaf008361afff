//! User profiles, onboarding and skill lists.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{names_match, Skill, SkillCategory, SkillLevel, User};
use crate::time_utils::now_rfc3339;

/// Load a user or fail with NotFound.
pub async fn require_user(db: &FirestoreDb, user_id: &str) -> Result<User> {
    db.get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Load the acting user; banned or deactivated accounts are refused.
pub async fn require_active_user(db: &FirestoreDb, user_id: &str) -> Result<User> {
    let user = require_user(db, user_id).await?;
    if user.is_banned || !user.is_active {
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }
    Ok(user)
}

/// Body of `POST /api/register`. The user ID comes from the token.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
}

/// A skill as submitted by the client; the server assigns ID and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SkillInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: SkillCategory,
    pub level: SkillLevel,
    #[validate(range(max = 80))]
    pub years_of_experience: Option<u32>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl SkillInput {
    fn into_skill(self, now: &str) -> Skill {
        Skill {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            level: self.level,
            years_of_experience: self.years_of_experience,
            description: self.description,
            added_at: now.to_string(),
        }
    }
}

/// Body of `POST /api/me/onboarding`.
#[derive(Debug, Deserialize, Validate)]
pub struct OnboardingInput {
    #[validate(length(min = 1, max = 20), nested)]
    pub skills_i_teach: Vec<SkillInput>,
    #[validate(length(min = 1, max = 20), nested)]
    pub skills_i_want_to_learn: Vec<SkillInput>,
    #[serde(default)]
    pub prefer_online: bool,
    #[serde(default)]
    pub prefer_offline: bool,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

/// Body of `PUT /api/me`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    pub prefer_online: Option<bool>,
    pub prefer_offline: Option<bool>,
}

impl ProfileUpdate {
    fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(bio) = self.bio {
            user.bio = Some(bio);
        }
        if let Some(photo_url) = self.photo_url {
            user.photo_url = Some(photo_url);
        }
        if let Some(location) = self.location {
            user.location = Some(location);
        }
        if let Some(online) = self.prefer_online {
            user.prefer_online = online;
        }
        if let Some(offline) = self.prefer_offline {
            user.prefer_offline = offline;
        }
    }
}

/// Which of a user's skill lists to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillList {
    Teach,
    Learn,
}

impl SkillList {
    fn of(self, user: &mut User) -> &mut Vec<Skill> {
        match self {
            SkillList::Teach => &mut user.skills_i_teach,
            SkillList::Learn => &mut user.skills_i_want_to_learn,
        }
    }
}

fn already_listed(skills: &[Skill], name: &str) -> bool {
    skills.iter().any(|s| names_match(&s.name, name))
}

#[derive(Clone)]
pub struct UserService {
    db: FirestoreDb,
}

impl UserService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create the profile for an identity. An existing profile only gets its
    /// last login refreshed.
    pub async fn register(&self, user_id: &str, input: RegisterInput) -> Result<User> {
        let now = now_rfc3339();

        if let Some(mut existing) = self.db.get_user(user_id).await? {
            existing.last_login_at = Some(now);
            self.db.upsert_user(&existing).await?;
            tracing::debug!(user_id, "Existing user logged in");
            return Ok(existing);
        }

        let mut user = User::new(user_id, &input.email, input.name.trim(), &now);
        user.photo_url = input.photo_url;
        self.db.upsert_user(&user).await?;

        tracing::info!(user_id, "User registered");
        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<User> {
        require_user(&self.db, user_id).await
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        let mut user = require_active_user(&self.db, user_id).await?;
        update.apply(&mut user);
        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    /// Store skills and preferences and mark onboarding complete.
    pub async fn complete_onboarding(&self, user_id: &str, input: OnboardingInput) -> Result<User> {
        let mut user = require_active_user(&self.db, user_id).await?;
        let now = now_rfc3339();

        user.skills_i_teach = input
            .skills_i_teach
            .into_iter()
            .map(|s| s.into_skill(&now))
            .collect();
        user.skills_i_want_to_learn = input
            .skills_i_want_to_learn
            .into_iter()
            .map(|s| s.into_skill(&now))
            .collect();
        user.prefer_online = input.prefer_online;
        user.prefer_offline = input.prefer_offline;
        user.location = input.location.or(user.location);
        user.bio = input.bio.or(user.bio);
        user.is_onboarding_complete = true;
        user.updated_at = now;

        self.db.upsert_user(&user).await?;
        tracing::info!(
            user_id,
            teaches = user.skills_i_teach.len(),
            wants = user.skills_i_want_to_learn.len(),
            "Onboarding complete"
        );
        Ok(user)
    }

    pub async fn add_skill(
        &self,
        user_id: &str,
        list: SkillList,
        input: SkillInput,
    ) -> Result<User> {
        let mut user = require_active_user(&self.db, user_id).await?;
        let now = now_rfc3339();
        let skill = input.into_skill(&now);

        let skills = list.of(&mut user);
        if already_listed(skills, &skill.name) {
            return Err(AppError::Conflict(format!("Skill {} already listed", skill.name)));
        }
        skills.push(skill);

        user.updated_at = now;
        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    pub async fn remove_skill(
        &self,
        user_id: &str,
        list: SkillList,
        skill_id: &str,
    ) -> Result<User> {
        let mut user = require_active_user(&self.db, user_id).await?;

        let skills = list.of(&mut user);
        let before = skills.len();
        skills.retain(|s| s.id != skill_id);
        if skills.len() == before {
            return Err(AppError::NotFound(format!("Skill {} not found", skill_id)));
        }

        user.updated_at = now_rfc3339();
        self.db.upsert_user(&user).await?;
        Ok(user)
    }
}
