//! Scheduling and running teaching sessions for a swap.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{
    MeetingType, NotificationType, Session, SessionStatus, SessionType, Swap, User,
};
use crate::services::notification::NotificationService;
use crate::time_utils::{format_utc_rfc3339, now_rfc3339, parse_rfc3339};

/// Body of `POST /api/sessions`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleSessionInput {
    #[validate(length(min = 1, max = 128))]
    pub swap_id: String,
    #[validate(length(min = 1, max = 100))]
    pub skill_topic: String,
    #[serde(default)]
    pub session_type: SessionType,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// RFC3339 start time
    pub scheduled_at: String,
    #[validate(range(min = 15, max = 480))]
    pub duration_minutes: u32,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub meeting_type: MeetingType,
}

/// A session with the join window evaluated at response time.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub can_join: bool,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        let can_join = session.can_join(Utc::now());
        Self { session, can_join }
    }
}

#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    notifications: NotificationService,
}

impl SessionService {
    pub fn new(db: FirestoreDb, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    async fn swap_for(&self, swap_id: &str, user_id: &str) -> Result<Swap> {
        self.db
            .get_swap(swap_id)
            .await?
            .filter(|s| s.involves(user_id))
            .ok_or_else(|| AppError::NotFound(format!("Swap {} not found", swap_id)))
    }

    async fn session_for(&self, session_id: &str, user_id: &str) -> Result<Session> {
        self.db
            .get_session(session_id)
            .await?
            .filter(|s| s.involves(user_id))
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))
    }

    pub async fn schedule(&self, user_id: &str, input: ScheduleSessionInput) -> Result<Session> {
        let start = parse_rfc3339(&input.scheduled_at).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid scheduled_at: {}", input.scheduled_at))
        })?;

        let swap = self.swap_for(&input.swap_id, user_id).await?;
        if !swap.status.is_open() {
            return Err(AppError::Conflict(format!(
                "Swap is {}, sessions can no longer be scheduled",
                swap.status.as_str()
            )));
        }

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            swap_id: Some(swap.id.clone()),
            participant_ids: swap.participant_ids().map(str::to_string).to_vec(),
            skill_topic: input.skill_topic,
            session_type: input.session_type,
            description: input.description,
            scheduled_at: format_utc_rfc3339(start),
            duration_minutes: input.duration_minutes,
            meeting_link: input.meeting_link,
            meeting_type: input.meeting_type,
            status: SessionStatus::Scheduled,
            created_at: now_rfc3339(),
            completed_at: None,
        };
        self.db.set_session(&session).await?;

        tracing::info!(
            session_id = %session.id,
            swap_id = %swap.id,
            scheduled_at = %session.scheduled_at,
            "Session scheduled"
        );

        self.notifications
            .send_logged(
                NotificationService::compose(
                    swap.counterpart(user_id),
                    NotificationType::SessionReminder,
                    "Session scheduled",
                    format!(
                        "{} session scheduled for {}",
                        session.skill_topic, session.scheduled_at
                    ),
                )
                .about(&session.id, user_id),
            )
            .await;

        Ok(session)
    }

    /// Sessions of a user, earliest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Session>> {
        let mut sessions = self.db.list_sessions_for_user(user_id).await?;
        sessions.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        Ok(sessions)
    }

    /// Scheduled sessions that have not started yet, earliest first.
    pub async fn upcoming(&self, user_id: &str) -> Result<Vec<Session>> {
        let now = Utc::now();
        let mut sessions = self.list(user_id).await?;
        sessions.retain(|s| s.is_upcoming(now));
        Ok(sessions)
    }

    pub async fn start(&self, session_id: &str, user_id: &str) -> Result<Session> {
        let mut session = self.session_for(session_id, user_id).await?;
        session.start()?;

        if let Some(swap_id) = session.swap_id.as_deref() {
            let mut swap = self.swap_for(swap_id, user_id).await?;
            swap.start(&now_rfc3339())?;
            self.db.set_swap(&swap).await?;
        }
        self.db.set_session(&session).await?;

        tracing::info!(session_id, "Session started");
        Ok(session)
    }

    /// Complete a session, and with it the swap.
    ///
    /// The first completion of a swap credits both participants.
    pub async fn complete(&self, session_id: &str, user_id: &str) -> Result<Session> {
        let now = now_rfc3339();
        let mut session = self.session_for(session_id, user_id).await?;
        session.complete(&now)?;

        let swap = match session.swap_id.as_deref() {
            Some(swap_id) => {
                let mut swap = self.swap_for(swap_id, user_id).await?;
                let newly_completed = swap.complete(&now)?;
                Some((swap, newly_completed))
            }
            None => None,
        };

        self.db.set_session(&session).await?;

        if let Some((swap, newly_completed)) = swap {
            if newly_completed {
                self.db.set_swap(&swap).await?;
                self.credit_participants(&swap, &now).await?;
            }
        }

        tracing::info!(session_id, "Session completed");

        for participant in &session.participant_ids {
            self.notifications
                .send_logged(
                    NotificationService::compose(
                        participant,
                        NotificationType::SessionCompleted,
                        "Session completed",
                        format!(
                            "Your {} session is complete. Rate your partner!",
                            session.skill_topic
                        ),
                    )
                    .about(&session.id, user_id),
                )
                .await;
        }

        Ok(session)
    }

    pub async fn cancel(&self, session_id: &str, user_id: &str) -> Result<Session> {
        let mut session = self.session_for(session_id, user_id).await?;
        session.cancel()?;
        self.db.set_session(&session).await?;

        tracing::info!(session_id, user_id, "Session cancelled");
        Ok(session)
    }

    async fn credit_participants(&self, swap: &Swap, now: &str) -> Result<()> {
        let mut users: Vec<User> = Vec::with_capacity(2);
        for id in swap.participant_ids() {
            match self.db.get_user(id).await? {
                Some(mut user) => {
                    user.record_completed_swap(now);
                    users.push(user);
                }
                None => {
                    tracing::warn!(user_id = id, swap_id = %swap.id, "Swap participant missing")
                }
            }
        }
        self.db.upsert_users(&users).await
    }
}
