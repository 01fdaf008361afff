// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled teaching session model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{SessionType, TransitionError};
use crate::time_utils::parse_rfc3339;

/// Participants may join this many minutes before the start time.
pub const JOIN_EARLY_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "Scheduled",
            SessionStatus::Ongoing => "Ongoing",
            SessionStatus::Completed => "Completed",
            SessionStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeetingType {
    #[serde(rename = "Video Call")]
    Video,
    #[serde(rename = "Audio Call")]
    Audio,
    #[serde(rename = "In Person")]
    InPerson,
    #[default]
    None,
}

/// Session stored in Firestore (`sessions/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "binding-generation",
    derive(TS),
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Session {
    pub id: String,
    pub swap_id: Option<String>,
    pub participant_ids: Vec<String>,

    pub skill_topic: String,
    pub session_type: SessionType,
    pub description: Option<String>,

    /// Start time (RFC3339)
    pub scheduled_at: String,
    pub duration_minutes: u32,

    pub meeting_link: Option<String>,
    #[serde(default)]
    pub meeting_type: MeetingType,

    pub status: SessionStatus,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl Session {
    pub fn involves(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(&self.scheduled_at)
    }

    /// Scheduled and not started yet.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Scheduled && self.start_time().is_some_and(|t| t > now)
    }

    /// Scheduled, and `now` falls between 15 minutes before the start and
    /// the scheduled end.
    pub fn can_join(&self, now: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::Scheduled {
            return false;
        }
        let Some(start) = self.start_time() else {
            return false;
        };
        let opens = start - Duration::minutes(JOIN_EARLY_MINUTES);
        let ends = start + Duration::minutes(i64::from(self.duration_minutes));
        now >= opens && now <= ends
    }

    fn transition(
        &mut self,
        allowed_from: &[SessionStatus],
        target: SessionStatus,
    ) -> Result<(), TransitionError> {
        if !allowed_from.contains(&self.status) {
            return Err(TransitionError::Invalid {
                entity: "session",
                from: self.status.as_str(),
                to: target.as_str(),
            });
        }
        self.status = target;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(&[SessionStatus::Scheduled], SessionStatus::Ongoing)
    }

    pub fn complete(&mut self, now: &str) -> Result<(), TransitionError> {
        self.transition(
            &[SessionStatus::Scheduled, SessionStatus::Ongoing],
            SessionStatus::Completed,
        )?;
        self.completed_at = Some(now.to_string());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.transition(
            &[SessionStatus::Scheduled, SessionStatus::Ongoing],
            SessionStatus::Cancelled,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_at(start: &str, duration_minutes: u32) -> Session {
        Session {
            id: "s1".to_string(),
            swap_id: Some("swap-1".to_string()),
            participant_ids: vec!["alice".to_string(), "bob".to_string()],
            skill_topic: "Guitar".to_string(),
            session_type: SessionType::Online,
            description: None,
            scheduled_at: start.to_string(),
            duration_minutes,
            meeting_link: None,
            meeting_type: MeetingType::Video,
            status: SessionStatus::Scheduled,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn test_join_window() {
        let session = session_at("2024-01-15T10:00:00.000Z", 60);
        let at = |h, m| Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap();

        assert!(!session.can_join(at(9, 44)));
        assert!(session.can_join(at(9, 45)));
        assert!(session.can_join(at(10, 30)));
        assert!(session.can_join(at(11, 0)));
        assert!(!session.can_join(at(11, 1)));
    }

    #[test]
    fn test_cancelled_session_cannot_be_joined_or_completed() {
        let mut session = session_at("2024-01-15T10:00:00.000Z", 60);
        session.cancel().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert!(!session.can_join(now));
        assert!(session.complete("now").is_err());
        assert!(session.cancel().is_err());
    }

    #[test]
    fn test_lifecycle_scheduled_ongoing_completed() {
        let mut session = session_at("2024-01-15T10:00:00.000Z", 60);
        session.start().unwrap();
        assert!(session.start().is_err());
        session.complete("2024-01-15T11:00:00.000Z").unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(
            session.completed_at.as_deref(),
            Some("2024-01-15T11:00:00.000Z")
        );
    }

    #[test]
    fn test_upcoming_requires_future_start() {
        let session = session_at("2024-01-15T10:00:00.000Z", 60);
        let before = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 15, 10, 1, 0).unwrap();
        assert!(session.is_upcoming(before));
        assert!(!session.is_upcoming(after));
    }
}
