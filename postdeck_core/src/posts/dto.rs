use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

use crate::accounts::dto::Platform;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot move a {from} post to {to}")]
pub struct TransitionError {
    pub from: PostStatus,
    pub to: PostStatus,
}

impl PostStatus {
    pub const ALL: [PostStatus; 5] = [
        PostStatus::Draft,
        PostStatus::Scheduled,
        PostStatus::Published,
        PostStatus::Failed,
        PostStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
            PostStatus::Cancelled => "cancelled",
        }
    }

    /// Published and failed are set by the external publisher; users cannot leave or enter them.
    pub fn is_user_editable(&self) -> bool {
        matches!(self, PostStatus::Draft | PostStatus::Scheduled)
    }

    pub fn transition(self, to: PostStatus) -> Result<PostStatus, TransitionError> {
        let allowed = match (self, to) {
            (a, b) if a == b => a.is_user_editable(),
            (PostStatus::Draft, PostStatus::Scheduled) => true,
            (PostStatus::Draft | PostStatus::Scheduled, PostStatus::Cancelled) => true,
            _ => false,
        };
        if allowed {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown post status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PostContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

impl PostContent {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.media.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub platforms: Vec<Platform>,
    pub content: PostContent,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub platforms: Vec<Platform>,
    pub content: PostContent,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

/// Partial update sent by the calendar (drag to reschedule) or the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PostUpdate {
    #[serde(default)]
    pub platforms: Option<Vec<Platform>>,
    #[serde(default)]
    pub content: Option<PostContent>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<PostStatus>,
}

impl PostFilter {
    /// Posts without a date only match when no date range is given.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(status) = self.status {
            if post.status != status {
                return false;
            }
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        match post.scheduled_at {
            Some(at) => {
                self.start.map(|start| at >= start).unwrap_or(true)
                    && self.end.map(|end| at < end).unwrap_or(true)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_transitions() {
        assert_eq!(
            PostStatus::Draft.transition(PostStatus::Scheduled),
            Ok(PostStatus::Scheduled)
        );
        assert!(PostStatus::Scheduled.transition(PostStatus::Cancelled).is_ok());
        assert!(PostStatus::Scheduled.transition(PostStatus::Scheduled).is_ok());
        assert!(PostStatus::Scheduled.transition(PostStatus::Draft).is_err());
    }

    #[test]
    fn test_terminal_states_are_locked() {
        for from in [PostStatus::Published, PostStatus::Failed, PostStatus::Cancelled] {
            assert!(from.transition(PostStatus::Scheduled).is_err());
        }
        assert!(PostStatus::Draft.transition(PostStatus::Published).is_err());
        assert_eq!(
            PostStatus::Published
                .transition(PostStatus::Cancelled)
                .unwrap_err()
                .to_string(),
            "Cannot move a published post to cancelled"
        );
    }
}
