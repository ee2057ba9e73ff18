use chrono::{DateTime, Utc};
use postdeck_core::posts::dto::{PostFilter, PostStatus};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PostQuery {
    /// Inclusive lower bound on `scheduled_at`.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `scheduled_at`.
    pub end: Option<DateTime<Utc>>,
    pub status: Option<PostStatus>,
}

impl From<PostQuery> for PostFilter {
    fn from(query: PostQuery) -> Self {
        Self {
            start: query.start,
            end: query.end,
            status: query.status,
        }
    }
}
