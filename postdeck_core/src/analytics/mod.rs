use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    accounts::dto::{Platform, PlatformAccount},
    posts::dto::{Post, PostStatus},
};

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub total: usize,
    pub published: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub days: u32,
    pub total_posts: usize,
    pub upcoming: usize,
    pub connected_accounts: usize,
    pub by_status: BTreeMap<PostStatus, usize>,
    pub by_platform: BTreeMap<Platform, usize>,
    pub daily: Vec<DailyCount>,
}

/// The day a post belongs to in the series: its schedule, or its creation for undated drafts.
fn post_day(post: &Post) -> NaiveDate {
    post.scheduled_at.unwrap_or(post.created_at).date_naive()
}

/// Aggregate a user's posts over the last `days` days ending today (inclusive).
/// Status and platform counts cover every post; the daily series covers the window only.
pub fn summarize(
    posts: &[Post],
    accounts: &[PlatformAccount],
    now: DateTime<Utc>,
    days: u32,
) -> AnalyticsReport {
    let days = days.clamp(1, MAX_DAYS);
    let today = now.date_naive();
    let first_day = today - Duration::days(i64::from(days) - 1);

    let mut by_status: BTreeMap<PostStatus, usize> =
        PostStatus::ALL.iter().map(|s| (*s, 0)).collect();
    let mut by_platform: BTreeMap<Platform, usize> = BTreeMap::new();
    let mut daily: BTreeMap<NaiveDate, DailyCount> = first_day
        .iter_days()
        .take(days as usize)
        .map(|date| {
            (
                date,
                DailyCount {
                    date,
                    ..Default::default()
                },
            )
        })
        .collect();

    for post in posts {
        *by_status.entry(post.status).or_default() += 1;
        for platform in &post.platforms {
            *by_platform.entry(*platform).or_default() += 1;
        }
        if let Some(day) = daily.get_mut(&post_day(post)) {
            day.total += 1;
            match post.status {
                PostStatus::Published => day.published += 1,
                PostStatus::Failed => day.failed += 1,
                _ => {}
            }
        }
    }

    let upcoming = posts
        .iter()
        .filter(|p| p.status == PostStatus::Scheduled)
        .filter(|p| p.scheduled_at.map(|at| at > now).unwrap_or(false))
        .count();

    AnalyticsReport {
        days,
        total_posts: posts.len(),
        upcoming,
        connected_accounts: accounts.iter().filter(|a| a.is_active).count(),
        by_status,
        by_platform,
        daily: daily.into_values().collect(),
    }
}
