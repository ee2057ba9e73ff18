use anyhow::{Result, anyhow};
use bincode::{Decode, Encode};
use chrono::{DateTime, Utc};
use postdeck_core::{
    accounts::dto::Platform,
    posts::dto::{NewPost, PostContent, PostStatus},
};

/// A post being composed in a chat. `created_at` (unix seconds) doubles as the id carried in callback data.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct PostDraft {
    pub chat_id: i64,
    pub created_at: i64,
    pub text: Option<String>,
    pub platforms: Vec<String>,
    pub twitter_account: Option<String>,
    pub scheduled_at: Option<i64>,
}

impl PostDraft {
    pub fn new(chat_id: i64, created_at: i64) -> Self {
        Self {
            chat_id,
            created_at,
            text: None,
            platforms: Vec::new(),
            twitter_account: None,
            scheduled_at: None,
        }
    }

    pub fn has_platform(&self, platform: Platform) -> bool {
        self.platforms.iter().any(|p| p == platform.as_str())
    }

    /// Flip `platform` in the selection and return whether it is now selected.
    /// Dropping Twitter also drops the bound account.
    pub fn toggle_platform(&mut self, platform: Platform) -> bool {
        if self.has_platform(platform) {
            self.platforms.retain(|p| p != platform.as_str());
            if platform == Platform::Twitter {
                self.twitter_account = None;
            }
            false
        } else {
            self.platforms.push(platform.as_str().to_string());
            true
        }
    }

    pub fn selected_platforms(&self) -> Vec<Platform> {
        self.platforms.iter().filter_map(|p| p.parse().ok()).collect()
    }

    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    /// The post to persist when the draft is confirmed for `at`.
    pub fn to_new_post(&self, at: DateTime<Utc>) -> Result<NewPost> {
        let text = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Draft {} has no text", self.created_at))?;
        Ok(NewPost {
            platforms: self.selected_platforms(),
            content: PostContent {
                text: text.to_string(),
                media: Vec::new(),
            },
            scheduled_at: Some(at),
            status: Some(PostStatus::Scheduled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_toggle_twitter_clears_account() {
        let mut draft = PostDraft::new(1, 100);
        assert!(draft.toggle_platform(Platform::Twitter));
        draft.twitter_account = Some("main".to_string());
        assert!(draft.toggle_platform(Platform::Linkedin));

        assert!(!draft.toggle_platform(Platform::Twitter));
        assert_eq!(draft.twitter_account, None);
        assert_eq!(draft.selected_platforms(), vec![Platform::Linkedin]);
    }

    #[test]
    fn test_to_new_post_requires_text() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut draft = PostDraft::new(1, 100);
        draft.toggle_platform(Platform::Telegram);
        assert!(draft.to_new_post(at).is_err());

        draft.text = Some("  hello  ".to_string());
        let post = draft.to_new_post(at).unwrap();
        assert_eq!(post.content.text, "hello");
        assert_eq!(post.scheduled_at, Some(at));
        assert_eq!(post.status, Some(PostStatus::Scheduled));
        assert_eq!(post.platforms, vec![Platform::Telegram]);
    }
}
