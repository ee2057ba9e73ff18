use chrono::Utc;
use sled::{Db, Tree};
use uuid::Uuid;

use super::dto::{NewPost, Post, PostFilter, PostStatus, PostUpdate};
use crate::helpers::error::{StoreError, StoreResult};

const POSTS_TREE: &str = "posts";

#[derive(Clone)]
pub struct PostStorage {
    tree: Tree,
}

impl PostStorage {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(POSTS_TREE)?;
        Ok(Self { tree })
    }

    pub fn create(&self, user_id: &str, new_post: NewPost) -> StoreResult<Post> {
        if new_post.platforms.is_empty() {
            return Err(StoreError::Invalid("Select at least one platform".to_string()));
        }
        if new_post.content.is_empty() {
            return Err(StoreError::Invalid("Post text or media is required".to_string()));
        }

        let status = new_post.status.unwrap_or(if new_post.scheduled_at.is_some() {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        });
        if !status.is_user_editable() {
            return Err(StoreError::Invalid(format!(
                "New posts cannot start as {}",
                status
            )));
        }
        if status == PostStatus::Scheduled && new_post.scheduled_at.is_none() {
            return Err(StoreError::Invalid(
                "scheduled_at is required for scheduled posts".to_string(),
            ));
        }

        let mut platforms = new_post.platforms;
        platforms.sort();
        platforms.dedup();

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            platforms,
            content: new_post.content,
            scheduled_at: new_post.scheduled_at,
            status,
            created_at: now,
            updated_at: now,
        };
        self.put(&post)?;
        Ok(post)
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Post>> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_owned(&self, user_id: &str, id: &str) -> StoreResult<Post> {
        self.get(id)?
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("Post {}", id)))
    }

    /// Matching posts ordered by schedule time, undated drafts last.
    pub fn list(&self, user_id: &str, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        let mut out = Vec::new();
        for kv in self.tree.iter() {
            let (_key, value) = kv?;
            let post: Post = serde_json::from_slice(&value)?;
            if post.user_id == user_id && filter.matches(&post) {
                out.push(post);
            }
        }
        out.sort_by(|a, b| match (a.scheduled_at, b.scheduled_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        });
        Ok(out)
    }

    pub fn update(&self, user_id: &str, id: &str, update: PostUpdate) -> StoreResult<Post> {
        let mut post = self.get_owned(user_id, id)?;

        if !post.status.is_user_editable() {
            return Err(StoreError::Invalid(format!(
                "A {} post can no longer be changed",
                post.status
            )));
        }

        if let Some(platforms) = update.platforms {
            if platforms.is_empty() {
                return Err(StoreError::Invalid("Select at least one platform".to_string()));
            }
            post.platforms = platforms;
            post.platforms.sort();
            post.platforms.dedup();
        }
        if let Some(content) = update.content {
            if content.is_empty() {
                return Err(StoreError::Invalid("Post text or media is required".to_string()));
            }
            post.content = content;
        }
        if let Some(at) = update.scheduled_at {
            post.scheduled_at = Some(at);
        }
        if let Some(status) = update.status {
            post.status = post
                .status
                .transition(status)
                .map_err(|e| StoreError::Invalid(e.to_string()))?;
        }
        if post.status == PostStatus::Scheduled && post.scheduled_at.is_none() {
            return Err(StoreError::Invalid(
                "scheduled_at is required for scheduled posts".to_string(),
            ));
        }

        post.updated_at = Utc::now();
        self.put(&post)?;
        Ok(post)
    }

    pub fn cancel(&self, user_id: &str, id: &str) -> StoreResult<Post> {
        self.update(
            user_id,
            id,
            PostUpdate {
                status: Some(PostStatus::Cancelled),
                ..Default::default()
            },
        )
    }

    fn put(&self, post: &Post) -> StoreResult<()> {
        self.tree.insert(post.id.as_bytes(), serde_json::to_vec(post)?)?;
        Ok(())
    }
}
