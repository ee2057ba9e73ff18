use anyhow::Result;
use sled::{Db, IVec, Tree};

use super::dto::PostDraft;

const POST_DRAFTS_TREE: &str = "post_drafts";
const ACTIVE_DRAFTS_TREE: &str = "active_drafts";
/// Drafts untouched for this long are swept at startup.
pub const DRAFT_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Drafts keyed by `(chat_id, created_at)`, plus a pointer per chat to the draft
/// that the next plain text message fills in.
#[derive(Clone)]
pub struct DraftStorage {
    drafts: Tree,
    active: Tree,
}

impl DraftStorage {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let drafts = db.open_tree(POST_DRAFTS_TREE)?;
        let active = db.open_tree(ACTIVE_DRAFTS_TREE)?;
        Ok(Self { drafts, active })
    }

    /// Create an empty draft and make it the chat's active one. The draft it
    /// replaces is dropped.
    pub fn start(&self, chat_id: i64, created_at: i64) -> Result<PostDraft> {
        let draft = PostDraft::new(chat_id, created_at);
        self.put(&draft)?;
        let previous = self
            .active
            .insert(chat_id.to_be_bytes(), created_at.to_be_bytes().to_vec())?;
        if let Some(previous) = previous {
            let bytes: [u8; 8] = previous[..].try_into()?;
            let previous_ts = i64::from_be_bytes(bytes);
            if previous_ts != created_at {
                self.drafts.remove(Self::key_bytes(chat_id, previous_ts))?;
            }
        }
        Ok(draft)
    }

    pub fn put(&self, draft: &PostDraft) -> Result<()> {
        let bytes = bincode::encode_to_vec(draft, bincode::config::standard())?;
        self.drafts
            .insert(Self::key_bytes(draft.chat_id, draft.created_at), bytes)?;
        Ok(())
    }

    pub fn get(&self, chat_id: i64, created_at: i64) -> Result<Option<PostDraft>> {
        match self.drafts.get(Self::key_bytes(chat_id, created_at))? {
            Some(ivec) => Ok(Some(Self::decode(&ivec)?)),
            None => Ok(None),
        }
    }

    pub fn active(&self, chat_id: i64) -> Result<Option<PostDraft>> {
        let Some(ts) = self.active.get(chat_id.to_be_bytes())? else {
            return Ok(None);
        };
        let bytes: [u8; 8] = ts[..].try_into()?;
        self.get(chat_id, i64::from_be_bytes(bytes))
    }

    pub fn delete(&self, chat_id: i64, created_at: i64) -> Result<()> {
        self.drafts.remove(Self::key_bytes(chat_id, created_at))?;
        let chat_key = chat_id.to_be_bytes();
        // Only clear the pointer if a newer draft has not replaced it.
        let _ = self.active.compare_and_swap(
            chat_key,
            Some(created_at.to_be_bytes()),
            None as Option<&[u8]>,
        )?;
        Ok(())
    }

    /// Remove drafts created before `now - max_age_secs`, along with any active
    /// pointer still naming them.
    pub fn cleanup_expired(&self, now: i64, max_age_secs: i64) -> Result<usize> {
        let cutoff = now - max_age_secs;
        let mut expired = Vec::new();

        for kv in self.drafts.iter() {
            let (key, _) = kv?;
            if key.len() != 16 {
                expired.push((key, None));
                continue;
            }
            let chat: [u8; 8] = key[..8].try_into()?;
            let ts: [u8; 8] = key[8..].try_into()?;
            let created_at = i64::from_be_bytes(ts);
            if created_at < cutoff {
                expired.push((key, Some((i64::from_be_bytes(chat), created_at))));
            }
        }

        for (key, parsed) in &expired {
            match parsed {
                Some((chat_id, created_at)) => self.delete(*chat_id, *created_at)?,
                None => {
                    self.drafts.remove(key)?;
                }
            }
        }
        Ok(expired.len())
    }

    fn decode(ivec: &IVec) -> Result<PostDraft> {
        let (draft, _) =
            bincode::decode_from_slice::<PostDraft, _>(ivec, bincode::config::standard())?;
        Ok(draft)
    }

    fn key_bytes(chat_id: i64, created_at: i64) -> Vec<u8> {
        let mut v = Vec::with_capacity(16);
        v.extend_from_slice(&chat_id.to_be_bytes());
        v.extend_from_slice(&created_at.to_be_bytes());
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, DraftStorage) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        (dir, DraftStorage::new(&db).unwrap())
    }

    #[test]
    fn test_start_sets_active_draft() {
        let (_dir, drafts) = storage();
        drafts.start(10, 100).unwrap();
        let mut second = drafts.start(10, 200).unwrap();
        second.text = Some("hi".to_string());
        drafts.put(&second).unwrap();

        let active = drafts.active(10).unwrap().unwrap();
        assert_eq!(active.created_at, 200);
        assert_eq!(active.text.as_deref(), Some("hi"));
        assert!(drafts.active(11).unwrap().is_none());
    }

    #[test]
    fn test_second_start_drops_the_abandoned_draft() {
        let (_dir, drafts) = storage();
        let mut first = drafts.start(10, 100).unwrap();
        first.text = Some("never sent".to_string());
        drafts.put(&first).unwrap();
        drafts.start(11, 100).unwrap();

        drafts.start(10, 200).unwrap();
        assert!(drafts.get(10, 100).unwrap().is_none());
        assert!(drafts.get(10, 200).unwrap().is_some());
        // Other chats are untouched.
        assert!(drafts.get(11, 100).unwrap().is_some());

        // Restarting within the same second keeps the draft.
        drafts.start(10, 200).unwrap();
        assert!(drafts.get(10, 200).unwrap().is_some());
    }

    #[test]
    fn test_cleanup_expired_sweeps_old_drafts() {
        let (_dir, drafts) = storage();
        drafts.start(10, 1_000).unwrap();
        drafts.start(11, 1_000).unwrap();
        drafts.start(11, 5_000).unwrap();
        drafts.start(12, 9_000).unwrap();

        assert_eq!(drafts.cleanup_expired(10_000, 5_000).unwrap(), 1);
        assert!(drafts.get(10, 1_000).unwrap().is_none());
        assert!(drafts.active(10).unwrap().is_none());
        assert_eq!(drafts.active(11).unwrap().unwrap().created_at, 5_000);
        assert!(drafts.get(12, 9_000).unwrap().is_some());
    }

    #[test]
    fn test_delete_keeps_newer_active_pointer() {
        let (_dir, drafts) = storage();
        drafts.put(&PostDraft::new(10, 100)).unwrap();
        drafts.start(10, 200).unwrap();

        drafts.delete(10, 100).unwrap();
        assert_eq!(drafts.active(10).unwrap().unwrap().created_at, 200);

        drafts.delete(10, 200).unwrap();
        assert!(drafts.active(10).unwrap().is_none());
        assert!(drafts.get(10, 200).unwrap().is_none());
    }
}
