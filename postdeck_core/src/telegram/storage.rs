use chrono::Utc;
use sled::{Db, Tree};
use uuid::Uuid;

use super::dto::{NewChannel, TelegramChannel};
use crate::helpers::error::{StoreError, StoreResult};

const TELEGRAM_CHANNELS_TREE: &str = "telegram_channels";

#[derive(Clone)]
pub struct ChannelStorage {
    tree: Tree,
}

impl ChannelStorage {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(TELEGRAM_CHANNELS_TREE)?;
        Ok(Self { tree })
    }

    pub fn add(
        &self,
        user_id: &str,
        entry: NewChannel,
        member_count: Option<u32>,
    ) -> StoreResult<TelegramChannel> {
        let username = entry.normalized_username().map_err(StoreError::Invalid)?;
        if entry.name.trim().is_empty() {
            return Err(StoreError::Invalid("Channel name is required".to_string()));
        }
        if self
            .list_for_user(user_id)?
            .iter()
            .any(|c| c.username.eq_ignore_ascii_case(&username))
        {
            return Err(StoreError::Conflict(format!(
                "Channel {} is already registered",
                username
            )));
        }

        let channel = TelegramChannel {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: entry.name.trim().to_string(),
            username,
            member_count,
            created_at: Utc::now(),
        };
        self.tree
            .insert(channel.id.as_bytes(), serde_json::to_vec(&channel)?)?;
        Ok(channel)
    }

    pub fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<TelegramChannel>> {
        let mut out = Vec::new();
        for kv in self.tree.iter() {
            let (_key, value) = kv?;
            let channel: TelegramChannel = serde_json::from_slice(&value)?;
            if channel.user_id == user_id {
                out.push(channel);
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Channels of `user_id` among `ids`; unknown or foreign ids are dropped.
    pub fn select(&self, user_id: &str, ids: &[String]) -> StoreResult<Vec<TelegramChannel>> {
        Ok(self
            .list_for_user(user_id)?
            .into_iter()
            .filter(|c| ids.contains(&c.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (ChannelStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        (ChannelStorage::new(&db).unwrap(), temp_dir)
    }

    fn entry(name: &str, username: &str) -> NewChannel {
        NewChannel {
            name: name.to_string(),
            username: username.to_string(),
        }
    }

    #[test]
    fn test_add_list_and_select() {
        let (storage, _temp) = create_test_storage();
        let news = storage.add("alice", entry("News", "news"), Some(120)).unwrap();
        storage.add("alice", entry("Alerts", "@alerts"), None).unwrap();
        let foreign = storage.add("bob", entry("Bob", "bob"), None).unwrap();

        let listed = storage.list_for_user("alice").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Alerts");
        assert_eq!(news.username, "@news");

        let selected = storage
            .select("alice", &[news.id.clone(), foreign.id.clone()])
            .unwrap();
        assert_eq!(selected, vec![news]);
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let (storage, _temp) = create_test_storage();
        storage.add("alice", entry("News", "news"), None).unwrap();
        assert!(matches!(
            storage.add("alice", entry("News again", "@NEWS"), None),
            Err(StoreError::Conflict(_))
        ));
        assert!(storage.add("bob", entry("News", "news"), None).is_ok());
    }
}
