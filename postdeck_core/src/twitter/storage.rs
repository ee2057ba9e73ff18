use anyhow::Result;
use sled::{Db, Tree};

use super::auth::{current_timestamp, is_state_expired};
use super::dto::OAuthState;

const OAUTH_STATES_TREE: &str = "oauth_states";

/// Pending OAuth2 authorizations, keyed by the `state` sent to X.
#[derive(Clone)]
pub struct OAuthStateStorage {
    tree: Tree,
}

impl OAuthStateStorage {
    pub fn new(db: &Db) -> sled::Result<Self> {
        Ok(Self {
            tree: db.open_tree(OAUTH_STATES_TREE)?,
        })
    }

    pub fn store(&self, state: &str, oauth_state: &OAuthState) -> Result<()> {
        self.tree.insert(state, serde_json::to_vec(oauth_state)?)?;
        Ok(())
    }

    /// Consume a state. Each state is usable once; expired ones read as `None`.
    pub fn take(&self, state: &str) -> Result<Option<OAuthState>> {
        let Some(bytes) = self.tree.remove(state)? else {
            return Ok(None);
        };
        let oauth_state: OAuthState = serde_json::from_slice(&bytes)?;

        if is_state_expired(oauth_state.created_at, current_timestamp()) {
            log::debug!("Discarding expired OAuth state");
            return Ok(None);
        }
        Ok(Some(oauth_state))
    }

    pub fn cleanup_expired(&self) -> Result<usize> {
        let now = current_timestamp();
        let mut expired = Vec::new();

        for kv in self.tree.iter() {
            let (key, value) = kv?;
            match serde_json::from_slice::<OAuthState>(&value) {
                Ok(s) if !is_state_expired(s.created_at, now) => {}
                _ => expired.push(key),
            }
        }

        for key in &expired {
            self.tree.remove(key)?;
        }
        Ok(expired.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::dto::OAuthPurpose;
    use tempfile::TempDir;

    fn create_test_storage() -> (OAuthStateStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        (OAuthStateStorage::new(&db).unwrap(), temp_dir)
    }

    fn state_created_at(created_at: u64) -> OAuthState {
        OAuthState {
            purpose: OAuthPurpose::Connect,
            user_id: Some("user-1".to_string()),
            verifier: "test_verifier".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_state_is_single_use() {
        let (storage, _temp) = create_test_storage();
        storage
            .store("abc", &state_created_at(current_timestamp()))
            .unwrap();

        let taken = storage.take("abc").unwrap().unwrap();
        assert_eq!(taken.verifier, "test_verifier");
        assert_eq!(taken.purpose, OAuthPurpose::Connect);
        assert!(storage.take("abc").unwrap().is_none());
    }

    #[test]
    fn test_expired_state_rejected_and_cleaned() {
        let (storage, _temp) = create_test_storage();
        storage.store("old", &state_created_at(1)).unwrap();
        storage.store("old2", &state_created_at(2)).unwrap();
        storage
            .store("fresh", &state_created_at(current_timestamp()))
            .unwrap();

        assert!(storage.take("old").unwrap().is_none());
        assert_eq!(storage.cleanup_expired().unwrap(), 1);
        assert!(storage.take("fresh").unwrap().is_some());
    }
}
