use chrono::{DateTime, Utc};
use sled::{Db, Tree};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::dto::{NewPlatformAccount, Platform, PlatformAccount};
use crate::helpers::{
    encryption::CredentialCipher,
    error::{StoreError, StoreResult},
};

const PLATFORM_ACCOUNTS_TREE: &str = "platform_accounts";

/// Connected accounts, keyed by id. Credentials are sealed before they reach sled.
#[derive(Clone)]
pub struct AccountStorage {
    tree: Tree,
    cipher: CredentialCipher,
}

impl AccountStorage {
    pub fn new(db: &Db, cipher: CredentialCipher) -> sled::Result<Self> {
        let tree = db.open_tree(PLATFORM_ACCOUNTS_TREE)?;
        Ok(Self { tree, cipher })
    }

    pub fn create(&self, user_id: &str, entry: NewPlatformAccount) -> StoreResult<PlatformAccount> {
        let identifier = entry
            .account_identifier
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| entry.account_name.clone());

        let account = PlatformAccount {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            platform: entry.platform,
            account_name: entry.account_name.trim().to_string(),
            account_identifier: identifier,
            credentials: self.cipher.encrypt_map(&entry.credentials)?,
            credential_keys: entry.credentials.keys().cloned().collect(),
            is_active: true,
            last_validated: None,
            created_at: Utc::now(),
        };

        self.put(&account)?;
        log::info!(
            "Stored {} account {} for user {}",
            account.platform,
            account.account_identifier,
            user_id
        );
        Ok(account)
    }

    /// Replace the credentials of an existing (platform, identifier) pair or create it.
    /// Reconnecting through OAuth lands here.
    pub fn upsert_oauth_account(
        &self,
        user_id: &str,
        entry: NewPlatformAccount,
    ) -> StoreResult<PlatformAccount> {
        let identifier = entry
            .account_identifier
            .clone()
            .unwrap_or_else(|| entry.account_name.clone());

        match self.find_by_identifier(user_id, entry.platform, &identifier)? {
            Some(mut existing) => {
                existing.credentials = self.cipher.encrypt_map(&entry.credentials)?;
                existing.credential_keys = entry.credentials.keys().cloned().collect();
                existing.account_name = entry.account_name;
                existing.is_active = true;
                existing.last_validated = Some(Utc::now());
                self.put(&existing)?;
                Ok(existing)
            }
            None => {
                let mut created = self.create(user_id, entry)?;
                created.last_validated = Some(created.created_at);
                self.put(&created)?;
                Ok(created)
            }
        }
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<PlatformAccount>> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like `get`, but an account owned by someone else reads as missing.
    pub fn get_owned(&self, user_id: &str, id: &str) -> StoreResult<PlatformAccount> {
        self.get(id)?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("Account {}", id)))
    }

    pub fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<PlatformAccount>> {
        let mut out = Vec::new();
        for kv in self.tree.iter() {
            let (_key, value) = kv?;
            let account: PlatformAccount = serde_json::from_slice(&value)?;
            if account.user_id == user_id {
                out.push(account);
            }
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    pub fn find_by_identifier(
        &self,
        user_id: &str,
        platform: Platform,
        identifier: &str,
    ) -> StoreResult<Option<PlatformAccount>> {
        Ok(self
            .list_for_user(user_id)?
            .into_iter()
            .find(|a| a.platform == platform && a.account_identifier == identifier))
    }

    pub fn delete(&self, user_id: &str, id: &str) -> StoreResult<PlatformAccount> {
        let account = self.get_owned(user_id, id)?;
        self.tree.remove(id.as_bytes())?;
        log::info!("Deleted {} account {}", account.platform, account.id);
        Ok(account)
    }

    pub fn credentials(&self, account: &PlatformAccount) -> StoreResult<BTreeMap<String, String>> {
        Ok(self.cipher.decrypt_map(&account.credentials)?)
    }

    pub fn mark_validated(&self, id: &str, at: DateTime<Utc>) -> StoreResult<PlatformAccount> {
        let mut account = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("Account {}", id)))?;
        account.last_validated = Some(at);
        account.is_active = true;
        self.put(&account)?;
        Ok(account)
    }

    fn put(&self, account: &PlatformAccount) -> StoreResult<()> {
        self.tree
            .insert(account.id.as_bytes(), serde_json::to_vec(account)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (AccountStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = sled::open(temp_dir.path()).unwrap();
        let storage = AccountStorage::new(&db, CredentialCipher::new("test")).unwrap();
        (storage, temp_dir)
    }

    fn telegram_entry(name: &str) -> NewPlatformAccount {
        let mut credentials = BTreeMap::new();
        credentials.insert("bot_token".to_string(), "123:abc".to_string());
        NewPlatformAccount {
            platform: Platform::Telegram,
            account_name: name.to_string(),
            account_identifier: None,
            credentials,
        }
    }

    #[test]
    fn test_create_and_list_per_user() {
        let (storage, _temp) = create_test_storage();
        storage.create("alice", telegram_entry("news_bot")).unwrap();
        storage.create("bob", telegram_entry("other_bot")).unwrap();

        let alice = storage.list_for_user("alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].account_identifier, "news_bot");
        assert_eq!(alice[0].credential_keys, vec!["bot_token".to_string()]);
        assert!(!alice[0].credentials.contains("123:abc"));

        let creds = storage.credentials(&alice[0]).unwrap();
        assert_eq!(creds.get("bot_token").map(String::as_str), Some("123:abc"));
    }

    #[test]
    fn test_delete_checks_owner() {
        let (storage, _temp) = create_test_storage();
        let account = storage.create("alice", telegram_entry("news_bot")).unwrap();

        assert!(matches!(
            storage.delete("bob", &account.id),
            Err(StoreError::NotFound(_))
        ));
        storage.delete("alice", &account.id).unwrap();
        assert!(storage.get(&account.id).unwrap().is_none());
    }

    #[test]
    fn test_oauth_upsert_reuses_existing_account() {
        let (storage, _temp) = create_test_storage();
        let first = storage
            .upsert_oauth_account("alice", telegram_entry("news_bot"))
            .unwrap();
        let second = storage
            .upsert_oauth_account("alice", telegram_entry("news_bot"))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.last_validated.is_some());
        assert_eq!(storage.list_for_user("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_mark_validated() {
        let (storage, _temp) = create_test_storage();
        let account = storage.create("alice", telegram_entry("news_bot")).unwrap();
        assert!(account.last_validated.is_none());

        let now = Utc::now();
        let updated = storage.mark_validated(&account.id, now).unwrap();
        assert_eq!(updated.last_validated, Some(now));
    }
}
