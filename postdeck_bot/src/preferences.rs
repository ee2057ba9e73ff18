use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sled::Db;
use teloxide::types::User;

use crate::i18n::Language;

const TREE_NAME: &str = "user_language_preferences";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct StoredPreference {
    language: Language,
}

/// Per-user language choice. Users who never picked one get the language of their Telegram client.
#[derive(Clone)]
pub struct LanguagePreferences {
    tree: sled::Tree,
    cache: Arc<DashMap<u64, Language>>,
}

impl LanguagePreferences {
    pub fn new(db: &Db) -> sled::Result<Self> {
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self {
            tree,
            cache: Arc::new(DashMap::new()),
        })
    }

    pub fn language(&self, user_id: u64, client_code: Option<&str>) -> Language {
        if let Some(lang) = self.cache.get(&user_id) {
            return *lang;
        }
        match self.tree.get(user_id.to_be_bytes()) {
            Ok(Some(bytes)) => match serde_json::from_slice::<StoredPreference>(&bytes) {
                Ok(stored) => {
                    self.cache.insert(user_id, stored.language);
                    stored.language
                }
                Err(e) => {
                    log::warn!("Discarding unreadable language preference for {}: {}", user_id, e);
                    Language::from_code(client_code)
                }
            },
            Ok(None) => Language::from_code(client_code),
            Err(e) => {
                log::error!("Failed to read language preference for {}: {}", user_id, e);
                Language::from_code(client_code)
            }
        }
    }

    /// Language for whoever sent an update; anonymous updates get the default.
    pub fn for_user(&self, user: Option<&User>) -> Language {
        match user {
            Some(user) => self.language(user.id.0, user.language_code.as_deref()),
            None => Language::default(),
        }
    }

    pub fn set_language(&self, user_id: u64, language: Language) -> Result<()> {
        let bytes = serde_json::to_vec(&StoredPreference { language })?;
        self.tree.insert(user_id.to_be_bytes(), bytes)?;
        self.cache.insert(user_id, language);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_client_language() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let prefs = LanguagePreferences::new(&db).unwrap();

        assert_eq!(prefs.language(7, Some("es")), Language::Es);
        assert_eq!(prefs.language(7, None), Language::En);
    }

    #[test]
    fn test_stored_choice_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        LanguagePreferences::new(&db)
            .unwrap()
            .set_language(7, Language::Es)
            .unwrap();

        let fresh = LanguagePreferences::new(&db).unwrap();
        assert_eq!(fresh.language(7, Some("en")), Language::Es);
    }
}
