use std::sync::Arc;

use postdeck_core::{
    oauth_config::cache::OAuthConfigCache, posts::storage::PostStorage,
    telegram::storage::ChannelStorage, twitter::credential_file::TwitterCredentialFile,
};

use crate::{drafts::storage::DraftStorage, preferences::LanguagePreferences};

#[derive(Clone)]
pub struct BotDependencies {
    pub db: sled::Db,
    pub posts: PostStorage,
    pub channels: ChannelStorage,
    pub drafts: DraftStorage,
    pub preferences: LanguagePreferences,
    pub credentials: TwitterCredentialFile,
    pub oauth_config: OAuthConfigCache,
    pub admin_ids: Arc<[u64]>,
}

impl BotDependencies {
    pub fn new(
        db: sled::Db,
        credentials: TwitterCredentialFile,
        oauth_config: OAuthConfigCache,
        admin_ids: Vec<u64>,
    ) -> sled::Result<Self> {
        Ok(Self {
            posts: PostStorage::new(&db)?,
            channels: ChannelStorage::new(&db)?,
            drafts: DraftStorage::new(&db)?,
            preferences: LanguagePreferences::new(&db)?,
            credentials,
            oauth_config,
            admin_ids: admin_ids.into(),
            db,
        })
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}
