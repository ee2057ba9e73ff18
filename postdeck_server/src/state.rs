use std::sync::Arc;

use anyhow::Result;
use postdeck_core::{
    accounts::{
        storage::AccountStorage,
        tester::{ApiBases, CredentialTester},
    },
    english_learning::tutor::EnglishTutor,
    helpers::{encryption::CredentialCipher, jwt::JwtManager},
    posts::storage::PostStorage,
    telegram::{broadcast::ChannelSender, storage::ChannelStorage},
    twitter::{client::TwitterClient, storage::OAuthStateStorage},
    users::storage::UserStorage,
};
use sled::Db;
use teloxide::Bot;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    config: ServerConfig,
    jwt: JwtManager,
    users: UserStorage,
    accounts: AccountStorage,
    posts: PostStorage,
    channels: ChannelStorage,
    oauth_states: OAuthStateStorage,
    twitter: TwitterClient,
    tester: CredentialTester,
    tutor: Option<EnglishTutor>,
    telegram: Option<Arc<dyn ChannelSender>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, db: &Db) -> Result<Self> {
        let twitter = TwitterClient::new(config.twitter_api_base.clone());
        let telegram = config
            .teloxide_token
            .as_ref()
            .map(|token| Arc::new(Bot::new(token)) as Arc<dyn ChannelSender>);

        Ok(Self {
            jwt: JwtManager::new(config.secret.clone()),
            users: UserStorage::new(db)?,
            accounts: AccountStorage::new(db, CredentialCipher::new(&config.credentials_key))?,
            posts: PostStorage::new(db)?,
            channels: ChannelStorage::new(db)?,
            oauth_states: OAuthStateStorage::new(db)?,
            tester: CredentialTester::new(
                twitter.clone(),
                config.twitter_app_keys.clone(),
                ApiBases::default(),
            ),
            twitter,
            tutor: EnglishTutor::from_env(),
            telegram,
            config,
        })
    }

    pub fn with_tutor(mut self, tutor: Option<EnglishTutor>) -> Self {
        self.tutor = tutor;
        self
    }

    pub fn with_telegram(mut self, sender: Option<Arc<dyn ChannelSender>>) -> Self {
        self.telegram = sender;
        self
    }

    pub fn with_users(mut self, users: UserStorage) -> Self {
        self.users = users;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    pub fn users(&self) -> &UserStorage {
        &self.users
    }

    pub fn accounts(&self) -> &AccountStorage {
        &self.accounts
    }

    pub fn posts(&self) -> &PostStorage {
        &self.posts
    }

    pub fn channels(&self) -> &ChannelStorage {
        &self.channels
    }

    pub fn oauth_states(&self) -> &OAuthStateStorage {
        &self.oauth_states
    }

    pub fn twitter(&self) -> &TwitterClient {
        &self.twitter
    }

    pub fn tester(&self) -> &CredentialTester {
        &self.tester
    }

    pub fn tutor(&self) -> Option<&EnglishTutor> {
        self.tutor.as_ref()
    }

    pub fn telegram(&self) -> Option<&Arc<dyn ChannelSender>> {
        self.telegram.as_ref()
    }
}
