use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use postdeck_core::{
    helpers::env,
    oauth_config::{
        dto::default_platforms,
        source::{ConfigSource, HttpConfigSource, StaticConfigSource},
    },
    twitter::credential_file::TwitterCredentialFile,
};

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub teloxide_token: String,
    pub sled_url: String,
    pub twitter_accounts: TwitterCredentialFile,
    /// API server to read `/oauth/config` from. Without it the built-in list is used.
    pub api_url: Option<String>,
    pub oauth_cache_file: PathBuf,
    pub twitter_oauth_configured: bool,
    /// Telegram user ids allowed to change the shared credentials file.
    pub admin_ids: Vec<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            teloxide_token: env::required("TELOXIDE_TOKEN")?,
            sled_url: env::required("SLED_URL")?,
            twitter_accounts: TwitterCredentialFile::from_env(),
            api_url: env::optional("POSTDECK_API_URL"),
            oauth_cache_file: PathBuf::from(env::or_default(
                "OAUTH_CONFIG_CACHE_FILE",
                "oauth_config_cache.json",
            )),
            twitter_oauth_configured: env::optional("TWITTER_CLIENT_ID").is_some(),
            admin_ids: env::optional("ADMIN_IDS")
                .map(|raw| parse_admin_ids(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn oauth_source(&self) -> Arc<dyn ConfigSource> {
        match &self.api_url {
            Some(url) => Arc::new(HttpConfigSource::new(url.clone())),
            None => Arc::new(StaticConfigSource(default_platforms(
                self.twitter_oauth_configured,
            ))),
        }
    }
}

/// Comma separated user ids; entries that are not numbers are skipped with a warning.
pub fn parse_admin_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| match id.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("Ignoring invalid ADMIN_IDS entry {:?}", id);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("12, 34,,abc,56 "), vec![12, 34, 56]);
        assert!(parse_admin_ids("").is_empty());
    }
}
