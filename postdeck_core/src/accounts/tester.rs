use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;

use super::dto::Platform;
use crate::twitter::client::{TwitterAppKeys, TwitterClient};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";
pub const INSTAGRAM_API_BASE: &str = "https://graph.instagram.com";
pub const LINKEDIN_API_BASE: &str = "https://api.linkedin.com/v2";

#[derive(Clone)]
pub struct ApiBases {
    pub telegram: String,
    pub graph: String,
    pub instagram: String,
    pub linkedin: String,
}

impl Default for ApiBases {
    fn default() -> Self {
        Self {
            telegram: TELEGRAM_API_BASE.to_string(),
            graph: GRAPH_API_BASE.to_string(),
            instagram: INSTAGRAM_API_BASE.to_string(),
            linkedin: LINKEDIN_API_BASE.to_string(),
        }
    }
}

/// Live check of stored credentials against each platform's "who am I" endpoint.
#[derive(Clone)]
pub struct CredentialTester {
    http: Client,
    twitter: TwitterClient,
    app_keys: Option<TwitterAppKeys>,
    bases: ApiBases,
}

impl CredentialTester {
    pub fn new(twitter: TwitterClient, app_keys: Option<TwitterAppKeys>, bases: ApiBases) -> Self {
        Self {
            http: Client::new(),
            twitter,
            app_keys,
            bases,
        }
    }

    /// Returns the identity the platform reports for these credentials.
    pub async fn test(
        &self,
        platform: Platform,
        credentials: &BTreeMap<String, String>,
    ) -> Result<String> {
        match platform {
            Platform::Twitter => {
                let token = require(credentials, "access_token")?;
                let profile = match credentials.get("access_secret") {
                    Some(secret) => {
                        let keys = match (credentials.get("api_key"), credentials.get("api_secret")) {
                            (Some(key), Some(app_secret)) => TwitterAppKeys {
                                api_key: key.clone(),
                                api_secret: app_secret.clone(),
                            },
                            _ => self
                                .app_keys
                                .clone()
                                .context("Twitter app keys are not configured")?,
                        };
                        self.twitter.me_with_oauth1(&keys, token, secret).await?
                    }
                    None => self.twitter.me_with_bearer(token).await?,
                };
                Ok(format!("@{}", profile.username))
            }
            Platform::Telegram => {
                let token = require(credentials, "bot_token")?;
                let url = format!("{}/bot{}/getMe", self.bases.telegram, token);
                let body = self.get_json(&url, None).await?;
                if body["ok"].as_bool() != Some(true) {
                    return Err(anyhow!("Telegram rejected the bot token"));
                }
                let username = body["result"]["username"].as_str().unwrap_or_default();
                Ok(format!("@{}", username))
            }
            Platform::Facebook => {
                let page_id = require(credentials, "page_id")?;
                let url = format!("{}/{}?fields=id,name", self.bases.graph, page_id);
                let body = self.get_json(&url, Some(require(credentials, "access_token")?)).await?;
                name_field(&body, "name")
            }
            Platform::Instagram => {
                let url = format!("{}/me?fields=id,username", self.bases.instagram);
                let body = self.get_json(&url, Some(require(credentials, "access_token")?)).await?;
                name_field(&body, "username")
            }
            Platform::Linkedin => {
                let url = format!("{}/userinfo", self.bases.linkedin);
                let body = self.get_json(&url, Some(require(credentials, "access_token")?)).await?;
                name_field(&body, "name")
            }
        }
    }

    async fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value> {
        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Credential check failed with status {}", status));
        }
        Ok(response.json().await?)
    }
}

fn require<'a>(credentials: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str> {
    credentials
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("Missing credential: {}", key))
}

fn name_field(body: &Value, field: &str) -> Result<String> {
    body[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Unexpected response: missing {}", field))
}
