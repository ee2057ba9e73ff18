use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of `credentials/twitter_accounts.json`, keyed by `account_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TwitterCredentialRecord {
    pub account_name: String,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    pub access_token: String,
    pub access_secret: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OAuthPurpose {
    /// Sign in to the dashboard with X.
    Login,
    /// Attach an X account to an already signed-in user.
    Connect,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthState {
    pub purpose: OAuthPurpose,
    pub user_id: Option<String>,
    pub verifier: String,
    pub created_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TwitterProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub profile_image_url: Option<String>,
    pub verified: Option<bool>,
    pub public_metrics: Option<TwitterPublicMetrics>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TwitterPublicMetrics {
    pub followers_count: u32,
    pub following_count: u32,
    pub tweet_count: u32,
    pub listed_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TwitterTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scope: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TwitterApiResponse<T> {
    pub data: T,
}
