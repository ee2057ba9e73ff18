use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{
    auth::{current_timestamp, generate_nonce, OAuth1Request},
    dto::{TwitterApiResponse, TwitterCredentialRecord, TwitterProfile, TwitterTokenResponse},
};
use crate::helpers::env;

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
const USER_FIELDS: &str = "id,username,name,profile_image_url,verified,public_metrics";

/// Consumer key pair of the X app, needed for OAuth1 user-context calls.
#[derive(Debug, Clone)]
pub struct TwitterAppKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl TwitterAppKeys {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::required("TWITTER_API_KEY")?,
            api_secret: env::required("TWITTER_API_SECRET")?,
        })
    }
}

#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    api_base: String,
}

impl TwitterClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::or_default("TWITTER_API_BASE", DEFAULT_API_BASE))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TwitterTokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
            ("client_id", client_id),
        ];
        let basic = STANDARD.encode(format!("{}:{}", client_id, client_secret));

        let response = self
            .http
            .post(self.url("/2/oauth2/token"))
            .header("Authorization", format!("Basic {}", basic))
            .form(&params)
            .send()
            .await?;

        parse_json(response, "Token exchange").await
    }

    pub async fn me_with_bearer(&self, access_token: &str) -> Result<TwitterProfile> {
        let response = self
            .http
            .get(self.url("/2/users/me"))
            .bearer_auth(access_token)
            .query(&[("user.fields", USER_FIELDS)])
            .send()
            .await?;

        let body: TwitterApiResponse<TwitterProfile> = parse_json(response, "Profile fetch").await?;
        Ok(body.data)
    }

    pub async fn me_with_oauth1(
        &self,
        keys: &TwitterAppKeys,
        access_token: &str,
        access_secret: &str,
    ) -> Result<TwitterProfile> {
        let url = self.url("/2/users/me");
        let nonce = generate_nonce();
        let signed = OAuth1Request {
            method: "GET",
            url: &url,
            params: &[("user.fields", USER_FIELDS)],
            consumer_key: &keys.api_key,
            consumer_secret: &keys.api_secret,
            token: access_token,
            token_secret: access_secret,
            nonce: &nonce,
            timestamp: current_timestamp(),
        };

        let response = self
            .http
            .get(&url)
            .header("Authorization", signed.authorization_header())
            .query(&[("user.fields", USER_FIELDS)])
            .send()
            .await?;

        let body: TwitterApiResponse<TwitterProfile> = parse_json(response, "Credential check").await?;
        Ok(body.data)
    }

    pub async fn verify_record(
        &self,
        keys: &TwitterAppKeys,
        record: &TwitterCredentialRecord,
    ) -> Result<TwitterProfile> {
        self.me_with_oauth1(keys, &record.access_token, &record.access_secret)
            .await
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("{} failed ({}): {}", what, status, error_text));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn profile_body() -> serde_json::Value {
        json!({
            "data": {
                "id": "42",
                "username": "postdeck",
                "name": "Post Deck",
                "public_metrics": {
                    "followers_count": 10,
                    "following_count": 2,
                    "tweet_count": 100,
                    "listed_count": 0
                }
            }
        })
    }

    #[tokio::test]
    async fn test_oauth1_profile_fetch_signs_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = TwitterClient::new(server.uri());
        let keys = TwitterAppKeys {
            api_key: "ck".to_string(),
            api_secret: "cs".to_string(),
        };
        let profile = client.me_with_oauth1(&keys, "t", "s").await.unwrap();
        assert_eq!(profile.username, "postdeck");
        assert_eq!(profile.public_metrics.unwrap().followers_count, 10);
    }

    #[tokio::test]
    async fn test_unauthorized_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let client = TwitterClient::new(server.uri());
        let err = client.me_with_bearer("bad").await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "token_type": "bearer",
                "scope": "tweet.read users.read",
                "expires_in": 7200
            })))
            .mount(&server)
            .await;

        let client = TwitterClient::new(format!("{}/", server.uri()));
        let token = client
            .exchange_code("code", "verifier", "id", "secret", "https://cb")
            .await
            .unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
    }
}
