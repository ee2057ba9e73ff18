use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::dto::OAuth2Platform;

/// Where the platform capability list comes from.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<OAuth2Platform>>;
}

/// Reads `GET {base}/oauth/config` from the API server.
pub struct HttpConfigSource {
    http: Client,
    base_url: String,
}

impl HttpConfigSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<Vec<OAuth2Platform>> {
        let response = self
            .http
            .get(format!("{}/oauth/config", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OAuth config request failed with status {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

/// Fixed list, used when bot and API run without network access to each other.
pub struct StaticConfigSource(pub Vec<OAuth2Platform>);

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn fetch(&self) -> Result<Vec<OAuth2Platform>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth_config::dto::default_platforms;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_http_source_reads_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(default_platforms(true)))
            .mount(&server)
            .await;

        let platforms = HttpConfigSource::new(server.uri()).fetch().await.unwrap();
        assert_eq!(platforms, default_platforms(true));
    }

    #[tokio::test]
    async fn test_http_source_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(HttpConfigSource::new(server.uri()).fetch().await.is_err());
    }
}
