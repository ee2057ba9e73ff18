use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{accounts::dto::Platform, twitter::auth::{CONNECT_SCOPES, TWITTER_AUTHORIZE_URL}};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Platform {
    pub id: String,
    pub name: String,
    pub oauth2_available: bool,
    pub oauth2_scopes: Vec<String>,
    pub authorization_endpoint: Option<String>,
}

/// Snapshot persisted by a [`super::cache::CacheStore`]. `timestamp` is unix millis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedConfig {
    pub platforms: Vec<OAuth2Platform>,
    pub timestamp: i64,
}

/// Capability list served by `GET /oauth/config`.
///
/// Only Twitter has an OAuth2 flow here, and only when the app client id is configured.
pub fn default_platforms(twitter_oauth_configured: bool) -> Vec<OAuth2Platform> {
    Platform::ALL
        .iter()
        .map(|platform| {
            let is_twitter = *platform == Platform::Twitter;
            let available = is_twitter && twitter_oauth_configured;
            OAuth2Platform {
                id: platform.as_str().to_string(),
                name: platform.display_name().to_string(),
                oauth2_available: available,
                oauth2_scopes: if available {
                    CONNECT_SCOPES.split_whitespace().map(str::to_string).collect()
                } else {
                    Vec::new()
                },
                authorization_endpoint: available.then(|| TWITTER_AUTHORIZE_URL.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_twitter_has_oauth2() {
        let platforms = default_platforms(true);
        assert_eq!(platforms.len(), Platform::ALL.len());
        let available: Vec<_> = platforms.iter().filter(|p| p.oauth2_available).collect();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "twitter");
        assert!(available[0].authorization_endpoint.is_some());
    }

    #[test]
    fn test_unconfigured_disables_twitter() {
        assert!(default_platforms(false).iter().all(|p| !p.oauth2_available));
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(&default_platforms(true)[0]).unwrap();
        assert!(json.get("oauth2Available").is_some());
        assert!(json.get("authorizationEndpoint").is_some());
    }
}
