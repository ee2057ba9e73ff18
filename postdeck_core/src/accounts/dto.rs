use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "x")]
    Twitter,
    Telegram,
    Instagram,
    Facebook,
    Linkedin,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Twitter,
        Platform::Telegram,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Linkedin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Telegram => "telegram",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter / X",
            Platform::Telegram => "Telegram",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Linkedin => "LinkedIn",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Twitter => "🐦",
            Platform::Telegram => "✈️",
            Platform::Instagram => "📸",
            Platform::Facebook => "📘",
            Platform::Linkedin => "💼",
        }
    }

    /// Keys a manually entered credential set must contain.
    pub fn required_credential_keys(&self) -> &'static [&'static str] {
        match self {
            Platform::Twitter => &["api_key", "api_secret", "access_token", "access_secret"],
            Platform::Telegram => &["bot_token"],
            Platform::Instagram => &["access_token", "account_id"],
            Platform::Facebook => &["page_id", "access_token"],
            Platform::Linkedin => &["access_token"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "telegram" => Ok(Platform::Telegram),
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "linkedin" => Ok(Platform::Linkedin),
            other => Err(anyhow::anyhow!("Unsupported platform: {}", other)),
        }
    }
}

/// Stored record. `credentials` holds the sealed JSON map, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformAccount {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub account_name: String,
    pub account_identifier: String,
    pub credentials: String,
    pub credential_keys: Vec<String>,
    pub is_active: bool,
    pub last_validated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What the API returns for an account: credential key names only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformAccountView {
    pub id: String,
    pub platform: Platform,
    pub account_name: String,
    pub account_identifier: String,
    pub credential_keys: Vec<String>,
    pub is_active: bool,
    pub last_validated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&PlatformAccount> for PlatformAccountView {
    fn from(account: &PlatformAccount) -> Self {
        Self {
            id: account.id.clone(),
            platform: account.platform,
            account_name: account.account_name.clone(),
            account_identifier: account.account_identifier.clone(),
            credential_keys: account.credential_keys.clone(),
            is_active: account.is_active,
            last_validated: account.last_validated,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPlatformAccount {
    pub platform: Platform,
    pub account_name: String,
    #[serde(default)]
    pub account_identifier: Option<String>,
    pub credentials: BTreeMap<String, String>,
}

impl NewPlatformAccount {
    /// Checks a manual entry. OAuth-created accounts skip this since their key set differs.
    pub fn validate_manual(&self) -> Result<(), String> {
        if self.account_name.trim().is_empty() {
            return Err("account_name is required".to_string());
        }

        let missing: Vec<&str> = self
            .platform
            .required_credential_keys()
            .iter()
            .copied()
            .filter(|key| {
                self.credentials
                    .get(*key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect();

        if !missing.is_empty() {
            return Err(format!(
                "Missing {} credentials: {}",
                self.platform.display_name(),
                missing.join(", ")
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("X".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::Linkedin);
        assert!("myspace".parse::<Platform>().is_err());

        let parsed: Platform = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(parsed, Platform::Twitter);
        assert_eq!(serde_json::to_string(&Platform::Telegram).unwrap(), "\"telegram\"");
    }

    #[test]
    fn test_manual_validation_lists_missing_keys() {
        let mut credentials = BTreeMap::new();
        credentials.insert("api_key".to_string(), "k".to_string());
        credentials.insert("access_token".to_string(), " ".to_string());

        let entry = NewPlatformAccount {
            platform: Platform::Twitter,
            account_name: "main".to_string(),
            account_identifier: None,
            credentials,
        };

        let err = entry.validate_manual().unwrap_err();
        assert!(err.contains("api_secret"));
        assert!(err.contains("access_token"));
        assert!(err.contains("access_secret"));
        assert!(!err.contains("api_key"));
    }
}
