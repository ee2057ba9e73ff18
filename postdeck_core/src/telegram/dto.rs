use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelegramChannel {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// `@channel` handle or numeric chat id.
    pub username: String,
    pub member_count: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewChannel {
    pub name: String,
    pub username: String,
}

impl NewChannel {
    pub fn normalized_username(&self) -> Result<String, String> {
        let trimmed = self.username.trim();
        if trimmed.is_empty() {
            return Err("Channel username is required".to_string());
        }
        if trimmed.parse::<i64>().is_ok() || trimmed.starts_with('@') {
            return Ok(trimmed.to_string());
        }
        Ok(format!("@{}", trimmed))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub message: String,
    pub channel_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub channel_id: String,
    pub username: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BroadcastSummary {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BroadcastReport {
    pub results: Vec<ChannelResult>,
    pub summary: BroadcastSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(username: &str) -> NewChannel {
        NewChannel {
            name: "News".to_string(),
            username: username.to_string(),
        }
    }

    #[test]
    fn test_normalized_username() {
        assert_eq!(channel("news").normalized_username().unwrap(), "@news");
        assert_eq!(channel(" @news ").normalized_username().unwrap(), "@news");
        assert_eq!(
            channel("-1001234567890").normalized_username().unwrap(),
            "-1001234567890"
        );
        assert!(channel("  ").normalized_username().is_err());
    }
}
