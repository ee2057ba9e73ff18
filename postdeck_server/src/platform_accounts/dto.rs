use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTestResult {
    pub success: bool,
    pub identity: Option<String>,
    pub error: Option<String>,
    pub last_validated: Option<DateTime<Utc>>,
}
