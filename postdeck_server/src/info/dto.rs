use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Info {
    pub name: String,
    pub version: String,
    pub docs: String,
    pub x_login_enabled: bool,
    pub broadcast_enabled: bool,
    pub english_learning_enabled: bool,
}
