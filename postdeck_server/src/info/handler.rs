use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{info::dto::Info, state::ServerState};

#[utoipa::path(
    get,
    path = "/",
    description = "Service information",
    responses((status = 200, description = "Success", body = Info))
)]
pub async fn info(State(state): State<Arc<ServerState>>) -> Json<Info> {
    Json(Info {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/redoc".to_string(),
        x_login_enabled: state.config().twitter_oauth.is_some(),
        broadcast_enabled: state.telegram().is_some(),
        english_learning_enabled: state.tutor().is_some(),
    })
}
