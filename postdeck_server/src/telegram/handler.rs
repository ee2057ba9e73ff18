use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use postdeck_core::{
    helpers::dto::UserPayload,
    telegram::{
        broadcast::broadcast,
        dto::{BroadcastReport, BroadcastRequest, NewChannel, TelegramChannel},
    },
};

use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    get,
    path = "/telegram/channels",
    description = "Registered broadcast channels",
    responses((status = 200, description = "Success", body = [TelegramChannel]))
)]
pub async fn list_channels(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
) -> Result<Json<Vec<TelegramChannel>>, ErrorServer> {
    Ok(Json(state.channels().list_for_user(&user.user_id)?))
}

#[utoipa::path(
    post,
    path = "/telegram/channels",
    request_body = NewChannel,
    description = "Register a channel the bot is admin of",
    responses(
        (status = 201, description = "Created", body = TelegramChannel),
        (status = 409, description = "Already registered"),
    )
)]
pub async fn add_channel(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Json(entry): Json<NewChannel>,
) -> Result<(StatusCode, Json<TelegramChannel>), ErrorServer> {
    let member_count = match (state.telegram(), entry.normalized_username()) {
        (Some(sender), Ok(username)) => match sender.member_count(&username).await {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("Could not read member count of {}: {}", username, e);
                None
            }
        },
        _ => None,
    };

    let channel = state.channels().add(&user.user_id, entry, member_count)?;
    Ok((StatusCode::CREATED, Json(channel)))
}

#[utoipa::path(
    post,
    path = "/telegram/broadcast",
    request_body = BroadcastRequest,
    description = "Send a message to the selected channels",
    responses(
        (status = 200, description = "Per-channel results", body = BroadcastReport),
        (status = 400, description = "Bad Request"),
        (status = 503, description = "Bot token not configured"),
    )
)]
pub async fn broadcast_message(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastReport>, ErrorServer> {
    if request.message.trim().is_empty() {
        return Err(ErrorServer::bad_request("Message must not be empty"));
    }
    let sender = state.telegram().ok_or_else(|| {
        ErrorServer::new(StatusCode::SERVICE_UNAVAILABLE, "Telegram bot is not configured")
    })?;

    let channels = state.channels().select(&user.user_id, &request.channel_ids)?;
    if channels.is_empty() {
        return Err(ErrorServer::bad_request("No known channels selected"));
    }

    Ok(Json(broadcast(sender.as_ref(), &channels, &request.message).await))
}
