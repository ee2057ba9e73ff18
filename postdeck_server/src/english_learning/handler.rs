use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use postdeck_core::english_learning::dto::{AskRequest, TOPICS, Topic, TutorAnswer};

use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    get,
    path = "/english-learning/topics",
    description = "Topics the tutor can focus on",
    responses((status = 200, description = "Success", body = [Topic]))
)]
pub async fn topics() -> Json<&'static [Topic]> {
    Json(TOPICS)
}

#[utoipa::path(
    post,
    path = "/english-learning/ask",
    request_body = AskRequest,
    description = "Ask the English tutor a question",
    responses(
        (status = 200, description = "Success", body = TutorAnswer),
        (status = 400, description = "Bad Request"),
        (status = 502, description = "Tutor service failed"),
        (status = 503, description = "Tutor not configured"),
    )
)]
pub async fn ask(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<TutorAnswer>, ErrorServer> {
    if request.question.trim().is_empty() {
        return Err(ErrorServer::bad_request("Question must not be empty"));
    }
    let tutor = state.tutor().ok_or_else(|| {
        ErrorServer::new(StatusCode::SERVICE_UNAVAILABLE, "English tutor is not configured")
    })?;

    let answer = tutor
        .ask(&request.question, request.topic.as_deref())
        .await
        .map_err(|e| ErrorServer::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(answer))
}
