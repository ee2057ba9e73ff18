use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use postdeck_core::helpers::dto::UserPayload;

use crate::{error::ErrorServer, state::ServerState};

pub async fn auth(
    State(state): State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ErrorServer> {
    let headers = req.headers();
    let token = headers.get("Authorization").and_then(|h| h.to_str().ok());

    if let Some(token) = token {
        let token = token.trim_start_matches("Bearer ").trim();
        let claims = state
            .jwt()
            .validate_access_token(token)
            .map_err(|e| ErrorServer::unauthorized(e.to_string()))?;

        let user = UserPayload {
            user_id: claims.sub,
            username: claims.username,
        };

        req.extensions_mut().insert(user);
    } else {
        return Err(ErrorServer::unauthorized("Unauthorized"));
    }

    Ok(next.run(req).await)
}
