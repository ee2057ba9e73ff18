use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use postdeck_core::{
    helpers::dto::{TokenKind, TokenPair, UserPayload},
    twitter::{
        auth::{
            CONNECT_SCOPES, LOGIN_SCOPES, build_auth_url, current_timestamp, generate_nonce,
            generate_pkce_pair,
        },
        dto::{OAuthPurpose, OAuthState, TwitterTokenResponse},
    },
    users::dto::{Credentials, UserProfile},
};

use crate::{
    auth::dto::{OAuthCallbackQuery, RefreshRequest},
    error::ErrorServer,
    state::ServerState,
};

fn issue_tokens(state: &ServerState, user_id: &str, username: &str) -> Result<TokenPair, ErrorServer> {
    state
        .jwt()
        .generate_pair(user_id, username)
        .map_err(ErrorServer::internal)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = Credentials,
    description = "Create a dashboard user",
    responses(
        (status = 200, description = "Success", body = TokenPair),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Username taken"),
    )
)]
pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, ErrorServer> {
    let user = state
        .users()
        .register(&credentials.username, &credentials.password)?;
    log::info!("Registered user {}", user.username);
    Ok(Json(issue_tokens(&state, &user.id, &user.username)?))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credentials,
    description = "Password login",
    responses(
        (status = 200, description = "Success", body = TokenPair),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, ErrorServer> {
    let user = state
        .users()
        .authenticate(&credentials.username, &credentials.password)?
        .ok_or_else(|| ErrorServer::unauthorized("Invalid username or password"))?;

    Ok(Json(issue_tokens(&state, &user.id, &user.username)?))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    description = "Exchange a refresh token for a new token pair",
    responses(
        (status = 200, description = "Success", body = TokenPair),
        (status = 401, description = "Invalid refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ErrorServer> {
    let claims = state
        .jwt()
        .validate_token(&request.refresh_token)
        .map_err(|e| ErrorServer::unauthorized(e.to_string()))?;
    if claims.kind != TokenKind::Refresh {
        return Err(ErrorServer::unauthorized("Not a refresh token"));
    }

    let user = state
        .users()
        .get(&claims.sub)?
        .ok_or_else(|| ErrorServer::unauthorized("User no longer exists"))?;

    Ok(Json(issue_tokens(&state, &user.id, &user.username)?))
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    description = "Current user",
    responses(
        (status = 200, description = "Success", body = UserProfile),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn profile(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
) -> Result<Json<UserProfile>, ErrorServer> {
    let user = state
        .users()
        .get(&user.user_id)?
        .ok_or_else(|| ErrorServer::new(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(UserProfile::from(&user)))
}

/// Store a fresh PKCE state and return the X authorize URL for it.
pub fn start_twitter_oauth(
    state: &ServerState,
    purpose: OAuthPurpose,
    user_id: Option<String>,
) -> Result<String, ErrorServer> {
    let app = state.config().twitter_oauth.as_ref().ok_or_else(|| {
        ErrorServer::new(StatusCode::SERVICE_UNAVAILABLE, "X OAuth is not configured")
    })?;

    let (verifier, challenge) = generate_pkce_pair();
    let nonce = generate_nonce();
    let oauth_state = OAuthState {
        purpose,
        user_id,
        verifier,
        created_at: current_timestamp(),
    };
    state
        .oauth_states()
        .store(&nonce, &oauth_state)
        .map_err(ErrorServer::internal)?;

    let (redirect_uri, scopes) = match purpose {
        OAuthPurpose::Login => (state.config().login_redirect_uri(), LOGIN_SCOPES),
        OAuthPurpose::Connect => (state.config().connect_redirect_uri(), CONNECT_SCOPES),
    };

    Ok(build_auth_url(&app.client_id, &redirect_uri, scopes, &nonce, &challenge))
}

/// Validate the callback query, consume its state and exchange the code.
/// Returns the consumed state and the X access token response.
pub async fn finish_twitter_oauth(
    state: &ServerState,
    query: OAuthCallbackQuery,
    purpose: OAuthPurpose,
) -> Result<(OAuthState, TwitterTokenResponse)> {
    if let Some(error) = query.error {
        return Err(anyhow!(query.error_description.unwrap_or(error)));
    }
    let code = query.code.context("Missing authorization code")?;
    let nonce = query.state.context("Missing state")?;

    let oauth_state = state
        .oauth_states()
        .take(&nonce)?
        .context("Invalid or expired OAuth state")?;
    if oauth_state.purpose != purpose {
        return Err(anyhow!("OAuth state was issued for a different flow"));
    }

    let app = state
        .config()
        .twitter_oauth
        .as_ref()
        .context("X OAuth is not configured")?;
    let redirect_uri = match purpose {
        OAuthPurpose::Login => state.config().login_redirect_uri(),
        OAuthPurpose::Connect => state.config().connect_redirect_uri(),
    };

    let token = state
        .twitter()
        .exchange_code(
            &code,
            &oauth_state.verifier,
            &app.client_id,
            &app.client_secret,
            &redirect_uri,
        )
        .await?;

    Ok((oauth_state, token))
}

#[utoipa::path(
    get,
    path = "/auth/x/login",
    description = "Redirect to X for sign-in",
    responses(
        (status = 303, description = "Redirect to X"),
        (status = 503, description = "X OAuth not configured"),
    )
)]
pub async fn x_login(State(state): State<Arc<ServerState>>) -> Result<Redirect, ErrorServer> {
    let url = start_twitter_oauth(&state, OAuthPurpose::Login, None)?;
    Ok(Redirect::to(&url))
}

#[utoipa::path(
    get,
    path = "/auth/x/callback",
    params(OAuthCallbackQuery),
    description = "X sign-in callback; redirects to the dashboard with tokens or an error",
    responses((status = 303, description = "Redirect to the dashboard"))
)]
pub async fn x_callback(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let frontend = &state.config().frontend_url;
    match complete_x_login(&state, query).await {
        Ok(tokens) => Redirect::to(&format!(
            "{}/auth/callback?accessToken={}&refreshToken={}&username={}",
            frontend,
            urlencoding::encode(&tokens.access_token),
            urlencoding::encode(&tokens.refresh_token),
            urlencoding::encode(&tokens.username),
        )),
        Err(e) => {
            log::error!("X login failed: {}", e);
            Redirect::to(&format!(
                "{}/auth/callback?error={}",
                frontend,
                urlencoding::encode(&e.to_string())
            ))
        }
    }
}

async fn complete_x_login(state: &ServerState, query: OAuthCallbackQuery) -> Result<TokenPair> {
    let (_, token) = finish_twitter_oauth(state, query, OAuthPurpose::Login).await?;
    let profile = state.twitter().me_with_bearer(&token.access_token).await?;
    let user = state
        .users()
        .upsert_twitter_user(&profile.id, &profile.username)?;
    log::info!("User {} signed in with X as @{}", user.id, profile.username);

    Ok(state.jwt().generate_pair(&user.id, &user.username)?)
}
