use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Extension, Json,
    extract::{Query, State},
    response::Redirect,
};
use postdeck_core::{
    accounts::dto::{NewPlatformAccount, Platform},
    helpers::dto::UserPayload,
    oauth_config::dto::{OAuth2Platform, default_platforms},
    twitter::dto::OAuthPurpose,
};

use crate::{
    auth::{
        dto::OAuthCallbackQuery,
        handler::{finish_twitter_oauth, start_twitter_oauth},
    },
    error::ErrorServer,
    oauth::dto::AuthorizationUrl,
    state::ServerState,
};

#[utoipa::path(
    get,
    path = "/oauth/config",
    description = "OAuth2 capabilities per platform",
    responses((status = 200, description = "Success", body = [OAuth2Platform]))
)]
pub async fn oauth_config(State(state): State<Arc<ServerState>>) -> Json<Vec<OAuth2Platform>> {
    Json(default_platforms(state.config().twitter_oauth.is_some()))
}

#[utoipa::path(
    get,
    path = "/oauth/twitter/authorize",
    description = "Start connecting an X account to the current user",
    responses(
        (status = 200, description = "Success", body = AuthorizationUrl),
        (status = 503, description = "X OAuth not configured"),
    )
)]
pub async fn twitter_authorize(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
) -> Result<Json<AuthorizationUrl>, ErrorServer> {
    let authorization_url = start_twitter_oauth(&state, OAuthPurpose::Connect, Some(user.user_id))?;
    Ok(Json(AuthorizationUrl { authorization_url }))
}

#[utoipa::path(
    get,
    path = "/oauth/twitter/callback",
    params(OAuthCallbackQuery),
    description = "X connect callback; redirects to the accounts page",
    responses((status = 303, description = "Redirect to the dashboard"))
)]
pub async fn twitter_callback(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let frontend = &state.config().frontend_url;
    match connect_twitter_account(&state, query).await {
        Ok(handle) => Redirect::to(&format!(
            "{}/accounts?oauth_success=twitter&account={}",
            frontend,
            urlencoding::encode(&handle)
        )),
        Err(e) => {
            log::error!("X account connection failed: {}", e);
            Redirect::to(&format!(
                "{}/accounts?oauth_error={}",
                frontend,
                urlencoding::encode(&e.to_string())
            ))
        }
    }
}

async fn connect_twitter_account(state: &ServerState, query: OAuthCallbackQuery) -> Result<String> {
    let (oauth_state, token) = finish_twitter_oauth(state, query, OAuthPurpose::Connect).await?;
    let user_id = oauth_state
        .user_id
        .context("OAuth state is not bound to a user")?;
    let profile = state.twitter().me_with_bearer(&token.access_token).await?;

    let mut credentials = BTreeMap::new();
    credentials.insert("access_token".to_string(), token.access_token);
    if let Some(refresh_token) = token.refresh_token {
        credentials.insert("refresh_token".to_string(), refresh_token);
    }

    let handle = format!("@{}", profile.username);
    let account = state.accounts().upsert_oauth_account(
        &user_id,
        NewPlatformAccount {
            platform: Platform::Twitter,
            account_name: handle.clone(),
            account_identifier: Some(profile.id),
            credentials,
        },
    )?;
    log::info!("Connected X account {} to user {}", handle, account.user_id);

    Ok(handle)
}
