use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use postdeck_core::{
    accounts::dto::{NewPlatformAccount, PlatformAccountView},
    helpers::dto::UserPayload,
};

use crate::{error::ErrorServer, platform_accounts::dto::CredentialTestResult, state::ServerState};

#[utoipa::path(
    get,
    path = "/platform-accounts",
    description = "Accounts connected by the current user",
    responses((status = 200, description = "Success", body = [PlatformAccountView]))
)]
pub async fn list_accounts(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
) -> Result<Json<Vec<PlatformAccountView>>, ErrorServer> {
    let accounts = state.accounts().list_for_user(&user.user_id)?;
    Ok(Json(accounts.iter().map(PlatformAccountView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/platform-accounts",
    request_body = NewPlatformAccount,
    description = "Store manually entered credentials",
    responses(
        (status = 201, description = "Created", body = PlatformAccountView),
        (status = 400, description = "Missing credentials"),
    )
)]
pub async fn create_account(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Json(entry): Json<NewPlatformAccount>,
) -> Result<(StatusCode, Json<PlatformAccountView>), ErrorServer> {
    entry.validate_manual().map_err(ErrorServer::bad_request)?;
    let account = state.accounts().create(&user.user_id, entry)?;
    Ok((StatusCode::CREATED, Json(PlatformAccountView::from(&account))))
}

#[utoipa::path(
    delete,
    path = "/platform-accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    description = "Remove a connected account",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn delete_account(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorServer> {
    state.accounts().delete(&user.user_id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/platform-accounts/{id}/test",
    params(("id" = String, Path, description = "Account id")),
    description = "Call the platform with the stored credentials",
    responses(
        (status = 200, description = "Test ran; see `success`", body = CredentialTestResult),
        (status = 404, description = "Not found"),
    )
)]
pub async fn test_account(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Path(id): Path<String>,
) -> Result<Json<CredentialTestResult>, ErrorServer> {
    let account = state.accounts().get_owned(&user.user_id, &id)?;
    let credentials = state.accounts().credentials(&account)?;

    let result = match state.tester().test(account.platform, &credentials).await {
        Ok(identity) => {
            let updated = state.accounts().mark_validated(&account.id, Utc::now())?;
            CredentialTestResult {
                success: true,
                identity: Some(identity),
                error: None,
                last_validated: updated.last_validated,
            }
        }
        Err(e) => {
            log::warn!("Credential test failed for account {}: {}", account.id, e);
            CredentialTestResult {
                success: false,
                identity: None,
                error: Some(e.to_string()),
                last_validated: account.last_validated,
            }
        }
    };

    Ok(Json(result))
}
