use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use postdeck_core::{
    analytics::{AnalyticsReport, DEFAULT_DAYS, summarize},
    helpers::dto::UserPayload,
    posts::dto::PostFilter,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::ErrorServer, state::ServerState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    /// Length of the daily series, 30 by default.
    pub days: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/analytics",
    params(AnalyticsQuery),
    description = "Post counts by status and platform with a daily series",
    responses((status = 200, description = "Success", body = AnalyticsReport))
)]
pub async fn analytics(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, ErrorServer> {
    let posts = state.posts().list(&user.user_id, &PostFilter::default())?;
    let accounts = state.accounts().list_for_user(&user.user_id)?;
    let days = query.days.unwrap_or(DEFAULT_DAYS);
    Ok(Json(summarize(&posts, &accounts, Utc::now(), days)))
}
