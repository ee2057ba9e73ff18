use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    analytics::handler::analytics,
    auth::handler::{login, profile, refresh, register, x_callback, x_login},
    docs::{dto::ApiDoc, handler::api_docs},
    english_learning::handler::{ask, topics},
    info::handler::info,
    media::handler::{UPLOADS_ROUTE, upload_image, upload_video},
    middlewares::handler::auth,
    oauth::handler::{oauth_config, twitter_authorize, twitter_callback},
    platform_accounts::handler::{create_account, delete_account, list_accounts, test_account},
    posts::handler::{create_post, list_posts, update_post},
    state::ServerState,
    telegram::handler::{add_channel, broadcast_message, list_channels},
};

const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router(state: Arc<ServerState>) -> Router {
    let doc = ApiDoc::openapi();
    let video_limit = (state.config().max_video_mb * 1024 * 1024) as usize + MULTIPART_OVERHEAD;
    let image_limit = (state.config().max_image_mb * 1024 * 1024) as usize + MULTIPART_OVERHEAD;

    let auth_router = Router::new()
        .route("/auth/profile", get(profile))
        .route("/oauth/twitter/authorize", get(twitter_authorize))
        .route("/platform-accounts", get(list_accounts).post(create_account))
        .route("/platform-accounts/{id}", delete(delete_account))
        .route("/platform-accounts/{id}/test", post(test_account))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", patch(update_post))
        .route("/analytics", get(analytics))
        .route(
            "/video/upload",
            post(upload_video).layer(DefaultBodyLimit::max(video_limit)),
        )
        .route(
            "/media/images",
            post(upload_image).layer(DefaultBodyLimit::max(image_limit)),
        )
        .route("/telegram/channels", get(list_channels).post(add_channel))
        .route("/telegram/broadcast", post(broadcast_message))
        .route("/english-learning/ask", post(ask))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .merge(Redoc::with_url("/redoc", doc))
        .merge(auth_router)
        .route("/", get(info))
        .route("/docs", get(api_docs))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/x/login", get(x_login))
        .route("/auth/x/callback", get(x_callback))
        .route("/oauth/config", get(oauth_config))
        .route("/oauth/twitter/callback", get(twitter_callback))
        .route("/english-learning/topics", get(topics))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config().upload_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
