use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use postdeck_core::{
    helpers::dto::UserPayload,
    posts::dto::{NewPost, Post, PostFilter, PostUpdate},
};

use crate::{error::ErrorServer, posts::dto::PostQuery, state::ServerState};

#[utoipa::path(
    get,
    path = "/posts",
    params(PostQuery),
    description = "Posts of the current user ordered by date",
    responses((status = 200, description = "Success", body = [Post]))
)]
pub async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<Post>>, ErrorServer> {
    let filter = PostFilter::from(query);
    Ok(Json(state.posts().list(&user.user_id, &filter)?))
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = NewPost,
    description = "Compose a draft or scheduled post",
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Bad Request"),
    )
)]
pub async fn create_post(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Json(new_post): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ErrorServer> {
    let post = state.posts().create(&user.user_id, new_post)?;
    log::info!("User {} created {} post {}", user.user_id, post.status, post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    patch,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = PostUpdate,
    description = "Edit, reschedule or change the status of a post",
    responses(
        (status = 200, description = "Success", body = Post),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn update_post(
    State(state): State<Arc<ServerState>>,
    Extension(user): Extension<UserPayload>,
    Path(id): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Post>, ErrorServer> {
    Ok(Json(state.posts().update(&user.user_id, &id, update)?))
}
