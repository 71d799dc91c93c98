//! Community posts and staff notifications.

use crate::{ApiResult, AppState, Caller};
use api_shared::{
    parse_id, parse_notification_status, CommentReq, CommentRes, ErrorRes, ListNotificationsRes,
    ListPostsRes, NotificationReq, NotificationRes, PostReq, PostRes, SearchQuery, StatusReq,
};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use hms_core::{queries, Capability, NonEmptyText, NotificationDraft, PostDraft, StoreError};

#[utoipa::path(
    get,
    path = "/posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Posts matching `q` on title or content", body = ListPostsRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_posts(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ListPostsRes>> {
    let store = state.store.lock().await;
    let posts = queries::search_posts(&store, query.text())
        .into_iter()
        .map(PostRes::from)
        .collect();
    Ok(Json(ListPostsRes { posts }))
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostReq,
    responses(
        (status = 201, description = "Post published", body = PostRes),
        (status = 403, description = "Role may not publish", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn publish_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<PostReq>,
) -> ApiResult<(StatusCode, Json<PostRes>)> {
    caller.require(Capability::Publish)?;
    let draft = PostDraft::try_from(req)?;
    let record = state.store.lock().await.publish_post(draft)?;
    Ok((StatusCode::CREATED, Json(PostRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post with its comments", body = PostRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PostRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(PostRes::from(store.post(&id)?)))
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = PostReq,
    responses(
        (status = 200, description = "Post text updated; likes and comments kept", body = PostRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<PostReq>,
) -> ApiResult<Json<PostRes>> {
    caller.require(Capability::Publish)?;
    let id = parse_id(&id)?;
    let draft = PostDraft::try_from(req)?;
    let record = state.store.lock().await.edit_post(&id, draft)?;
    Ok(Json(PostRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post removed", body = PostRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PostRes>> {
    caller.require(Capability::Publish)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_post(&id)?;
    Ok(Json(PostRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/like",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like counted", body = PostRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn like_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PostRes>> {
    caller.require(Capability::Engage)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.like_post(&id)?;
    Ok(Json(PostRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    params(("id" = String, Path, description = "Post id")),
    request_body = CommentReq,
    responses(
        (status = 201, description = "Comment added", body = CommentRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Comment on a post. The author's role is the caller's role.
#[axum::debug_handler]
pub async fn comment_on_post(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<CommentReq>,
) -> ApiResult<(StatusCode, Json<CommentRes>)> {
    caller.require(Capability::Engage)?;
    let id = parse_id(&id)?;
    let text = NonEmptyText::new(&req.text).map_err(StoreError::from)?;
    let author = req
        .author_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(caller.subject.as_str());
    let author = NonEmptyText::new(author).map_err(StoreError::from)?;
    let comment = state
        .store
        .lock()
        .await
        .comment_on_post(&id, author, caller.role, text)?;
    Ok((StatusCode::CREATED, Json(CommentRes::from(&comment))))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment removed", body = PostRes),
        (status = 400, description = "The post has no such comment", body = ErrorRes),
        (status = 404, description = "No such post", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath((id, comment_id)): AxumPath<(String, String)>,
) -> ApiResult<Json<PostRes>> {
    caller.require(Capability::Publish)?;
    let id = parse_id(&id)?;
    let comment_id = parse_id(&comment_id)?;
    let record = state.store.lock().await.delete_comment(&id, &comment_id)?;
    Ok(Json(PostRes::from(&record)))
}

#[utoipa::path(
    get,
    path = "/notifications",
    params(SearchQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = ListNotificationsRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ListNotificationsRes>> {
    let store = state.store.lock().await;
    let notifications = queries::search_notifications(&store, query.text())
        .into_iter()
        .map(NotificationRes::from)
        .collect();
    Ok(Json(ListNotificationsRes { notifications }))
}

#[utoipa::path(
    post,
    path = "/notifications",
    request_body = NotificationReq,
    responses(
        (status = 201, description = "Notification sent as pending", body = NotificationRes),
        (status = 403, description = "Role may not send notifications", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn send_notification(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<NotificationReq>,
) -> ApiResult<(StatusCode, Json<NotificationRes>)> {
    caller.require(Capability::Publish)?;
    let draft = NotificationDraft::try_from(req)?;
    let record = state.store.lock().await.send_notification(draft)?;
    Ok((StatusCode::CREATED, Json(NotificationRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/notifications/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "The notification", body = NotificationRes),
        (status = 404, description = "No such notification", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_notification(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<NotificationRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(NotificationRes::from(store.notification(&id)?)))
}

#[utoipa::path(
    put,
    path = "/notifications/{id}/status",
    params(("id" = String, Path, description = "Notification id")),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Notification approved or rejected", body = NotificationRes),
        (status = 400, description = "Unknown status", body = ErrorRes),
        (status = 403, description = "Role may not review notifications", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn set_notification_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<StatusReq>,
) -> ApiResult<Json<NotificationRes>> {
    caller.require(Capability::ReviewNotifications)?;
    let id = parse_id(&id)?;
    let status = parse_notification_status(&req)?;
    let record = state
        .store
        .lock()
        .await
        .set_notification_status(&id, status)?;
    Ok(Json(NotificationRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification removed", body = NotificationRes),
        (status = 404, description = "No such notification", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<NotificationRes>> {
    caller.require(Capability::ReviewNotifications)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_notification(&id)?;
    Ok(Json(NotificationRes::from(&record)))
}
