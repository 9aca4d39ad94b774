//! `/_synapse/client/enhanced/friends` Friend graph endpoints.
//!
//! Every operation exists under two spellings, the legacy path and the
//! explicit `/v2` path. Both are bound to the same handler, so the two
//! surfaces cannot drift apart.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    api::auth::CurrentUser,
    error::Error,
    events::FriendshipEvent,
    objects::{Friend, FriendCategory, FriendRequest},
    utils::{USER_ID_REGEX, now_millis},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // legacy surface
        .route("/list", get(list))
        .route("/request", post(send_request))
        .route("/request/accept", post(accept_request))
        .route("/request/reject", post(reject_request))
        .route("/remove", delete(remove))
        // legacy read-only aliases, all bound to the list handler
        .route("/categories", get(list))
        .route("/requests/pending", get(list))
        .route("/stats", get(list))
        .route("/search", get(list))
        // v2 spellings of the same handlers
        .route("/v2/list", get(list))
        .route("/v2/request", post(send_request))
        .route("/v2/request/accept", post(accept_request))
        .route("/v2/request/reject", post(reject_request))
        .route("/v2/remove", delete(remove))
}

#[derive(Serialize)]
struct FriendListResponse {
    friends: Vec<Friend>,
    categories: Vec<FriendCategory>,
    total: usize,
}

/// `GET /_synapse/client/enhanced/friends/list` Returns the caller's friend
/// links and categories.
///
/// requires auth: yes
///
/// ### Response Example
/// ```
/// json!({
///     "friends": [{
///         "user_id": "@alice:example.com",
///         "friend_id": "@bob:example.com",
///         "category_id": null,
///         "note": null,
///         "created_ts": 1767225600000
///     }],
///     "categories": [],
///     "total": 1
/// });
/// ```
pub async fn list(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
) -> Result<impl IntoResponse, Error> {
    let mut conn = app_state.pool.get().await?;

    let friends = Friend::fetch_all(&mut conn, &user_id).await?;

    let categories = FriendCategory::fetch_all(&mut conn, &user_id).await?;

    let total = friends.len();

    Ok((
        StatusCode::OK,
        Json(FriendListResponse {
            friends,
            categories,
            total,
        }),
    ))
}

#[derive(Deserialize)]
pub struct SendRequestBody {
    user_id: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct RequestSentResponse {
    request_id: i64,
    status: &'static str,
    message: &'static str,
}

/// `POST /_synapse/client/enhanced/friends/request` Sends a friend request.
///
/// requires auth: yes
///
/// ### Request Example
/// ```
/// json!({
///     "user_id": "@bob:example.com",
///     "message": "Hi, I'd like to add you"
/// });
/// ```
///
/// ### Responses
/// 200 Success
///
/// 400 Missing or invalid target, already friends, or request already sent
///
/// 401 Unauthorized
///
pub async fn send_request(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
    Json(body): Json<SendRequestBody>,
) -> Result<impl IntoResponse, Error> {
    let target = body
        .user_id
        .ok_or(Error::MissingParam("Missing target user_id".to_string()))?;

    if !USER_ID_REGEX.is_match(&target) {
        return Err(Error::BadRequest("Invalid target user_id".to_string()));
    }

    if target == user_id {
        return Err(Error::BadRequest(
            "Cannot send a friend request to yourself".to_string(),
        ));
    }

    let message = body.message.unwrap_or_default();

    let mut conn = app_state.pool.get().await?;

    let sender = user_id.as_str();
    let receiver = target.as_str();
    let request_message = message.as_str();

    let request = conn
        .transaction::<FriendRequest, Error, _>(|conn| {
            async move {
                if Friend::exists(conn, sender, receiver).await? {
                    return Err(Error::Forbidden("Users are already friends".to_string()));
                }

                if FriendRequest::pending_exists(conn, sender, receiver).await? {
                    return Err(Error::Forbidden("Friend request already sent".to_string()));
                }

                FriendRequest::create(conn, sender, receiver, request_message, now_millis()).await
            }
            .scope_boxed()
        })
        .await?;

    app_state.notifier.publish(FriendshipEvent::RequestSent {
        from_user_id: user_id,
        to_user_id: target,
        request_id: request.request_id,
        message,
    });

    Ok((
        StatusCode::OK,
        Json(RequestSentResponse {
            request_id: request.request_id,
            status: "pending",
            message: "Friend request sent",
        }),
    ))
}

#[derive(Deserialize)]
pub struct SettleRequestBody {
    request_id: Option<i64>,
}

#[derive(Serialize)]
struct RequestAcceptedResponse {
    status: &'static str,
    friend_id: String,
    message: &'static str,
}

/// `POST /_synapse/client/enhanced/friends/request/accept` Accepts a pending
/// friend request addressed to the caller.
///
/// requires auth: yes
///
/// ### Responses
/// 200 Success
///
/// 400 Missing request_id
///
/// 404 Request absent, already settled, or addressed to someone else
///
pub async fn accept_request(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
    Json(body): Json<SettleRequestBody>,
) -> Result<impl IntoResponse, Error> {
    let request_id = body
        .request_id
        .ok_or(Error::MissingParam("Missing request_id".to_string()))?;

    let mut conn = app_state.pool.get().await?;

    let request = FriendRequest::find_pending(&mut conn, request_id, &user_id).await?;

    request.accept(&mut conn, now_millis()).await?;

    app_state.notifier.publish(FriendshipEvent::RequestAccepted {
        user_id,
        friend_id: request.from_user_id.clone(),
    });

    Ok((
        StatusCode::OK,
        Json(RequestAcceptedResponse {
            status: "accepted",
            friend_id: request.from_user_id,
            message: "Friend request accepted",
        }),
    ))
}

#[derive(Serialize)]
struct RequestRejectedResponse {
    status: &'static str,
    message: &'static str,
}

/// `POST /_synapse/client/enhanced/friends/request/reject` Rejects a pending
/// friend request addressed to the caller. No friend links are created.
pub async fn reject_request(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
    Json(body): Json<SettleRequestBody>,
) -> Result<impl IntoResponse, Error> {
    let request_id = body
        .request_id
        .ok_or(Error::MissingParam("Missing request_id".to_string()))?;

    let mut conn = app_state.pool.get().await?;

    let request = FriendRequest::find_pending(&mut conn, request_id, &user_id).await?;

    request.reject(&mut conn).await?;

    app_state.notifier.publish(FriendshipEvent::RequestRejected {
        user_id,
        friend_id: request.from_user_id,
    });

    Ok((
        StatusCode::OK,
        Json(RequestRejectedResponse {
            status: "rejected",
            message: "Friend request rejected",
        }),
    ))
}

#[derive(Deserialize)]
pub struct RemoveFriendBody {
    user_id: Option<String>,
}

#[derive(Serialize)]
struct FriendRemovedResponse {
    status: &'static str,
    friend_id: String,
    message: &'static str,
}

/// `DELETE /_synapse/client/enhanced/friends/remove` Removes both directions
/// of a friendship. Removing a non-existent friendship is not an error.
pub async fn remove(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
    Json(body): Json<RemoveFriendBody>,
) -> Result<impl IntoResponse, Error> {
    let friend_id = body
        .user_id
        .ok_or(Error::MissingParam("Missing user_id".to_string()))?;

    let mut conn = app_state.pool.get().await?;

    Friend::remove_pair(&mut conn, &user_id, &friend_id).await?;

    app_state.notifier.publish(FriendshipEvent::FriendRemoved {
        user_id,
        friend_id: friend_id.clone(),
    });

    Ok((
        StatusCode::OK,
        Json(FriendRemovedResponse {
            status: "removed",
            friend_id,
            message: "Friend removed",
        }),
    ))
}
