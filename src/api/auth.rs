//! Bearer-token authentication for every enhanced endpoint.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use diesel::{ExpressionMethods, QueryDsl, OptionalExtension};
use diesel_async::RunQueryDsl;

use crate::{AppState, Conn, error::Error, schema::access_tokens::dsl, utils::get_auth_header};

/// Authenticated caller identity, inserted into request extensions by
/// [`layer`] and consumed by handlers through `Extension`.
#[derive(Clone)]
pub struct CurrentUser<T>(pub T);

/// Resolves a bearer token to a canonical user id.
pub async fn check_access_token(access_token: &str, conn: &mut Conn) -> Result<String, Error> {
    let row: Option<(String, i64)> = dsl::access_tokens
        .filter(dsl::token.eq(access_token))
        .select((dsl::user_id, dsl::created_at))
        .get_result(conn)
        .await
        .optional()?;

    let (user_id, created_at) =
        row.ok_or(Error::Unauthorized("Invalid access token".to_string()))?;

    let current_time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

    let lifetime = current_time - created_at;

    if lifetime > 3600 {
        return Err(Error::Unauthorized("Invalid access token".to_string()));
    }

    Ok(user_id)
}

pub async fn layer(
    State(app_state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = get_auth_header(req.headers())?;

    let mut conn = app_state.pool.get().await?;

    let user_id = check_access_token(token, &mut conn).await?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}
