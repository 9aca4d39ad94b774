//! `/_synapse/client/enhanced` Friends and private chat API.

use std::sync::Arc;

use axum::{Router, middleware};

use crate::AppState;

pub mod auth;
mod friends;
mod private_chat;

pub fn router(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/friends", friends::router())
        .nest("/private", private_chat::legacy_router())
        .nest("/private_chat/v2", private_chat::v2_router())
        .route_layer(middleware::from_fn_with_state(app_state, auth::layer))
}
