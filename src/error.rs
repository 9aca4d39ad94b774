use std::{io, time::SystemTimeError};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deadpool::managed::{BuildError, PoolError};
use diesel::{
    ConnectionError,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::pooled_connection::PoolError as DieselPoolError;
use log::error;
use serde::Serialize;
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::task::JoinError;
use toml::de::Error as TomlError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SqlError(#[from] DieselError),
    #[error(transparent)]
    PoolError(#[from] PoolError<DieselPoolError>),
    #[error(transparent)]
    BuildError(#[from] BuildError),
    #[error(transparent)]
    ConnectionError(#[from] ConnectionError),
    #[error(transparent)]
    JoinError(#[from] JoinError),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error(transparent)]
    TomlError(#[from] TomlError),
    #[error(transparent)]
    JsonError(#[from] JsonError),
    #[error(transparent)]
    SystemTimeError(#[from] SystemTimeError),
    #[error(transparent)]
    RandomError(#[from] getrandom::Error),
    #[error("{0}")]
    MigrationError(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    MissingParam(String),
    // State conflicts (already friends, request already sent). Surfaced as
    // 400 with an M_FORBIDDEN errcode, which is what clients expect.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::SqlError(DieselError::NotFound) => StatusCode::NOT_FOUND,
            Error::SqlError(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => StatusCode::BAD_REQUEST,
            Error::BadRequest(_) | Error::MissingParam(_) | Error::Forbidden(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn errcode(&self) -> &'static str {
        match self {
            Error::SqlError(DieselError::NotFound) | Error::NotFound(_) => "M_NOT_FOUND",
            Error::SqlError(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            ))
            | Error::Forbidden(_) => "M_FORBIDDEN",
            Error::MissingParam(_) => "M_MISSING_PARAM",
            Error::BadRequest(_) => "M_INVALID_PARAM",
            Error::Unauthorized(_) => "M_UNAUTHORIZED",
            _ => "M_UNKNOWN",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        error!("{}: {}", status, self);

        (status, Json(WebError::new(&self))).into_response()
    }
}

#[derive(Serialize)]
struct WebError {
    errcode: &'static str,
    error: String,
}

impl WebError {
    fn new(error: &Error) -> Self {
        Self {
            errcode: error.errcode(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_param_is_bad_request() {
        let err = Error::MissingParam("Missing target user_id".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.errcode(), "M_MISSING_PARAM");
    }

    #[test]
    fn conflicts_are_bad_request_with_forbidden_code() {
        let err = Error::Forbidden("Users are already friends".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.errcode(), "M_FORBIDDEN");
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        let err = Error::from(DieselError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.errcode(), "M_NOT_FOUND");

        let err = Error::NotFound("Session not found".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err = Error::Unauthorized("Invalid access token".to_string());
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.errcode(), "M_UNAUTHORIZED");
    }
}
