use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use entity::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::store::StorageError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("Stored track is invalid: {0}")]
    Corrupt(ValidationError),

    #[error("Not Found")]
    NotFound,
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every failed response.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, detail: String) -> Response {
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error! {error = %self, "Request failed"};
        }
        ErrorBody::response(status, self.to_string())
    }
}
