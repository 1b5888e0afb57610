use super::responses::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::Error;
use tracing::error;

pub const NAME_REQUIRED: &str = "name is required in json of body";

/// Handler failure rendered as a status code with an optional `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: Some(message.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => Self::bad_request(msg),
            Error::NotFoundRemote => Self {
                status: StatusCode::NOT_FOUND,
                message: Some(err.to_string()),
            },
            Error::NotDeleted(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: Some(err.to_string()),
            },
            Error::NotFoundLocal
            | Error::AlreadyExists(_)
            | Error::Upstream(_)
            | Error::Storage(_)
            | Error::Config(_) => {
                error!("{}", err);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: None,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => (self.status, Json(ErrorResponse::new(message))).into_response(),
            None => self.status.into_response(),
        }
    }
}
