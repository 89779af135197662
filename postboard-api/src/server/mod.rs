use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use postboard_common::model::{
    PostId,
    sort::{ParseSortDirectionError, ParseSortFieldError},
};
use postboard_store::store::PostStore;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub store: Arc<PostStore>,
}

pub fn routes() -> ServerRouter {
    routes::routes()
        .fallback(fallback)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn fallback(request: Request) -> ApiError {
    ApiError::UnknownRoute(request.into_parts().0.uri)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Method not allowed for this route")]
    MethodNotAllowed,
    #[error("Sort field rejected: {0}")]
    InvalidSortField(#[from] ParseSortFieldError),
    #[error("Sort direction rejected: {0}")]
    InvalidSortDirection(#[from] ParseSortDirectionError),
    #[error("Create body was missing title or content")]
    MissingPostFields,
    #[error("Update body contained no fields")]
    EmptyBody,
    #[error("Post with id {0} was not found")]
    PostNotFound(PostId),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownRoute(_)
            | ApiError::PathRejection(_)
            | ApiError::PostNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidSortField(_)
            | ApiError::InvalidSortDirection(_)
            | ApiError::MissingPostFields
            | ApiError::EmptyBody
            | ApiError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ApiError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message. Kept byte-for-byte compatible with the
    /// original service's responses; the `Display` impl above is the
    /// log-facing description.
    fn message(&self) -> String {
        match self {
            ApiError::UnknownRoute(_) | ApiError::PathRejection(_) | ApiError::PostNotFound(_) => {
                "Not Found".to_owned()
            }
            ApiError::MethodNotAllowed => "Method Not Allowed".to_owned(),
            ApiError::InvalidSortField(_) => {
                "Invalid sort parameter. Please use 'title' or 'content'.".to_owned()
            }
            ApiError::InvalidSortDirection(_) => {
                "Invalid direction parameter. Direction must be either 'asc' or 'desc'.".to_owned()
            }
            ApiError::MissingPostFields => "Title and content are required".to_owned(),
            ApiError::EmptyBody => "No data provided".to_owned(),
            ApiError::JsonRejection(rejection) => rejection.body_text(),
            ApiError::JsonResponse(_) => "Internal Server Error".to_owned(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            error: self.message(),
        };
        (status, Json(error_response)).into_response()
    }
}
