//! Maps every error this crate's handlers can produce to the `{error,
//! message, status}` envelope (§6.1), the way the teacher's `api::error`
//! maps its own giant error enum to a JSON body plus status code.

use crate::error::ErrorKind;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] crate::query::Error),
    #[error(transparent)]
    Scraper(#[from] crate::scraper::Error),
    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error(transparent)]
    JsonRejection(#[from] axum::extract::rejection::JsonRejection),
    #[error(transparent)]
    QueryRejection(#[from] axum::extract::rejection::QueryRejection),
    #[error(transparent)]
    PathRejection(#[from] axum::extract::rejection::PathRejection),
    #[error("unknown rover {0}")]
    UnknownRover(String),
    #[error("photo not found")]
    PhotoNotFound,
    #[error("unknown scraper {0}")]
    UnknownScraper(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Query(crate::query::Error::Query(err)) => query_status_code(err),
            Self::Query(crate::query::Error::UnknownRover(_)) => StatusCode::BAD_REQUEST,
            Self::Query(crate::query::Error::MissingDateSelector) => StatusCode::BAD_REQUEST,
            Self::Query(crate::query::Error::InvalidSort(_)) => StatusCode::BAD_REQUEST,
            Self::Query(crate::query::Error::InvalidPage) => StatusCode::BAD_REQUEST,
            Self::Query(crate::query::Error::CompareRangeTooLarge { .. }) => StatusCode::BAD_REQUEST,
            Self::Scraper(crate::scraper::Error::Query(err)) => query_status_code(err),
            Self::Scraper(_) => StatusCode::BAD_GATEWAY,
            Self::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::JsonRejection(err) => err.status(),
            Self::QueryRejection(err) => err.status(),
            Self::PathRejection(err) => err.status(),
            Self::UnknownRover(_) | Self::UnknownScraper(_) => StatusCode::BAD_REQUEST,
            Self::PhotoNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Query(err) => err.kind(),
            Self::Scraper(err) => err.kind(),
            Self::Pool(err) => err.kind(),
            Self::JsonRejection(_) => "JsonRejection",
            Self::QueryRejection(_) => "QueryRejection",
            Self::PathRejection(_) => "PathRejection",
            Self::UnknownRover(_) => "UnknownRover",
            Self::UnknownScraper(_) => "UnknownScraper",
            Self::PhotoNotFound => "PhotoNotFound",
        }
    }
}

fn query_status_code(err: &diesel::result::Error) -> StatusCode {
    match err {
        diesel::result::Error::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
