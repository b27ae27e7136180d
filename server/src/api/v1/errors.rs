use crate::api::v1::messages::{Lang, Message};
use crate::api::v1::types::responses::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use routing::errors::QueryError;
use std::fmt;
use std::fmt::Display;
use upstream::UpstreamError;

#[derive(Debug)]
pub enum ApiError {
    /// The request itself is unusable. No upstream call has been made for it.
    BadRequest(Message),
    NotFound(Message),
    Unavailable(Message),
    /// Some upstream failed or something unexpected happened. Never carries details.
    Busy,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Busy => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> Message {
        match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) | ApiError::Unavailable(message) => *message,
            ApiError::Busy => Message::ServiceBusy,
        }
    }

    pub fn into_response_in(self, lang: Lang) -> Response {
        let body = ErrorResponse { error: self.message().text(lang) };
        (self.status(), Json(body)).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Upstream(err) => {
                warn!(target: "server", "Upstream failure: {}", err);
                ApiError::Busy
            }
            QueryError::NoDepartureFound => ApiError::NotFound(Message::NoSameDayDeparture),
            QueryError::NoWeekendOptions => ApiError::Unavailable(Message::NoWeekendOptions),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        QueryError::from(err).into()
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:?})", self.status(), self.message())
    }
}
