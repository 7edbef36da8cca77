use std::convert::Infallible;

use bytes::Bytes;
use festival_coordination_config::ConfigError;
use festival_coordination_database::DatabaseError;
use headers::{ContentType, HeaderMapExt as _};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::fixtures::{FixtureError, UnknownBuilding};
use crate::gallery::GalleryError;
use crate::wizard::WizardError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("{0}")]
    Wizard(#[from] WizardError),
    #[error("{0}")]
    Gallery(#[from] GalleryError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("failed to encode response: {0}")]
    Encode(serde_json::Error),
    #[error("malformed query: {0}")]
    Query(#[from] serde_urlencoded::de::Error),
    #[error("failed to read request body: {0}")]
    Body(Box<dyn std::error::Error + Send + Sync>),
    #[error("http error: {0}")]
    Http(#[from] http::Error),
    #[error("webserver error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid id {0:?}")]
    InvalidId(String),
    #[error("could not save the {0}. Please try again.")]
    NotSaved(&'static str),
}

impl From<Infallible> for AppError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl From<UnknownBuilding> for AppError {
    fn from(value: UnknownBuilding) -> Self {
        Self::Wizard(value.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Wizard(_)
            | Self::MalformedPayload(_)
            | Self::Query(_)
            | Self::Body(_)
            | Self::InvalidId(_)
            | Self::Gallery(GalleryError::MissingFolder | GalleryError::InvalidFolder(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::Gallery(GalleryError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Config(_)
            | Self::Database(_)
            | Self::Fixture(_)
            | Self::Gallery(GalleryError::Io { .. })
            | Self::File(_)
            | Self::Encode(_)
            | Self::Http(_)
            | Self::Hyper(_)
            | Self::NotSaved(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A JSON `{"error": ...}` response. Server side failures are logged and
    /// answered with a generic message.
    #[must_use]
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        let message = match &self {
            Self::NotSaved(_) => self.to_string(),
            _ if status.is_server_error() => {
                error!("request failed: {self}");
                "Internal server error".to_owned()
            }
            _ => self.to_string(),
        };
        let body = serde_json::to_vec(&ErrorBody { error: message }).unwrap_or_default();
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response.headers_mut().typed_insert(ContentType::json());
        response
    }
}
