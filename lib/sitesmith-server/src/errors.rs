use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use generator::GeneratorError;
use hosting::HostingError;
use serde::Serialize;
use sites::SiteError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub(crate) struct StatusBody {
    pub status: &'static str,
    pub message: String,
}

impl StatusBody {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Site(#[from] SiteError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    // only messages written for users leave the server, everything else is logged
    fn status_and_message(&self) -> (StatusCode, String) {
        let site = match self {
            ApiError::BadRequest(message) => return (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Site(e) => e,
        };

        match site {
            SiteError::EmptyInstruction
            | SiteError::Validation(_)
            | SiteError::Hosting(HostingError::Validation(_))
            | SiteError::Hosting(HostingError::NothingToDeploy(_)) => {
                (StatusCode::BAD_REQUEST, site.to_string())
            }
            SiteError::UnknownSite(_) => (StatusCode::NOT_FOUND, site.to_string()),
            SiteError::Hosting(HostingError::NameTaken(_)) => {
                (StatusCode::CONFLICT, site.to_string())
            }
            SiteError::Hosting(HostingError::PrimaryDomainNotSet { domain, .. }) => (
                StatusCode::BAD_GATEWAY,
                format!("{domain} was added but could not be made the primary domain. Please try again"),
            ),
            SiteError::Hosting(HostingError::Timeout)
            | SiteError::Generator(GeneratorError::Timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "an upstream service did not respond in time".to_string(),
            ),
            SiteError::Hosting(_) => (
                StatusCode::BAD_GATEWAY,
                "the hosting provider request failed".to_string(),
            ),
            SiteError::Generator(_) => (
                StatusCode::BAD_GATEWAY,
                "unable to generate the site content".to_string(),
            ),
            SiteError::Io(_)
            | SiteError::Scan(_)
            | SiteError::Store(_)
            | SiteError::Task(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(StatusBody::error(message))).into_response()
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;
