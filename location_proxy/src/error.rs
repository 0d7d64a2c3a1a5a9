use hyper::StatusCode;
use location_kit::{client, config};
use serde_json::json;

use crate::routes::{JsonResponse, json_response};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Client(#[from] client::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Proxy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Reasons for a route not to give the result of the upstream call.
#[derive(thiserror::Error, Debug)]
pub(crate) enum RouteError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Could not read request body: {0}")]
    Body(Box<dyn std::error::Error + Send + Sync>),

    #[error("Request body is too large.")]
    TooLarge,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Upstream(client::Error),
}

impl From<client::Error> for RouteError {
    fn from(error: client::Error) -> Self {
        match error {
            error @ client::Error::EmptyQuery => Self::BadRequest(error.to_string()),
            other => Self::Upstream(other),
        }
    }
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::MalformedBody(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> JsonResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("{status}: {self}");
        }

        json_response(status, &json!({ "error": self.to_string() }))
    }
}
