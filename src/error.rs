use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Everything the link service can fail with.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Short code must be {min_len}-{max_len} alphanumeric characters")]
    InvalidCode { min_len: usize, max_len: usize },

    #[error("Custom code \"{0}\" is already taken. Please choose a different code.")]
    CodeTaken(String),

    #[error("Unable to generate unique code")]
    GenerationExhausted,

    #[error("Link not found")]
    NotFound,

    #[error("Owner ID is required")]
    MissingOwner,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LinkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(code) => LinkError::CodeTaken(code),
            other => LinkError::Store(other),
        }
    }
}

impl LinkError {
    pub fn status(&self) -> StatusCode {
        match self {
            LinkError::InvalidUrl | LinkError::InvalidCode { .. } | LinkError::MissingOwner => {
                StatusCode::BAD_REQUEST
            }
            LinkError::CodeTaken(_) => StatusCode::CONFLICT,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::GenerationExhausted | LinkError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            LinkError::Store(e) => {
                tracing::error!("Store failure: {:?}", e);
                "Server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
