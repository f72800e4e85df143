use crate::{codegen, error::LinkError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// 1. Refuse router-owned segments (`api`, `code`, `healthz`, dotted names)
///    without touching the store.
/// 2. Count the click and fetch the target in one store call.
/// 3. Return a 302 redirect to the original URL.
pub async fn redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    if codegen::is_reserved(&code) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match state.service.resolve_and_track(&code).await {
        Ok(original_url) => {
            (StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response()
        }
        Err(LinkError::NotFound) => (StatusCode::NOT_FOUND, "Link not found").into_response(),
        Err(e) => {
            tracing::error!("Redirect failed for short code '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
