use crate::{error::LinkError, models::LinkSummary, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

// ── Request types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    original_url: String,
    short_code: Option<String>,
    #[serde(alias = "userId")]
    owner_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    #[serde(alias = "userId")]
    owner_id: Option<String>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /api/links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    match state
        .service
        .create_link(
            &req.original_url,
            req.short_code.as_deref(),
            req.owner_id.as_deref(),
        )
        .await
    {
        Ok(link) => (StatusCode::CREATED, Json(LinkSummary::from(link))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/links
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<LinkSummary>>, LinkError> {
    let links = state.service.list_links(query.owner_id.as_deref()).await?;
    Ok(Json(links.into_iter().map(LinkSummary::from).collect()))
}

/// GET /api/links/:code
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<LinkSummary>, LinkError> {
    let link = state
        .service
        .get_link(&code, query.owner_id.as_deref())
        .await?;
    Ok(Json(link.into()))
}

/// DELETE /api/links/:code
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<serde_json::Value>, LinkError> {
    state
        .service
        .delete_link(&code, query.owner_id.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Link deleted successfully" })))
}
