//! Short links with click counting.
//!
//! [`service::LinkService`] owns the link lifecycle on top of a pluggable
//! [`store::LinkStore`]; [`router`] exposes it over HTTP.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod codegen;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;

pub use error::LinkError;
pub use models::{Link, LinkSummary};
pub use service::{LinkService, OwnerScoping};

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub service: LinkService,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/links",
            get(handlers::links::list_links).post(handlers::links::create_link),
        )
        .route(
            "/links/:code",
            get(handlers::links::get_link).delete(handlers::links::delete_link),
        );

    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .nest("/api", api_router)
        // Short-link redirect — must come LAST so /api/* takes priority
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
