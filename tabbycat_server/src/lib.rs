use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::Request,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info_span;

use crate::config::read_config;
use crate::state::AppState;

pub mod action_log;
pub mod adjallocation;
pub mod auth;
pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod db;
pub mod images;
pub mod messages;
pub mod public;
pub mod response;
pub mod round;
pub mod state;
pub mod tournament;
pub mod urls;


pub async fn app() -> Result<Router, anyhow::Error> {
    let config = read_config();
    let state = AppState::new(&config).await?;
    Ok(app_with_state(state).await)
}

pub async fn app_with_state(state: AppState) -> Router {
    // Attachments arrive base64 encoded inside a JSON body
    let body_limit = state.max_upload_size / 3 * 4 + 64 * 1024;

    Router::new()
        .merge(public::router())
        .merge(adjallocation::router())
        .merge(round::router())
        .merge(tournament::router())
        .merge(action_log::router())
        .merge(images::router())
        .nest("/api", auth::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str);

                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        matched_path,
                    )
                })
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
