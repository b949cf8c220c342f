use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::{course, progress, simulation, state::ApiState, upload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(course::routes())
        .merge(simulation::routes())
        .merge(progress::routes())
        .merge(upload::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
