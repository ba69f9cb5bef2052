//! HTTP routes

pub mod notes;
pub mod questions;
pub mod reviews;
pub mod sessions;
pub mod stats;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the axum router with all API routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        // Question cards
        .route("/api/questions", post(questions::create_question))
        .route("/api/questions", get(questions::list_questions))
        .route("/api/questions", delete(questions::delete_question))
        // AI reviews (static segment before the capture)
        .route("/api/reviews", post(reviews::request_review))
        .route("/api/reviews/unfinished", get(reviews::unfinished_reviews))
        .route("/api/reviews/{id}", get(reviews::review_status))
        .route("/api/reviews/{id}/start", post(reviews::start_review))
        .route("/api/reviews/{id}/answers", post(reviews::submit_answers))
        // Interactive review sessions
        .route("/api/sessions", post(sessions::start_session))
        .route("/api/sessions/{id}", get(sessions::get_session))
        .route("/api/sessions/{id}", delete(sessions::end_session))
        .route("/api/sessions/{id}/reveal", post(sessions::reveal_answer))
        .route("/api/sessions/{id}/feedback", post(sessions::submit_feedback))
        // Dashboard stats
        .route("/api/stats", get(stats::get_stats))
        // Note registry (scope resolution collaborator)
        .route("/api/notes", post(notes::register_note))
        .route("/api/notes/{id}/archive", post(notes::archive_note))
        .route("/api/notes/{id}", delete(notes::delete_note))
        // Health
        .route("/api/health", get(health))
        .layer(ServiceBuilder::new().concurrency_limit(64).layer(cors))
        .with_state(state)
}

async fn health() -> axum::response::Json<serde_json::Value> {
    axum::response::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
