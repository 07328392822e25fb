// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{attempt, question};
use crate::state::AppState;

/// Assembles the main application router.
///
/// * Merges the attempt (diagnostic) and admin (content) sub-routers.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let attempt_routes = Router::new()
        .route("/", post(attempt::start_attempt))
        .route("/{id}", get(attempt::get_attempt))
        .route("/{id}/next-question", post(attempt::next_question))
        .route("/{id}/answers", post(attempt::submit_answer))
        .route("/{id}/complete", post(attempt::complete_attempt));

    let admin_routes = Router::new()
        .route("/questions", post(question::create_question))
        .route(
            "/questions/{id}",
            put(question::update_question).delete(question::delete_question),
        );

    Router::new()
        .nest("/api/attempts", attempt_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
