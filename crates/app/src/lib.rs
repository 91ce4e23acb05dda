#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use services::{AuthService, LessonService};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub lessons: Arc<LessonService>,
}

impl AppState {
    #[must_use]
    pub fn new(auth: AuthService, lessons: LessonService) -> Self {
        Self {
            auth: Arc::new(auth),
            lessons: Arc::new(lessons),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// All routes of the HTTP API.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::root))
        // Accounts.
        .route("/register", post(routes::register))
        .route("/token", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/forgot-password", post(routes::forgot_password))
        .route("/reset-password", post(routes::reset_password))
        // Lessons.
        .route(
            "/upload",
            post(routes::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/summarize", post(routes::summarize))
        .route("/generate_quiz", post(routes::generate_quiz))
        .route("/generate_flashcards", post(routes::generate_flashcards))
        .route("/ask", post(routes::ask))
        // Exports.
        .route("/export_ppt", post(routes::export_ppt))
        .route("/export_pdf", post(routes::export_pdf))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
