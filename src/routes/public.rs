use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints reachable without a session: the directory (HTML and JSON), the
/// login and logout pages, and the health check.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /?grupo=...
        // The directory page; the optional group opens its detail overlay.
        .route("/", get(handlers::directory_page))
        // GET /api/directory
        .route("/api/directory", get(handlers::get_directory))
        // GET|POST /login
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        // GET|POST /logout
        // Clears the session locally and renders the login page.
        .route("/logout", get(handlers::logout).post(handlers::logout))
}
