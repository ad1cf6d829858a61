use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Link management pages. `create_router` wraps this router in the login
/// guard, so none of these handlers run for an unauthenticated session.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin?editar=...
        .route("/admin", get(handlers::admin_page))
        // POST /admin/links
        // Create when the form has no id, update otherwise.
        .route("/admin/links", post(handlers::save_link))
        // GET /admin/excluir?id=... shows the confirmation page,
        // POST /admin/excluir performs the confirmed delete.
        .route(
            "/admin/excluir",
            get(handlers::confirm_delete).post(handlers::delete_link),
        )
}
