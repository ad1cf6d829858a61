use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain and upstream clients.
pub mod admin;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod repository;

// HTTP surface.
pub mod handlers;
pub mod routes;
pub mod templates;

use auth::{AuthenticatorState, RequireLogin};
use classifier::{ClockState, ProbeState};
use routes::{admin as admin_router, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{HttpLinkRepository, MockLinkRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the JSON surface, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_directory),
    components(
        schemas(
            models::DirectoryResponse, models::DepartmentGroup, models::Link, models::LinkId,
            models::AccessLevel, models::NetworkStatus, models::LinkSource, models::LinkForm,
        )
    ),
    tags(
        (name = "cernn-links", description = "CERNN link directory")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a handler may need, cloned cheaply into each request. The only
/// mutable state of the application (the session store) lives in the session
/// layer, not here.
#[derive(Clone)]
pub struct AppState {
    /// Link API client.
    pub repo: RepositoryState,
    /// Auth API client used by the session gate.
    pub auth: AuthenticatorState,
    /// Network probe run once per directory page load.
    pub probe: ProbeState,
    /// Timer source for the probe deadline.
    pub clock: ClockState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthenticatorState {
    fn from_ref(app_state: &AppState) -> AuthenticatorState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Lets the request through only when `RequireLogin` resolves; otherwise the
/// extractor's rejection (a redirect to `/login`) is returned and the admin
/// handler never runs.
async fn auth_middleware(_login: RequireLogin, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session layer, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Session cookie without expiry: the login lasts for the browser session.
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies());

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            admin_router::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
        .layer(sessions);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, tagged with its `x-request-id` so every log line
/// of the request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
