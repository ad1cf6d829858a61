use cernn_links::{
    AppState,
    auth::{AuthenticatorState, HttpAuthenticator},
    classifier::{ClockState, HttpProbe, ProbeState, TokioClock},
    config::{AppConfig, Env},
    create_router,
    repository::{HttpLinkRepository, RepositoryState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, wires the upstream clients into the
/// application state and serves HTTP.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cernn_links=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    tracing::info!(
        api = %config.api_base_url,
        probe = %config.probe_url,
        probe_timeout_ms = config.probe_timeout.as_millis(),
        "upstream configuration"
    );

    // 3. Upstream clients share one connection pool.
    let client = reqwest::Client::new();

    let repo = Arc::new(HttpLinkRepository::new(client.clone(), &config)) as RepositoryState;
    let auth = Arc::new(HttpAuthenticator::new(client.clone(), &config)) as AuthenticatorState;
    let probe = Arc::new(HttpProbe::new(client, config.probe_url.clone())) as ProbeState;
    let clock = Arc::new(TokioClock) as ClockState;

    let bind_addr = config.bind_addr.clone();

    // 4. Unified State Assembly
    let app_state = AppState {
        repo,
        auth,
        probe,
        clock,
        config,
    };

    let app = create_router(app_state);

    // 5. Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
