use std::{env, time::Duration};

/// Deadline applied to the network probe when `PROBE_TIMEOUT_MS` is unset.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup
/// and shared read-only with every handler through the application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the Link API (also serves `/api/login`).
    pub api_base_url: String,
    // Resource that only answers from inside the trusted network.
    pub probe_url: String,
    // Deadline for the network probe.
    pub probe_timeout: Duration,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Controls log format and cookie security.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context: pretty logs and plain cookies locally, JSON
/// logs and secure cookies in production.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests; nothing listens on these
    /// addresses.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            probe_url: "http://localhost:4000".to_string(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            bind_addr: "127.0.0.1:3000".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (after `.env` has
    /// been applied by the caller).
    ///
    /// # Panics
    /// Panics in production when `LINK_API_URL` is missing, and in any
    /// environment when `PROBE_TIMEOUT_MS` is not a whole number of
    /// milliseconds.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("LINK_API_URL").expect("FATAL: LINK_API_URL must be set in production.")
            }
            Env::Local => {
                env::var("LINK_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
            }
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        // Without an explicit target the probe hits the API host itself.
        let probe_url = env::var("PROBE_URL").unwrap_or_else(|_| api_base_url.clone());

        let probe_timeout_ms = env::var("PROBE_TIMEOUT_MS").map_or(DEFAULT_PROBE_TIMEOUT_MS, |raw| {
            raw.parse()
                .expect("FATAL: PROBE_TIMEOUT_MS must be a number of milliseconds.")
        });

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            api_base_url,
            probe_url,
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            bind_addr,
            env,
        }
    }

    /// `{api_base_url}/api/links`
    pub fn links_url(&self) -> String {
        format!("{}/api/links", self.api_base_url)
    }

    /// `{api_base_url}/api/login`
    pub fn login_url(&self) -> String {
        format!("{}/api/login", self.api_base_url)
    }

    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
