use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use crate::{config::AppConfig, error::ClientError, models::LoginRequest};

/// Session key holding the authenticated flag.
pub const SESSION_AUTH_KEY: &str = "authenticated";

/// Authenticator
///
/// Contract of the external Auth API. `Ok(false)` means the password was
/// rejected; `Err` means the API could not give an answer.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, password: &str) -> Result<bool, ClientError>;
}

/// AuthenticatorState
///
/// The concrete type used to share the Auth API access across the application state.
pub type AuthenticatorState = Arc<dyn Authenticator>;

/// HttpAuthenticator
///
/// Posts `{ "password": ... }` to `{LINK_API_URL}/api/login`. A success status
/// accepts the password, any 4xx rejects it, anything else is an error.
#[derive(Clone, Debug)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    login_url: String,
}

impl HttpAuthenticator {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            client,
            login_url: config.login_url(),
        }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn verify(&self, password: &str) -> Result<bool, ClientError> {
        let body = LoginRequest {
            password: password.to_string(),
        };
        let response = self.client.post(&self.login_url).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(true)
        } else if status.is_client_error() {
            Ok(false)
        } else {
            Err(ClientError::Status {
                status,
                message: None,
            })
        }
    }
}

/// MockAuthenticator
///
/// Accepts exactly one password. Used by router tests.
#[derive(Clone, Debug)]
pub struct MockAuthenticator {
    pub password: String,
}

impl MockAuthenticator {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn verify(&self, password: &str) -> Result<bool, ClientError> {
        Ok(password == self.password)
    }
}

/// SessionGate
///
/// The authentication boundary for one browser session. It is built per
/// request from the session cookie and the shared [`Authenticator`], so no
/// authentication state lives outside the session store.
///
/// The flag is kept in a cookie-backed session without expiry: it lasts until
/// the browser session ends, `logout` is called, or the process restarts.
#[derive(Clone)]
pub struct SessionGate {
    session: Session,
    authenticator: AuthenticatorState,
}

impl SessionGate {
    pub fn new(session: Session, authenticator: AuthenticatorState) -> Self {
        Self {
            session,
            authenticator,
        }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session
            .get::<bool>(SESSION_AUTH_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    /// Verifies `password` against the Auth API and marks the session as
    /// authenticated on success. API failures count as a wrong password.
    pub async fn login(&self, password: &str) -> bool {
        let accepted = match self.authenticator.verify(password).await {
            Ok(accepted) => accepted,
            Err(err) => {
                tracing::warn!(error = %err, "auth API unavailable, rejecting login");
                false
            }
        };

        if !accepted {
            tracing::info!("login rejected");
            return false;
        }

        // New id for the authenticated session so a pre-login cookie cannot
        // be reused.
        if let Err(err) = self.session.cycle_id().await {
            tracing::warn!(error = %err, "failed to cycle session id");
        }
        if let Err(err) = self.session.insert(SESSION_AUTH_KEY, true).await {
            tracing::error!(error = %err, "failed to store session flag");
            return false;
        }

        tracing::info!("login accepted");
        true
    }

    /// Clears the flag. No call to the Auth API.
    pub async fn logout(&self) {
        if let Err(err) = self.session.flush().await {
            tracing::warn!(error = %err, "error clearing session during logout");
        }
        tracing::info!("logged out");
    }
}

impl<S> FromRequestParts<S> for SessionGate
where
    S: Send + Sync,
    AuthenticatorState: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session, AuthenticatorState::from_ref(state)))
    }
}

/// RequireLogin
///
/// Extractor guarding the admin routes: resolves only for authenticated
/// sessions and redirects everyone else to `/login`.
#[derive(Clone)]
pub struct RequireLogin(pub SessionGate);

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
    AuthenticatorState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = SessionGate::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if gate.is_logged_in().await {
            Ok(Self(gate))
        } else {
            tracing::debug!(uri = %parts.uri, "unauthenticated admin access, redirecting");
            Err(Redirect::to("/login").into_response())
        }
    }
}
