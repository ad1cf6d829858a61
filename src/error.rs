use reqwest::StatusCode;
use thiserror::Error;

/// ClientError
///
/// Failure of a call to one of the upstream APIs (Link API, Auth API).
/// Nothing in the web layer lets these escape: handlers turn them into
/// inline messages or the documented fallback data.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, TLS failure, client timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status. `message` carries the
    /// server's `error` field when the body had one.
    #[error("upstream returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// The API answered 2xx with a body we could not read.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured API base URL cannot carry a record path.
    #[error("invalid API url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Text shown to the admin user: the server's message verbatim when it
    /// sent one, the HTTP status otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Status { status, .. } => format!("Erro HTTP: {}", status.as_u16()),
            Self::Transport(_) => {
                "Falha ao conectar à API. Verifique se a API está rodando.".to_string()
            }
            Self::Decode(_) => "Resposta inválida da API.".to_string(),
            Self::InvalidUrl(_) => "URL da API inválida.".to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }
}
