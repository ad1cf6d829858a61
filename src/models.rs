use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Group name used when a link carries no department.
pub const DEFAULT_DEPARTMENT: &str = "Outros";

/// Department pre-filled in the admin form for new links.
pub const DEFAULT_FORM_DEPARTMENT: &str = "Geral";

// --- Core Link Schemas (Mapped to the Link API) ---

/// LinkId
///
/// Identifier of a link record. The Link API is free to hand out numeric or
/// textual ids, so both are accepted and serialized back in the same form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LinkId {
    Number(i64),
    Text(String),
}

impl LinkId {
    /// Best-effort reading of an id from a query or form field when there is
    /// no fetched record to match it against. Digits become a numeric id.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Number)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// AccessLevel
///
/// Controls whether a link is shown to clients outside the trusted network.
/// Wire values follow the Link API (`publico` / `interno`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum AccessLevel {
    #[default]
    #[serde(rename = "publico")]
    Public,
    #[serde(rename = "interno")]
    Internal,
}

impl AccessLevel {
    /// Human readable label used by the templates.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Public => "Público",
            Self::Internal => "Interno",
        }
    }

    pub const fn is_internal(self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Link
///
/// One directory entry as returned by `GET /api/links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    #[schema(value_type = String, example = "1")]
    pub id: LinkId,
    pub titulo: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    pub tipo_acesso: AccessLevel,
}

impl Link {
    /// The group this link belongs to. Missing and blank departments both
    /// fall into [`DEFAULT_DEPARTMENT`].
    pub fn department(&self) -> &str {
        match self.departamento.as_deref().map(str::trim) {
            Some(dept) if !dept.is_empty() => dept,
            _ => DEFAULT_DEPARTMENT,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// LinkForm
///
/// Payload of the admin form. It is posted as `application/x-www-form-urlencoded`
/// by the browser and forwarded as JSON to the Link API for both create
/// (`POST /api/links`) and update (`PUT /api/links/{id}`).
///
/// The `id` field is only present while editing; an empty hidden input is
/// treated the same as a missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LinkForm {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub id: Option<LinkId>,
    pub titulo: String,
    pub url: String,
    #[serde(default)]
    pub departamento: String,
    #[serde(default)]
    pub tipo_acesso: AccessLevel,
}

impl Default for LinkForm {
    fn default() -> Self {
        Self {
            id: None,
            titulo: String::new(),
            url: String::new(),
            departamento: DEFAULT_FORM_DEPARTMENT.to_string(),
            tipo_acesso: AccessLevel::Public,
        }
    }
}

impl From<&Link> for LinkForm {
    fn from(link: &Link) -> Self {
        Self {
            id: Some(link.id.clone()),
            titulo: link.titulo.clone(),
            url: link.url.clone(),
            departamento: link.departamento.clone().unwrap_or_default(),
            tipo_acesso: link.tipo_acesso,
        }
    }
}

impl LinkForm {
    pub const fn is_editing(&self) -> bool {
        self.id.is_some()
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<LinkId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // Form posts always send strings; the handler resolves them against the
    // fetched list, so the value is kept exactly as sent.
    let raw: Option<LinkId> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(LinkId::Text(text)) if text.trim().is_empty() => None,
        other => other,
    })
}

/// LoginRequest
///
/// Body of `POST /api/login` on the Auth API, and of the login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// ApiErrorBody
///
/// Error envelope the Link API returns on validation failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<String>,
}

// --- Directory Schemas (Output) ---

/// NetworkStatus
///
/// Outcome of the network probe. `pending` stays true until the probe has
/// settled; once it flips to false `internal` never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NetworkStatus {
    pub internal: bool,
    pub pending: bool,
}

impl NetworkStatus {
    pub const PENDING: Self = Self {
        internal: false,
        pending: true,
    };

    pub const fn settled(internal: bool) -> Self {
        Self {
            internal,
            pending: false,
        }
    }
}

/// Where the directory data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    Api,
    Fallback,
}

/// DepartmentGroup
///
/// A department and the visible links filed under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentGroup {
    pub name: String,
    pub links: Vec<Link>,
}

impl DepartmentGroup {
    pub fn public_count(&self) -> usize {
        self.links
            .iter()
            .filter(|l| !l.tipo_acesso.is_internal())
            .count()
    }

    pub fn internal_count(&self) -> usize {
        self.links
            .iter()
            .filter(|l| l.tipo_acesso.is_internal())
            .count()
    }
}

/// DirectoryResponse
///
/// JSON rendition of the public directory (GET /api/directory).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DirectoryResponse {
    pub network: NetworkStatus,
    pub source: LinkSource,
    pub groups: Vec<DepartmentGroup>,
}
