use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    config::AppConfig,
    error::ClientError,
    models::{ApiErrorBody, Link, LinkForm, LinkId},
};

/// DeleteOutcome
///
/// A delete either removed the record or found it already gone (404). Both
/// are successes from the admin's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyRemoved,
}

/// LinkRepository
///
/// Contract of the external Link API. Handlers only see this trait, so the
/// HTTP client can be swapped for [`MockLinkRepository`] in tests.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// `GET /api/links`
    async fn list_links(&self) -> Result<Vec<Link>, ClientError>;
    /// `POST /api/links`
    async fn create_link(&self, form: LinkForm) -> Result<Link, ClientError>;
    /// `PUT /api/links/{id}`
    async fn update_link(&self, id: &LinkId, form: LinkForm) -> Result<Link, ClientError>;
    /// `DELETE /api/links/{id}`
    async fn delete_link(&self, id: &LinkId) -> Result<DeleteOutcome, ClientError>;
}

/// RepositoryState
///
/// The concrete type used to share the Link API access across the application state.
pub type RepositoryState = Arc<dyn LinkRepository>;

/// HttpLinkRepository
///
/// reqwest-backed implementation talking to `{LINK_API_URL}/api/links`.
/// No application-level timeout or retry: calls rely on the client defaults.
#[derive(Clone, Debug)]
pub struct HttpLinkRepository {
    client: reqwest::Client,
    links_url: String,
}

impl HttpLinkRepository {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            client,
            links_url: config.links_url(),
        }
    }

    /// `{links_url}/{id}` with the id percent-encoded as one path segment.
    fn link_url(&self, id: &LinkId) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.links_url)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.links_url.clone()))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }
}

/// Turns a non-success response into [`ClientError::Status`], keeping the
/// server's `error` field when the body carries one.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|msg| !msg.trim().is_empty());

    Err(ClientError::Status { status, message })
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl LinkRepository for HttpLinkRepository {
    async fn list_links(&self) -> Result<Vec<Link>, ClientError> {
        let response = self.client.get(&self.links_url).send().await?;
        decode(ensure_success(response).await?).await
    }

    async fn create_link(&self, mut form: LinkForm) -> Result<Link, ClientError> {
        form.id = None;
        let response = self.client.post(&self.links_url).json(&form).send().await?;
        decode(ensure_success(response).await?).await
    }

    async fn update_link(&self, id: &LinkId, mut form: LinkForm) -> Result<Link, ClientError> {
        form.id = Some(id.clone());
        let response = self
            .client
            .put(self.link_url(id)?)
            .json(&form)
            .send()
            .await?;
        decode(ensure_success(response).await?).await
    }

    async fn delete_link(&self, id: &LinkId) -> Result<DeleteOutcome, ClientError> {
        let response = self.client.delete(self.link_url(id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(%id, "link already removed upstream");
            return Ok(DeleteOutcome::AlreadyRemoved);
        }
        ensure_success(response).await?;
        Ok(DeleteOutcome::Deleted)
    }
}

// --- Mock Implementation (For Tests) ---

#[derive(Debug, Default)]
struct MockStore {
    links: Vec<Link>,
    next_id: i64,
    list_calls: usize,
    delete_calls: usize,
}

/// MockLinkRepository
///
/// In-memory stand-in for the Link API. It keeps records between calls so
/// tests can observe the re-fetch after a mutation, and can be told to fail
/// reads or writes with a given status and message.
#[derive(Clone, Debug, Default)]
pub struct MockLinkRepository {
    store: Arc<Mutex<MockStore>>,
    /// When true, `list_links` fails with a 503.
    pub fail_reads: bool,
    /// When set, create/update/delete fail with this status and message.
    pub fail_writes: Option<(StatusCode, Option<String>)>,
}

impl MockLinkRepository {
    pub fn new(links: Vec<Link>) -> Self {
        let next_id = links
            .iter()
            .filter_map(|l| match l.id {
                LinkId::Number(n) => Some(n),
                LinkId::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            store: Arc::new(Mutex::new(MockStore {
                links,
                next_id,
                ..MockStore::default()
            })),
            fail_reads: false,
            fail_writes: None,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Makes every create/update/delete fail with `status` and `message`.
    pub fn with_write_error(mut self, status: StatusCode, message: Option<&str>) -> Self {
        self.fail_writes = Some((status, message.map(str::to_string)));
        self
    }

    pub fn snapshot(&self) -> Vec<Link> {
        self.lock().links.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_error(&self) -> Option<ClientError> {
        self.fail_writes
            .clone()
            .map(|(status, message)| ClientError::Status { status, message })
    }
}

fn link_from_form(id: LinkId, form: LinkForm) -> Link {
    Link {
        id,
        titulo: form.titulo,
        url: form.url,
        departamento: Some(form.departamento).filter(|d| !d.is_empty()),
        tipo_acesso: form.tipo_acesso,
    }
}

#[async_trait]
impl LinkRepository for MockLinkRepository {
    async fn list_links(&self) -> Result<Vec<Link>, ClientError> {
        let mut store = self.lock();
        store.list_calls += 1;
        if self.fail_reads {
            return Err(ClientError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: None,
            });
        }
        Ok(store.links.clone())
    }

    async fn create_link(&self, form: LinkForm) -> Result<Link, ClientError> {
        if let Some(err) = self.write_error() {
            return Err(err);
        }
        let mut store = self.lock();
        let id = LinkId::Number(store.next_id);
        store.next_id += 1;
        let link = link_from_form(id, form);
        store.links.push(link.clone());
        Ok(link)
    }

    async fn update_link(&self, id: &LinkId, form: LinkForm) -> Result<Link, ClientError> {
        if let Some(err) = self.write_error() {
            return Err(err);
        }
        let mut store = self.lock();
        let slot = store
            .links
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or(ClientError::Status {
                status: StatusCode::NOT_FOUND,
                message: Some("Link não encontrado.".to_string()),
            })?;
        *slot = link_from_form(id.clone(), form);
        Ok(slot.clone())
    }

    async fn delete_link(&self, id: &LinkId) -> Result<DeleteOutcome, ClientError> {
        if let Some(err) = self.write_error() {
            return Err(err);
        }
        let mut store = self.lock();
        store.delete_calls += 1;
        let before = store.links.len();
        store.links.retain(|l| &l.id != id);
        if store.links.len() == before {
            Ok(DeleteOutcome::AlreadyRemoved)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
