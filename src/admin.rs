//! Admin panel: list, create, update and delete link records through the
//! Link API. Every successful mutation is followed by a fresh fetch; nothing
//! is updated optimistically.

use crate::{
    error::ClientError,
    models::{Link, LinkForm, LinkId},
    repository::{DeleteOutcome, LinkRepository},
};

/// AdminPanel
///
/// View state of the admin page: the fetched list, the form being filled in
/// (with the id of the record being edited, if any) and the last error.
#[derive(Debug, Clone, Default)]
pub struct AdminPanel {
    pub links: Vec<Link>,
    pub form: LinkForm,
    pub error: Option<String>,
}

impl AdminPanel {
    /// Fetches the current list. A failed fetch leaves the list empty and
    /// records the API error for display.
    pub async fn load(repo: &dyn LinkRepository) -> Self {
        match repo.list_links().await {
            Ok(links) => Self {
                links,
                ..Self::default()
            },
            Err(err) => {
                tracing::error!(error = %err, "admin: failed to load links");
                Self {
                    error: Some(err.user_message()),
                    ..Self::default()
                }
            }
        }
    }

    /// Fills the form from the record with `id`. Returns false, leaving the
    /// form untouched, when no such record was fetched.
    pub fn start_edit(&mut self, id: &LinkId) -> bool {
        match self.links.iter().find(|l| &l.id == id) {
            Some(link) => {
                self.form = LinkForm::from(link);
                true
            }
            None => false,
        }
    }

    pub fn reset_form(&mut self) {
        self.form = LinkForm::default();
    }

    pub const fn editing_id(&self) -> Option<&LinkId> {
        self.form.id.as_ref()
    }

    pub fn find(&self, id: &LinkId) -> Option<&Link> {
        self.links.iter().find(|l| &l.id == id)
    }

    /// Finds a record by the id as rendered into a page (`?editar=42`,
    /// hidden `id` inputs). Numeric and textual ids both match on their
    /// rendered form, so `"42"` finds `Text("42")` as well as `Number(42)`.
    pub fn find_raw(&self, raw: &str) -> Option<&Link> {
        let raw = raw.trim();
        self.links.iter().find(|l| l.id.to_string() == raw)
    }

    /// The id of the listed record rendered as `raw`, keeping the type the
    /// Link API produced. Unlisted ids fall back to [`LinkId::parse`].
    pub fn resolve_id(&self, raw: &str) -> LinkId {
        self.find_raw(raw)
            .map_or_else(|| LinkId::parse(raw), |link| link.id.clone())
    }
}

/// Rejects forms the Link API would reject anyway, without a round trip.
pub fn validate_form(form: &LinkForm) -> Result<(), String> {
    if form.titulo.trim().is_empty() {
        return Err("O título é obrigatório.".to_string());
    }
    if form.url.trim().is_empty() {
        return Err("A URL é obrigatória.".to_string());
    }
    Ok(())
}

/// SaveError
///
/// Why a save did not go through; either kind is shown to the user as-is.
#[derive(Debug)]
pub enum SaveError {
    Invalid(String),
    Api(ClientError),
}

impl SaveError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(msg) => msg.clone(),
            Self::Api(err) => format!("Erro ao salvar link: {}", err.user_message()),
        }
    }
}

/// Creates the record when the form has no id, updates it otherwise.
pub async fn save_link(repo: &dyn LinkRepository, form: LinkForm) -> Result<Link, SaveError> {
    validate_form(&form).map_err(SaveError::Invalid)?;

    let result = match form.id.clone() {
        Some(id) => {
            tracing::info!(%id, "admin: updating link");
            repo.update_link(&id, form).await
        }
        None => {
            tracing::info!(titulo = %form.titulo, "admin: creating link");
            repo.create_link(form).await
        }
    };

    result.map_err(|err| {
        tracing::warn!(error = %err, "admin: save rejected by the Link API");
        SaveError::Api(err)
    })
}

/// Deletes the record once the user has confirmed. Without confirmation the
/// API is not called and `Ok(None)` is returned.
pub async fn delete_link(
    repo: &dyn LinkRepository,
    id: &LinkId,
    confirmed: bool,
) -> Result<Option<DeleteOutcome>, ClientError> {
    if !confirmed {
        tracing::debug!(%id, "admin: delete not confirmed");
        return Ok(None);
    }

    let outcome = repo.delete_link(id).await?;
    tracing::info!(%id, ?outcome, "admin: link deleted");
    Ok(Some(outcome))
}
