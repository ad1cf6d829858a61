use crate::{
    AppState,
    admin::{self, AdminPanel},
    auth::SessionGate,
    classifier::NetworkClassifier,
    directory::{self, DirectoryView},
    models::{DirectoryResponse, LinkForm, LinkId, LoginRequest},
    templates::{AdminTemplate, ConfirmDeleteTemplate, DirectoryTemplate, HtmlTemplate, LoginTemplate},
};
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// Message shown for any failed login, whatever the cause.
pub const WRONG_PASSWORD: &str = "Senha incorreta.";

// --- Query / Form Structs ---

/// DirectoryQuery
///
/// `?grupo=<department>` opens the detail overlay of that group.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DirectoryQuery {
    /// Department whose links are listed in the overlay.
    pub grupo: Option<String>,
}

/// `?editar=<id>` pre-fills the admin form with that record.
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub editar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: String,
}

/// DeleteForm
///
/// Posted by the confirmation page. The delete only happens when
/// `confirmar=sim` is present.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: String,
    pub confirmar: Option<String>,
}

// --- Directory ---

/// Runs one network classification and one link fetch concurrently, the way
/// a single page load does.
async fn build_directory(state: &AppState) -> DirectoryView {
    let classifier = NetworkClassifier::new(
        state.probe.clone(),
        state.clock.clone(),
        state.config.probe_timeout,
    );

    let (network, (links, source)) = tokio::join!(
        classifier.classify(),
        directory::load_links(state.repo.as_ref())
    );

    DirectoryView::new(&links, source, network)
}

/// directory_page
///
/// [Public Route] The grouped link directory. Internal links are hidden
/// unless the network probe succeeded.
pub async fn directory_page(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> HtmlTemplate<DirectoryTemplate> {
    let mut view = build_directory(&state).await;
    if let Some(group) = query.grupo.as_deref() {
        if !view.open_group(group) {
            tracing::debug!(group, "requested group not visible, overlay stays closed");
        }
    }
    HtmlTemplate(DirectoryTemplate::from(&view))
}

/// get_directory
///
/// [Public Route] JSON rendition of the directory page, with the same
/// filtering rules.
#[utoipa::path(
    get,
    path = "/api/directory",
    responses((status = 200, description = "Visible links grouped by department", body = DirectoryResponse))
)]
pub async fn get_directory(State(state): State<AppState>) -> Json<DirectoryResponse> {
    Json(build_directory(&state).await.into_payload())
}

// --- Session ---

pub async fn login_page() -> HtmlTemplate<LoginTemplate> {
    HtmlTemplate(LoginTemplate { error: None })
}

/// login_submit
///
/// Verifies the password through the session gate and sends the user to the
/// admin panel on success.
pub async fn login_submit(gate: SessionGate, Form(payload): Form<LoginRequest>) -> Response {
    if gate.login(&payload.password).await {
        Redirect::to("/admin").into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            HtmlTemplate(LoginTemplate {
                error: Some(WRONG_PASSWORD.to_string()),
            }),
        )
            .into_response()
    }
}

/// Clears the session and shows the login page.
pub async fn logout(gate: SessionGate) -> HtmlTemplate<LoginTemplate> {
    gate.logout().await;
    HtmlTemplate(LoginTemplate { error: None })
}

// --- Admin ---

/// admin_page
///
/// [Admin Route] Lists every link, including internal ones. `?editar=<id>`
/// switches the form to editing mode for that record.
pub async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> HtmlTemplate<AdminTemplate> {
    let mut panel = AdminPanel::load(state.repo.as_ref()).await;
    if let Some(raw) = query.editar.as_deref() {
        let id = panel.resolve_id(raw);
        if !panel.start_edit(&id) {
            tracing::debug!(%id, "edit requested for unknown link");
        }
    }
    HtmlTemplate(AdminTemplate::from(&panel))
}

/// save_link
///
/// [Admin Route] Creates or updates a link. On success redirects to the
/// admin page, which fetches the list again. On failure the page is rendered
/// with the error and the submitted values.
pub async fn save_link(State(state): State<AppState>, Form(mut form): Form<LinkForm>) -> Response {
    // The hidden id is plain text; match it to the record so the update
    // carries the id in the form the Link API handed out.
    if let Some(raw) = form.id.as_ref().map(ToString::to_string) {
        let listed = AdminPanel::load(state.repo.as_ref()).await;
        form.id = Some(listed.resolve_id(&raw));
    }

    match admin::save_link(state.repo.as_ref(), form.clone()).await {
        Ok(_) => Redirect::to("/admin").into_response(),
        Err(err) => {
            let mut panel = AdminPanel::load(state.repo.as_ref()).await;
            panel.form = form;
            panel.error = Some(err.user_message());
            HtmlTemplate(AdminTemplate::from(&panel)).into_response()
        }
    }
}

/// confirm_delete
///
/// [Admin Route] Asks for confirmation before deleting. A record that is no
/// longer listed sends the user back to the panel.
pub async fn confirm_delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let panel = AdminPanel::load(state.repo.as_ref()).await;

    match panel.find_raw(&query.id) {
        Some(link) => HtmlTemplate(ConfirmDeleteTemplate {
            id: link.id.to_string(),
            titulo: link.titulo.clone(),
        })
        .into_response(),
        None => Redirect::to("/admin").into_response(),
    }
}

/// delete_link
///
/// [Admin Route] Deletes a confirmed record. A 404 from the Link API means
/// the record is already gone and is not reported as an error.
pub async fn delete_link(State(state): State<AppState>, Form(form): Form<DeleteForm>) -> Response {
    let confirmed = form.confirmar.as_deref() == Some("sim");
    let id = if confirmed {
        AdminPanel::load(state.repo.as_ref())
            .await
            .resolve_id(&form.id)
    } else {
        LinkId::parse(&form.id)
    };

    match admin::delete_link(state.repo.as_ref(), &id, confirmed).await {
        Ok(_) => Redirect::to("/admin").into_response(),
        Err(err) => {
            tracing::error!(%id, error = %err, "admin: delete failed");
            let mut panel = AdminPanel::load(state.repo.as_ref()).await;
            panel.error = Some(format!("Erro ao deletar link: {}", err.user_message()));
            HtmlTemplate(AdminTemplate::from(&panel)).into_response()
        }
    }
}
