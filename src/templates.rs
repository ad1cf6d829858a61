//! Askama page templates and the view structs that feed them.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    admin::AdminPanel,
    directory::DirectoryView,
    models::{AccessLevel, DepartmentGroup, Link},
};

/// Body of the 500 returned when a page fails to render. The cause is only
/// logged.
pub const RENDER_FAILED: &str = "Erro interno ao gerar a página.";

/// Renders an askama template as an HTML response.
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Template rendering error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, RENDER_FAILED).into_response()
            }
        }
    }
}

/// `"1 link"` / `"3 links"`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn available_label(count: usize) -> String {
    if count == 1 {
        "1 link disponível".to_string()
    } else {
        format!("{count} links disponíveis")
    }
}

// ============================================
// Directory
// ============================================

pub struct GroupCard {
    pub name: String,
    pub public_label: String,
    pub internal_label: Option<String>,
    pub total_label: String,
}

impl From<&DepartmentGroup> for GroupCard {
    fn from(group: &DepartmentGroup) -> Self {
        let internal = group.internal_count();
        Self {
            name: group.name.clone(),
            public_label: plural(group.public_count(), "público", "públicos"),
            internal_label: (internal > 0).then(|| plural(internal, "interno", "internos")),
            total_label: available_label(group.links.len()),
        }
    }
}

pub struct LinkItem {
    pub titulo: String,
    pub url: String,
    pub internal: bool,
    pub access_label: &'static str,
}

impl From<&Link> for LinkItem {
    fn from(link: &Link) -> Self {
        Self {
            titulo: link.titulo.clone(),
            url: link.url.clone(),
            internal: link.tipo_acesso.is_internal(),
            access_label: link.tipo_acesso.label(),
        }
    }
}

pub struct Overlay {
    pub title: String,
    pub count_label: String,
    pub links: Vec<LinkItem>,
}

#[derive(Template)]
#[template(path = "directory.html")]
pub struct DirectoryTemplate {
    pub internal: bool,
    pub groups: Vec<GroupCard>,
    pub overlay: Option<Overlay>,
    pub empty: bool,
}

impl From<&DirectoryView> for DirectoryTemplate {
    fn from(view: &DirectoryView) -> Self {
        Self {
            internal: view.network.internal,
            groups: view.groups.iter().map(GroupCard::from).collect(),
            overlay: view.selected_group().map(|group| Overlay {
                title: group.name.clone(),
                count_label: available_label(group.links.len()),
                links: group.links.iter().map(LinkItem::from).collect(),
            }),
            empty: view.is_empty(),
        }
    }
}

// ============================================
// Login
// ============================================

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

// ============================================
// Admin
// ============================================

pub struct AdminRow {
    pub id: String,
    pub titulo: String,
    pub departamento: String,
    pub internal: bool,
    pub access_label: &'static str,
}

pub struct FormView {
    pub id: String,
    pub titulo: String,
    pub url: String,
    pub departamento: String,
    pub internal: bool,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub editing: bool,
    pub form: FormView,
    pub rows: Vec<AdminRow>,
    pub error: Option<String>,
}

impl From<&AdminPanel> for AdminTemplate {
    fn from(panel: &AdminPanel) -> Self {
        let form = &panel.form;
        Self {
            editing: form.is_editing(),
            form: FormView {
                id: form.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                titulo: form.titulo.clone(),
                url: form.url.clone(),
                departamento: form.departamento.clone(),
                internal: form.tipo_acesso == AccessLevel::Internal,
            },
            rows: panel
                .links
                .iter()
                .map(|link| AdminRow {
                    id: link.id.to_string(),
                    titulo: link.titulo.clone(),
                    departamento: link.departamento.clone().unwrap_or_default(),
                    internal: link.tipo_acesso.is_internal(),
                    access_label: link.tipo_acesso.label(),
                })
                .collect(),
            error: panel.error.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub id: String,
    pub titulo: String,
}
