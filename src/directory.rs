//! Public link directory: fetch, filter by access level, group by department.

use std::collections::BTreeMap;

use crate::{
    models::{
        AccessLevel, DepartmentGroup, DirectoryResponse, Link, LinkId, LinkSource, NetworkStatus,
    },
    repository::LinkRepository,
};

/// Records shown when the Link API cannot be reached, so the directory is
/// never empty during development or a demo.
pub fn fallback_links() -> Vec<Link> {
    let link = |id, titulo: &str, departamento: &str, tipo_acesso| Link {
        id: LinkId::Number(id),
        titulo: titulo.to_string(),
        url: "#".to_string(),
        departamento: Some(departamento.to_string()),
        tipo_acesso,
    };

    vec![
        link(1, "Sistema Interno", "TI", AccessLevel::Internal),
        link(2, "Portal Web", "TI", AccessLevel::Public),
        link(3, "Dashboard", "Gestão", AccessLevel::Internal),
        link(4, "Documentação", "TI", AccessLevel::Public),
    ]
}

/// Fetches the link list, falling back to [`fallback_links`] on any failure.
pub async fn load_links(repo: &dyn LinkRepository) -> (Vec<Link>, LinkSource) {
    match repo.list_links().await {
        Ok(links) => (links, LinkSource::Api),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load links, using fallback data");
            (fallback_links(), LinkSource::Fallback)
        }
    }
}

/// Public links are always visible; internal links only on the internal network.
pub fn is_visible(link: &Link, internal_network: bool) -> bool {
    internal_network || !link.tipo_acesso.is_internal()
}

pub fn visible_links(links: &[Link], internal_network: bool) -> Vec<Link> {
    links
        .iter()
        .filter(|link| is_visible(link, internal_network))
        .cloned()
        .collect()
}

/// Partitions `links` by department. Groups come out sorted by name and keep
/// the incoming order of their links.
pub fn group_by_department(links: Vec<Link>) -> Vec<DepartmentGroup> {
    let mut groups: BTreeMap<String, Vec<Link>> = BTreeMap::new();
    for link in links {
        groups
            .entry(link.department().to_string())
            .or_default()
            .push(link);
    }

    groups
        .into_iter()
        .map(|(name, links)| DepartmentGroup { name, links })
        .collect()
}

/// DirectoryView
///
/// State of the public directory page for one page load: the settled network
/// status, the grouped visible links, and which group (if any) has its detail
/// overlay open.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    pub network: NetworkStatus,
    pub source: LinkSource,
    pub groups: Vec<DepartmentGroup>,
    selected: Option<usize>,
}

impl DirectoryView {
    pub fn new(links: &[Link], source: LinkSource, network: NetworkStatus) -> Self {
        let groups = group_by_department(visible_links(links, network.internal));
        Self {
            network,
            source,
            groups,
            selected: None,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.groups.iter().map(|g| g.links.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Opens the overlay for `name`. Unknown names (including groups hidden by
    /// the access filter) leave the overlay closed and return false.
    pub fn open_group(&mut self, name: &str) -> bool {
        self.selected = self.groups.iter().position(|g| g.name == name);
        self.selected.is_some()
    }

    pub fn close_group(&mut self) {
        self.selected = None;
    }

    pub fn selected_group(&self) -> Option<&DepartmentGroup> {
        self.selected.and_then(|idx| self.groups.get(idx))
    }

    pub fn into_payload(self) -> DirectoryResponse {
        DirectoryResponse {
            network: self.network,
            source: self.source,
            groups: self.groups,
        }
    }
}
