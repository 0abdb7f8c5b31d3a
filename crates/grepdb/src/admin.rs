//! Admin change-page links for matching records.

use grepdb_db::ModelDef;
use std::collections::BTreeMap;
use thiserror::Error;

/// Host used when no `default` site is configured.
pub const FALLBACK_HOST: &str = "localhost:8000";
/// Site name consulted when links are requested without references.
pub const DEFAULT_SITE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("Reference {0} is not recognised as a hostname and no sites are configured")]
    NoSites(String),

    #[error("Reference {0} is not recognised as a hostname and was not found in sites")]
    UnknownSite(String),
}

/// Whether `reference` is used verbatim as a host.
pub fn is_hostname(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("localhost")
}

/// Turn a hostname or site name into a host.
pub fn resolve_host(reference: &str, sites: &BTreeMap<String, String>) -> Result<String, AdminError> {
    if is_hostname(reference) {
        return Ok(reference.to_string());
    }
    if let Some(host) = sites.get(reference) {
        return Ok(host.clone());
    }
    if reference == DEFAULT_SITE {
        return Ok(FALLBACK_HOST.to_string());
    }
    if sites.is_empty() {
        Err(AdminError::NoSites(reference.to_string()))
    } else {
        Err(AdminError::UnknownSite(reference.to_string()))
    }
}

/// Builds admin URLs for every configured host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLinks {
    hosts: Vec<String>,
    admin_path: String,
}

impl AdminLinks {
    /// Resolve `references` against `sites`. All references must resolve.
    pub fn resolve(
        references: &[String],
        sites: &BTreeMap<String, String>,
        admin_path: &str,
    ) -> Result<Self, AdminError> {
        let hosts = references
            .iter()
            .map(|reference| resolve_host(reference, sites))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            hosts,
            admin_path: normalize_admin_path(admin_path),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// One change-page URL per host, in reference order.
    pub fn links_for(&self, model: &ModelDef, pk: &str) -> Vec<String> {
        self.hosts
            .iter()
            .map(|host| {
                format!(
                    "{}{}{}/{}/{}/",
                    host.trim_end_matches('/'),
                    self.admin_path,
                    model.app_label,
                    model.name.to_lowercase(),
                    pk
                )
            })
            .collect()
    }
}

fn normalize_admin_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
