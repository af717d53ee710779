//! Project definitions

use super::integration::Integration;
use super::organization::slugify;
use super::user::PRODUCTION_ENVIRONMENT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where a project's code comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProjectSource {
    /// GitHub repository, optionally rooted in a subdirectory
    Github {
        repository: String,
        #[serde(default)]
        path: Option<String>,
    },
    /// Locally managed code, connected by hand
    #[serde(other)]
    Local,
}

/// Project as declared in the topology document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Machine name; the slugified title when omitted
    #[serde(default)]
    pub name: String,

    /// Display title, used as the existence key
    pub title: String,

    /// Owning organization (label, name or slug)
    pub organization: String,

    #[serde(default)]
    pub source: Option<ProjectSource>,

    #[serde(default)]
    pub environments: Vec<String>,

    /// Domains keyed by environment name
    #[serde(default)]
    pub domains: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub team: Option<String>,

    /// Integrations attached to this project only
    #[serde(default)]
    pub integrations: Vec<Integration>,

    /// Local checkout directory, created by `--create-dirs`
    #[serde(default)]
    pub local_directory: Option<PathBuf>,
}

impl Project {
    /// Declared name, falling back to the slugified title
    pub fn slug(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            slugify(&self.title)
        } else {
            name.to_string()
        }
    }

    /// GitHub repository URL when the project is GitHub-sourced
    pub fn github_repository(&self) -> Option<&str> {
        match &self.source {
            Some(ProjectSource::Github { repository, .. }) => Some(repository),
            _ => None,
        }
    }

    /// Subdirectory of a GitHub source that needs manual configuration
    pub fn source_subdirectory(&self) -> Option<&str> {
        match &self.source {
            Some(ProjectSource::Github {
                path: Some(path), ..
            }) => Some(path),
            _ => None,
        }
    }

    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.iter().any(|env| env == environment)
    }

    /// Environment used for backups: production when declared, else the first one
    pub fn primary_environment(&self) -> Option<&str> {
        if self.has_environment(PRODUCTION_ENVIRONMENT) {
            Some(PRODUCTION_ENVIRONMENT)
        } else {
            self.environments.first().map(String::as_str)
        }
    }

    /// Certificates derived from the production domains
    pub fn certificates(&self) -> Vec<Certificate> {
        self.domains
            .get(PRODUCTION_ENVIRONMENT)
            .map(|domains| domains.iter().map(|d| Certificate::for_domain(d)).collect())
            .unwrap_or_default()
    }
}

/// TLS certificate derived from a production domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub domain: String,
    /// Domain with `.` replaced by `-`
    pub name: String,
}

impl Certificate {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            name: domain.replace('.', "-"),
        }
    }

    pub fn certificate_file(&self) -> String {
        format!("{}.crt", self.name)
    }

    pub fn key_file(&self) -> String {
        format!("{}.key", self.name)
    }
}
