use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a topology document
///
/// Every variant is fatal: no plan is generated from a document that
/// failed to load or validate.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Cannot read configuration file: {path}\nReason: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML in configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Project '{project}' references unknown organization '{organization}'")]
    UnknownOrganization {
        project: String,
        organization: String,
    },

    #[error("Organization label '{0}' is declared more than once")]
    DuplicateOrganization(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
