//! Topology loader
//!
//! Reads the topology document, deserializes it and validates the
//! cross-references the plan generator relies on.

use crate::error::{Result, TopologyError};
use crate::model::Topology;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Document format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` / `.yml` are YAML, anything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Load and validate a topology document from disk
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_topology(path: &Path) -> Result<Topology> {
    info!("Loading topology document");
    let content = std::fs::read_to_string(path).map_err(|source| TopologyError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let topology = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => parse_topology_json(&content)?,
        DocumentFormat::Yaml => parse_topology_yaml(&content)?,
    };

    info!(
        organizations = topology.organizations.len(),
        teams = topology.teams.len(),
        users = topology.users.len(),
        projects = topology.projects.len(),
        "Topology loaded successfully"
    );
    Ok(topology)
}

/// Parse and validate a JSON topology document
pub fn parse_topology_json(content: &str) -> Result<Topology> {
    let topology: Topology = serde_json::from_str(content)?;
    finish(topology)
}

/// Parse and validate a YAML topology document
pub fn parse_topology_yaml(content: &str) -> Result<Topology> {
    let topology: Topology = serde_yaml::from_str(content)?;
    finish(topology)
}

fn finish(mut topology: Topology) -> Result<Topology> {
    topology.organizations.assign_tiers();
    validate(&topology)?;
    Ok(topology)
}

/// Check the invariants the plan generator depends on
pub fn validate(topology: &Topology) -> Result<()> {
    debug!("Validating organizations");
    let mut labels = BTreeSet::new();
    for org in topology.organizations.iter() {
        if org.label.trim().is_empty() {
            return Err(TopologyError::Invalid(
                "organization label must not be empty".to_string(),
            ));
        }
        if org.name.trim().is_empty() {
            return Err(TopologyError::Invalid(format!(
                "organization '{}' has an empty name",
                org.label
            )));
        }
        // ASCII-only folding, the same comparison the generated scripts run
        let key = org
            .label
            .split_ascii_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        if !labels.insert(key) {
            return Err(TopologyError::DuplicateOrganization(org.label.clone()));
        }
    }

    debug!("Validating users");
    for user in &topology.users {
        if !user.email.contains('@') {
            return Err(TopologyError::Invalid(format!(
                "user '{}' has an invalid email '{}'",
                user.name, user.email
            )));
        }
    }

    debug!("Validating projects");
    for project in &topology.projects {
        if project.title.trim().is_empty() {
            return Err(TopologyError::Invalid(format!(
                "project '{}' has an empty title",
                project.slug()
            )));
        }
        if topology.organization_of(project).is_none() {
            return Err(TopologyError::UnknownOrganization {
                project: project.title.clone(),
                organization: project.organization.clone(),
            });
        }
    }

    for team in &topology.teams {
        if team.title.trim().is_empty() {
            return Err(TopologyError::Invalid(format!(
                "team '{}' has an empty title",
                team.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use std::path::PathBuf;

    const ACME: &str = r#"{
        "organizations": {
            "flex": [{"label": "Acme", "name": "Acme Co"}],
            "fixed": [{"label": "Big Corp", "name": "big-corp"}]
        },
        "projects": [
            {"title": "Demo", "organization": "Acme", "environments": ["production"]}
        ]
    }"#;

    #[test]
    fn test_parse_assigns_tiers() {
        let topology = parse_topology_json(ACME).unwrap();
        assert_eq!(topology.organizations.flex[0].tier, Tier::Flex);
        assert_eq!(topology.organizations.fixed[0].tier, Tier::Fixed);
        assert_eq!(topology.projects.len(), 1);
        assert_eq!(topology.projects[0].slug(), "demo");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
organizations:
  flex:
    - label: Acme
      name: Acme Co
users:
  - name: Jane
    email: jane@example.com
    role: admin
"#;
        let topology = parse_topology_yaml(yaml).unwrap();
        assert_eq!(topology.organizations.flex.len(), 1);
        assert!(topology.users[0].is_admin());
    }

    #[test]
    fn test_unknown_organization_rejected() {
        let json = r#"{
            "projects": [{"name": "demo", "title": "Demo", "organization": "Nowhere"}]
        }"#;
        let err = parse_topology_json(json).unwrap_err();
        match err {
            TopologyError::UnknownOrganization {
                project,
                organization,
            } => {
                assert_eq!(project, "Demo");
                assert_eq!(organization, "Nowhere");
            }
            other => panic!("Expected UnknownOrganization, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let json = r#"{
            "organizations": {
                "fixed": [{"label": "Acme", "name": "a"}],
                "flex": [{"label": "ACME", "name": "b"}]
            }
        }"#;
        assert!(matches!(
            parse_topology_json(json),
            Err(TopologyError::DuplicateOrganization(_))
        ));

        let distinct = r#"{
            "organizations": {
                "flex": [{"label": "Ökosystem", "name": "a"}, {"label": "ökosystem", "name": "b"}]
            }
        }"#;
        assert!(parse_topology_json(distinct).is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let json = r#"{"users": [{"name": "Jane", "email": "jane", "role": "viewer"}]}"#;
        assert!(matches!(
            parse_topology_json(json),
            Err(TopologyError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_topology_json("{ not json"),
            Err(TopologyError::Json(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("demo.yaml")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("demo.YML")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("demo-config.json")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("demo")),
            DocumentFormat::Json
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_topology(Path::new("/nonexistent/demo-config.json")).unwrap_err();
        assert!(matches!(err, TopologyError::Read { .. }));
    }
}
