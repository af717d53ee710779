use demoflow_core::{Tier, TopologyError, load_topology};
use std::fs;

const DEMO_CONFIG: &str = r#"{
    "organizations": {
        "fixed": [{"label": "BMC Global", "name": "bmc global"}],
        "flex": [{"label": "BMC Retail", "name": "bmc retail"}]
    },
    "teams": [{"title": "Platform", "name": "platform"}],
    "users": [
        {"name": "Ada", "email": "ada@example.com", "role": "admin"},
        {"name": "Bob", "email": "bob@example.com", "role": "viewer", "team": "platform"}
    ],
    "projects": [
        {
            "name": "storefront",
            "title": "Storefront",
            "organization": "bmc-retail",
            "source": {"type": "github", "repository": "https://github.com/bmc/storefront"},
            "environments": ["production", "staging"],
            "domains": {"production": ["shop.example.com"]},
            "local_directory": "demo/storefront"
        }
    ],
    "environment_variables": {
        "global": {"APP_ENV": "demo"},
        "staging": {"DEBUG": true}
    },
    "integrations": [{"type": "newrelic", "api_key": "nr-key"}]
}"#;

#[test]
fn test_load_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo-config.json");
    fs::write(&path, DEMO_CONFIG).unwrap();

    let topology = load_topology(&path).unwrap();
    assert_eq!(topology.organizations.len(), 2);
    assert_eq!(topology.organizations.fixed[0].tier, Tier::Fixed);
    assert_eq!(topology.users.len(), 2);
    assert_eq!(
        topology.organization_of(&topology.projects[0]).unwrap().label,
        "BMC Retail"
    );
    assert_eq!(
        topology.organization_of_team(&topology.teams[0]).unwrap().label,
        "BMC Retail"
    );
    assert_eq!(
        topology.environment_variables.environment_pairs("staging"),
        vec![("DEBUG".to_string(), "true".to_string())]
    );
}

#[test]
fn test_load_yaml_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo-config.yaml");
    fs::write(
        &path,
        "organizations:\n  flex:\n    - label: Acme\n      name: Acme Co\nprojects:\n  - name: demo\n    title: Demo\n    organization: Acme\n",
    )
    .unwrap();

    let topology = load_topology(&path).unwrap();
    assert_eq!(topology.projects[0].title, "Demo");
    assert!(topology.projects[0].environments.is_empty());
}

#[test]
fn test_load_invalid_json_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo-config.json");
    fs::write(&path, "{\"organizations\": [").unwrap();

    let err = load_topology(&path).unwrap_err();
    assert!(matches!(err, TopologyError::Json(_)));
    assert!(err.to_string().contains("Invalid JSON"));
}
