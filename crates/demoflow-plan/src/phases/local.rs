//! Local working directories

use crate::step::{Action, OnFailure, Phase, PhaseKind, Step};
use demoflow_core::Topology;

/// `mkdir -p` every declared local directory
pub fn build(topology: &Topology) -> Phase {
    let steps: Vec<Step> = topology
        .projects
        .iter()
        .filter_map(|project| {
            project.local_directory.as_ref().map(|path| {
                Step::new(
                    format!("Creating local directory for {}", project.title),
                    Action::MakeDirectory { path: path.clone() },
                    OnFailure::WarnAndContinue,
                )
            })
        })
        .collect();

    if steps.is_empty() {
        return Phase::new(
            PhaseKind::LocalDirectories,
            vec![Step::note(["No local directories declared"])],
        );
    }
    Phase::new(PhaseKind::LocalDirectories, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoflow_core::parse_topology_json;
    use std::path::PathBuf;

    #[test]
    fn test_only_declared_directories() {
        let topology = parse_topology_json(
            r#"{
                "organizations": {"flex": [{"label": "Acme", "name": "acme"}]},
                "projects": [
                    {"name": "a", "title": "A", "organization": "Acme", "local_directory": "demo/a"},
                    {"name": "b", "title": "B", "organization": "Acme"}
                ]
            }"#,
        )
        .unwrap();

        let phase = build(&topology);
        assert_eq!(phase.steps.len(), 1);
        assert_eq!(
            phase.steps[0].action,
            Action::MakeDirectory {
                path: PathBuf::from("demo/a")
            }
        );
    }
}
