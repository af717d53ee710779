//! Project creation

use super::ORG_ID;
use crate::command::{Command, Word};
use crate::guard::{Guard, Lookup, ResourceKind};
use crate::profile::Profile;
use crate::step::{Action, GuardedCreate, OnFailure, Phase, PhaseKind, Step};
use demoflow_core::{Project, ProjectSource, Topology};

pub fn build(topology: &Topology, profile: &Profile) -> Phase {
    if topology.projects.is_empty() {
        return Phase::new(
            PhaseKind::Projects,
            vec![Step::note(["No projects configured"])],
        );
    }

    let steps = topology
        .projects
        .iter()
        .map(|project| {
            // Unresolved references still get looked up by name so the
            // script stops at run time instead of silently skipping.
            let org_label = topology
                .organization_of(project)
                .map(|org| org.label.as_str())
                .unwrap_or(project.organization.as_str());
            create_step(project, org_label, profile)
        })
        .collect();
    Phase::new(PhaseKind::Projects, steps)
}

fn create_step(project: &Project, org_label: &str, profile: &Profile) -> Step {
    Step::new(
        format!("Checking project: {} in {}", project.title, org_label),
        Action::Create(GuardedCreate {
            guard: Guard::new(ResourceKind::Project, project.title.as_str()),
            requires: Some(Lookup::required(
                ResourceKind::Organization,
                org_label,
                ORG_ID,
            )),
            binding: None,
            command: Command::ProjectCreate {
                title: project.title.clone(),
                org: Word::var(ORG_ID),
                region: profile.region.clone(),
                init_repo: project.github_repository().map(str::to_string),
            },
            pause_after_secs: None,
            followups: followups(project),
        }),
        OnFailure::WarnAndContinue,
    )
}

fn followups(project: &Project) -> Vec<String> {
    let mut notes = Vec::new();
    if let Some(path) = project.source_subdirectory() {
        notes.push(format!(
            "This project uses a subdirectory ({}) - manual configuration may be required",
            path
        ));
    }
    if matches!(project.source, Some(ProjectSource::Local)) {
        notes.push(format!(
            "Local project {} must be connected to its code manually",
            project.slug()
        ));
    }
    notes
}
