//! Phase builders
//!
//! Each builder turns one slice of the topology into a [`Phase`]. Builders
//! are pure; the assembler decides which ones run and in which order.

pub mod auth;
pub mod local;
pub mod organization;
pub mod project;
pub mod scoped;
pub mod team;
pub mod teardown;
pub mod user;

use crate::guard::{Lookup, ResourceKind};
use crate::profile::Profile;
use crate::step::{Action, OnFailure, Phase, PhaseKind, Step};
use demoflow_core::Project;

pub(crate) const ORG_ID: &str = "org_id";
pub(crate) const PROJECT_ID: &str = "project_id";
pub(crate) const TEAM_ID: &str = "team_id";
pub(crate) const UNIQUE_NAME: &str = "unique_name";

/// Run `steps` against a project resolved by title, skipping it when missing
pub(crate) fn in_project(project: &Project, steps: Vec<Step>) -> Option<Step> {
    if steps.is_empty() {
        return None;
    }
    Some(Step::new(
        format!("Project: {}", project.title),
        Action::Resolve {
            lookup: Lookup::optional(ResourceKind::Project, project.title.as_str(), PROJECT_ID),
            then: steps,
        },
        OnFailure::WarnAndContinue,
    ))
}

/// Project-scoped phase: one resolved block per project with work to do
pub(crate) fn per_project<F>(kind: PhaseKind, projects: &[Project], mut build: F) -> Phase
where
    F: FnMut(&Project) -> Vec<Step>,
{
    if projects.is_empty() {
        return Phase::new(kind, vec![Step::note(["No projects configured"])]);
    }

    let steps: Vec<Step> = projects
        .iter()
        .filter_map(|project| in_project(project, build(project)))
        .collect();

    if steps.is_empty() {
        return Phase::new(
            kind,
            vec![Step::note([format!(
                "Nothing to do: no project declares {}",
                kind.title().to_lowercase()
            )])],
        );
    }
    Phase::new(kind, steps)
}

/// Placeholder for an optional phase the profile switches off
pub fn disabled(kind: PhaseKind, profile: &Profile) -> Phase {
    let mut lines = vec![format!(
        "{} is disabled for the {} profile",
        kind.title(),
        profile.name
    )];
    if let Some(hint) = manual_hint(kind) {
        lines.push(format!("To do this by hand: {} {}", profile.cli, hint));
    }
    Phase::new(kind, vec![Step::note(lines)])
}

fn manual_hint(kind: PhaseKind) -> Option<&'static str> {
    match kind {
        PhaseKind::Teams => Some("team:create --org <org-id> --label <title>"),
        PhaseKind::Environments => Some("environment:branch <name> production --project <project-id>"),
        PhaseKind::Domains => Some("domain:add <domain> --project <project-id>"),
        PhaseKind::Certificates => Some(
            "certificate:add --project <project-id> --certificate-file <file>.crt --key-file <file>.key",
        ),
        PhaseKind::Variables => {
            Some("variable:create --project <project-id> --name <name> --value <value>")
        }
        PhaseKind::Integrations => Some("integration:add --project <project-id> --type <type>"),
        PhaseKind::Backups => Some("backup:create --project <project-id> --environment production"),
        _ => None,
    }
}
