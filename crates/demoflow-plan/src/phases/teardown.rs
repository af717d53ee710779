//! Teardown phases
//!
//! Cleanup works from what the platform lists, not from the topology: every
//! listed project and organization is deleted, except protected ones.
//! Declared users are only needed to remove their project access.

use super::{ORG_ID, PROJECT_ID, TEAM_ID};
use crate::command::{Command, Word};
use crate::profile::Profile;
use crate::step::{Action, ForEach, OnFailure, Phase, PhaseKind, Step};
use crate::verify::VerificationLoop;
use demoflow_core::Topology;

fn for_each(
    listing: Command,
    var: &str,
    item_label: &str,
    exclude: Vec<String>,
    body: Vec<Step>,
) -> Action {
    Action::ForEach(ForEach {
        listing,
        var: var.to_string(),
        item_label: item_label.to_string(),
        exclude,
        body,
    })
}

fn warn(command: Command) -> Step {
    Step::run(command, OnFailure::WarnAndContinue)
}

pub fn delete_projects() -> Phase {
    Phase::new(
        PhaseKind::ProjectDeletion,
        vec![Step::new(
            "Deleting all listed projects",
            for_each(
                Command::ProjectIds,
                PROJECT_ID,
                "Deleting project",
                vec![],
                vec![warn(Command::ProjectDelete {
                    project: Word::var(PROJECT_ID),
                })],
            ),
            OnFailure::WarnAndContinue,
        )],
    )
}

/// Wait for project deletion to finish before touching organizations
pub fn drain_projects(profile: &Profile) -> Phase {
    let retry = profile.project_drain;
    Phase::new(
        PhaseKind::ProjectDrain,
        vec![Step::new(
            "Waiting for projects to be deleted",
            Action::Verify(VerificationLoop::projects_drained(
                retry.max_attempts,
                retry.delay_secs,
            )),
            OnFailure::WarnAndContinue,
        )],
    )
}

pub fn remove_users(topology: &Topology) -> Phase {
    if topology.users.is_empty() {
        return Phase::new(
            PhaseKind::UserRemoval,
            vec![Step::note(["No users configured"])],
        );
    }

    let steps = topology
        .users
        .iter()
        .map(|user| {
            Step::new(
                format!("Removing {} from all listed projects", user.email),
                for_each(
                    Command::ProjectIds,
                    PROJECT_ID,
                    "Project",
                    vec![],
                    vec![warn(Command::UserDelete {
                        project: Word::var(PROJECT_ID),
                        email: user.email.clone(),
                    })],
                ),
                OnFailure::WarnAndContinue,
            )
        })
        .collect();
    Phase::new(PhaseKind::UserRemoval, steps)
}

pub fn delete_teams(profile: &Profile) -> Phase {
    let teams = Step::new(
        "",
        for_each(
            Command::TeamList {
                org: Word::var(ORG_ID),
            },
            TEAM_ID,
            "Deleting team",
            vec![],
            vec![warn(Command::TeamDelete {
                team: Word::var(TEAM_ID),
            })],
        ),
        OnFailure::WarnAndContinue,
    );

    Phase::new(
        PhaseKind::TeamDeletion,
        vec![Step::new(
            "Deleting teams of all listed organizations",
            for_each(
                Command::OrganizationList,
                ORG_ID,
                "Organization",
                profile.protected_organizations.clone(),
                vec![teams],
            ),
            OnFailure::WarnAndContinue,
        )],
    )
}

pub fn delete_organizations(profile: &Profile) -> Phase {
    Phase::new(
        PhaseKind::OrganizationDeletion,
        vec![Step::new(
            "Deleting all listed organizations",
            for_each(
                Command::OrganizationList,
                ORG_ID,
                "Deleting organization",
                profile.protected_organizations.clone(),
                vec![warn(Command::OrganizationDelete {
                    org: Word::var(ORG_ID),
                })],
            ),
            OnFailure::WarnAndContinue,
        )],
    )
}
