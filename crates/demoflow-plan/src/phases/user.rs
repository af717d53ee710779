//! User invitations

use super::{ORG_ID, PROJECT_ID};
use crate::command::{Command, Word};
use crate::step::{Action, ForEach, OnFailure, Phase, PhaseKind, Step};
use demoflow_core::{Topology, User};

/// Invite every user to every listed organization and project
///
/// Without declared projects there is nothing to invite users to, and the
/// phase is reduced to notes.
pub fn build(topology: &Topology) -> Phase {
    if topology.users.is_empty() {
        return Phase::new(
            PhaseKind::UserInvitations,
            vec![Step::note(["No users configured"])],
        );
    }

    if topology.projects.is_empty() {
        let lines = std::iter::once("No projects configured; user invitations skipped".to_string())
            .chain(
                topology
                    .users
                    .iter()
                    .map(|user| format!("Not invited: {} <{}>", user.name, user.email)),
            );
        return Phase::new(PhaseKind::UserInvitations, vec![Step::note(lines)]);
    }

    let steps = topology.users.iter().flat_map(invite_steps).collect();
    Phase::new(PhaseKind::UserInvitations, steps)
}

fn invite_steps(user: &User) -> Vec<Step> {
    let organizations = Step::new(
        format!("Inviting {} <{}> to organizations", user.name, user.email),
        Action::ForEach(ForEach {
            listing: Command::OrganizationList,
            var: ORG_ID.to_string(),
            item_label: "Organization".to_string(),
            exclude: vec![],
            body: vec![Step::run(
                Command::OrganizationUserAdd {
                    org: Word::var(ORG_ID),
                    email: user.email.clone(),
                    role: user.organization_role().to_string(),
                },
                OnFailure::WarnAndContinue,
            )],
        }),
        OnFailure::WarnAndContinue,
    );

    let projects = Step::new(
        format!("Adding {} to projects as {}", user.email, user.project_role()),
        Action::ForEach(ForEach {
            listing: Command::ProjectIds,
            var: PROJECT_ID.to_string(),
            item_label: "Project".to_string(),
            exclude: vec![],
            body: vec![Step::run(
                Command::UserAdd {
                    project: Word::var(PROJECT_ID),
                    email: user.email.clone(),
                    role: user.project_role(),
                },
                OnFailure::WarnAndContinue,
            )],
        }),
        OnFailure::WarnAndContinue,
    );

    let mut steps = vec![organizations, projects];
    if let Some(team) = &user.team {
        steps.push(Step::note([format!(
            "Add {} to team {} once the invitation is accepted",
            user.email, team
        )]));
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use demoflow_core::parse_topology_json;

    const USERS: &str = r#"
        "users": [
            {"name": "Ada", "email": "ada@example.com", "role": "admin"},
            {"name": "Bob", "email": "bob@example.com", "role": "viewer", "team": "Ops"}
        ]"#;

    #[test]
    fn test_no_projects_means_no_invitations() {
        let topology = parse_topology_json(&format!("{{{USERS}}}")).unwrap();
        let phase = build(&topology);
        assert!(phase.is_notes_only());
    }

    #[test]
    fn test_invitations_per_user() {
        let topology = parse_topology_json(&format!(
            r#"{{
                "organizations": {{"flex": [{{"label": "Acme", "name": "acme"}}]}},
                "projects": [{{"name": "demo", "title": "Demo", "organization": "Acme"}}],
                {USERS}
            }}"#
        ))
        .unwrap();

        let phase = build(&topology);
        // Ada: orgs + projects, Bob: orgs + projects + team note
        assert_eq!(phase.steps.len(), 5);

        let Action::ForEach(each) = &phase.steps[3].action else {
            panic!("Expected project loop");
        };
        assert_eq!(
            each.body[0].action,
            Action::Run {
                command: Command::UserAdd {
                    project: Word::var(PROJECT_ID),
                    email: "bob@example.com".to_string(),
                    role: "production:viewer".to_string(),
                }
            }
        );
        assert!(phase.steps[4].is_note());
    }
}
