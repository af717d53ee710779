//! Team creation

use super::ORG_ID;
use crate::command::{Command, Word};
use crate::guard::{Guard, Lookup, ResourceKind};
use crate::step::{Action, GuardedCreate, OnFailure, Phase, PhaseKind, Step};
use demoflow_core::{Team, Topology};

pub fn build(topology: &Topology) -> Phase {
    if topology.teams.is_empty() {
        return Phase::new(PhaseKind::Teams, vec![Step::note(["No teams configured"])]);
    }

    let steps = topology
        .teams
        .iter()
        .map(|team| team_step(topology, team))
        .collect();
    Phase::new(PhaseKind::Teams, steps)
}

fn team_step(topology: &Topology, team: &Team) -> Step {
    let Some(org) = topology.organization_of_team(team) else {
        return Step::note([format!(
            "Team {} skipped: no organization to create it in",
            team.title
        )]);
    };

    let create = Step::new(
        "",
        Action::Create(GuardedCreate {
            guard: Guard::scoped(ResourceKind::Team, team.title.as_str(), Word::var(ORG_ID)),
            requires: None,
            binding: None,
            command: Command::TeamCreate {
                org: Word::var(ORG_ID),
                label: team.title.clone(),
            },
            pause_after_secs: None,
            followups: vec![],
        }),
        OnFailure::WarnAndContinue,
    );

    Step::new(
        format!("Checking team: {} in {}", team.title, org.label),
        Action::Resolve {
            lookup: Lookup::optional(ResourceKind::Organization, org.label.as_str(), ORG_ID),
            then: vec![create],
        },
        OnFailure::WarnAndContinue,
    )
}
