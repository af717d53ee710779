//! Organization creation and verification

use super::UNIQUE_NAME;
use crate::command::{Command, Fragment, Word};
use crate::guard::{Guard, ResourceKind};
use crate::profile::Profile;
use crate::step::{Action, Binding, GuardedCreate, OnFailure, Phase, PhaseKind, Step};
use crate::verify::VerificationLoop;
use demoflow_core::{Organization, Tier, Topology};

/// Guarded create for every organization, fixed tier first
pub fn build(topology: &Topology, profile: &Profile) -> Phase {
    if topology.organizations.is_empty() {
        return Phase::new(
            PhaseKind::Organizations,
            vec![Step::note(["No organizations configured"])],
        );
    }

    let steps = topology
        .organizations
        .iter()
        .map(|org| create_step(org, profile))
        .collect();
    Phase::new(PhaseKind::Organizations, steps)
}

/// Wait until every declared organization shows up in one listing
pub fn verification(topology: &Topology, profile: &Profile) -> Phase {
    if topology.organizations.is_empty() {
        return Phase::new(
            PhaseKind::OrganizationVerification,
            vec![Step::note(["No organizations to verify"])],
        );
    }

    let labels = topology
        .organizations
        .iter()
        .map(|org| org.label.clone())
        .collect();
    let retry = profile.organization_verification;
    Phase::new(
        PhaseKind::OrganizationVerification,
        vec![Step::new(
            "Verifying organizations are listed",
            Action::Verify(VerificationLoop::organizations_listed(
                labels,
                retry.max_attempts,
                retry.delay_secs,
            )),
            OnFailure::WarnAndContinue,
        )],
    )
}

fn create_step(org: &Organization, profile: &Profile) -> Step {
    // Fixed organizations have no dedicated verb and go through the raw API
    let (command, on_failure) = match org.tier {
        Tier::Fixed => (
            Command::OrganizationCurl {
                payload: fixed_payload(org),
            },
            OnFailure::Abort,
        ),
        Tier::Flex => (
            Command::OrganizationCreate {
                label: org.label.clone(),
                name: Word::var(UNIQUE_NAME),
            },
            OnFailure::WarnAndContinue,
        ),
    };

    Step::new(
        format!("Checking {} organization: {}", org.tier, org.label),
        Action::Create(GuardedCreate {
            guard: Guard::new(ResourceKind::Organization, org.label.as_str()),
            requires: None,
            binding: Some(Binding {
                var: UNIQUE_NAME.to_string(),
                value: Word::timestamped(&org.slug()),
            }),
            command,
            pause_after_secs: Some(profile.rate_limit.pause_for(org.tier)),
            followups: vec![],
        }),
        on_failure,
    )
}

/// `{"label": ..., "name": "$unique_name", "type": "fixed"}`
fn fixed_payload(org: &Organization) -> Word {
    let label = serde_json::Value::String(org.label.clone()).to_string();
    Word::concat(vec![
        Fragment::Text(format!("{{\"label\": {}, \"name\": \"", label)),
        Fragment::Var(UNIQUE_NAME.to_string()),
        Fragment::Text("\", \"type\": \"fixed\"}".to_string()),
    ])
}
