//! Plan assembly
//!
//! Orders the phase builders into a setup or cleanup plan for one profile.

use crate::phases::{self, auth, local, organization, project, scoped, team, teardown, user};
use crate::profile::Profile;
use crate::step::{Phase, PhaseKind, Plan, PlanKind};
use demoflow_core::Topology;
use tracing::{debug, info, instrument};

/// Options that change which setup phases are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Emit `mkdir -p` for declared local directories first
    pub create_dirs: bool,
}

fn optional(kind: PhaseKind, profile: &Profile, build: impl FnOnce() -> Phase) -> Phase {
    if profile.enables(kind) {
        build()
    } else {
        debug!(phase = ?kind, profile = %profile.name, "Phase disabled");
        phases::disabled(kind, profile)
    }
}

/// Build the provisioning plan
///
/// Phase order: authentication, organizations, organization verification,
/// teams, user invitations, projects, then the project-scoped phases.
#[instrument(skip_all, fields(profile = %profile.name))]
pub fn build_setup_plan(topology: &Topology, profile: &Profile, options: SetupOptions) -> Plan {
    let mut phases = Vec::new();
    if options.create_dirs {
        phases.push(local::build(topology));
    }

    phases.push(auth::build());
    phases.push(organization::build(topology, profile));
    phases.push(organization::verification(topology, profile));
    phases.push(optional(PhaseKind::Teams, profile, || team::build(topology)));
    phases.push(user::build(topology));
    phases.push(project::build(topology, profile));
    phases.push(optional(PhaseKind::Environments, profile, || {
        scoped::environments(topology)
    }));
    phases.push(optional(PhaseKind::Domains, profile, || {
        scoped::domains(topology)
    }));
    phases.push(optional(PhaseKind::Certificates, profile, || {
        scoped::certificates(topology)
    }));
    phases.push(optional(PhaseKind::Variables, profile, || {
        scoped::variables(topology)
    }));
    phases.push(optional(PhaseKind::Integrations, profile, || {
        scoped::integrations(topology)
    }));
    phases.push(optional(PhaseKind::Backups, profile, || {
        scoped::backups(topology)
    }));

    let plan = Plan {
        kind: PlanKind::Setup,
        profile: profile.name.clone(),
        cli: profile.cli.clone(),
        phases,
    };
    info!(phases = plan.phases.len(), summary = %plan.summary(), "Setup plan built");
    plan
}

/// Build the teardown plan
///
/// Deletes listed projects, waits for them to drain, removes declared users,
/// deletes teams (when the profile manages teams) and finally every listed
/// organization except the protected ones.
#[instrument(skip_all, fields(profile = %profile.name))]
pub fn build_cleanup_plan(topology: &Topology, profile: &Profile) -> Plan {
    let mut phases = vec![
        teardown::delete_projects(),
        teardown::drain_projects(profile),
        teardown::remove_users(topology),
    ];
    if profile.enables(PhaseKind::Teams) {
        phases.push(teardown::delete_teams(profile));
    }
    phases.push(teardown::delete_organizations(profile));

    let plan = Plan {
        kind: PlanKind::Cleanup,
        profile: profile.name.clone(),
        cli: profile.cli.clone(),
        phases,
    };
    info!(phases = plan.phases.len(), summary = %plan.summary(), "Cleanup plan built");
    plan
}
