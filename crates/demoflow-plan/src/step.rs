//! Plan types
//!
//! A [`Plan`] is an ordered list of [`Phase`]s, each an ordered list of
//! [`Step`]s. Steps carry a typed [`Action`] and a failure policy; nothing
//! here knows about shell syntax.

use crate::command::{Command, Effect, Word};
use crate::guard::{Existence, Guard, Lookup};
use crate::verify::VerificationLoop;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happens when a step fails at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Stop the whole run
    Abort,
    /// Print a warning and carry on
    WarnAndContinue,
}

/// Run-time failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A resource this step depends on could not be found
    DependencyMissing,
    /// A create command exited non-zero
    CreationFailed,
    /// A verification loop ran out of attempts
    VerificationTimeout,
    /// A listing query exited non-zero
    QueryFailed,
}

impl FailureKind {
    /// Message for a failure involving `subject`
    pub fn message(self, subject: &str) -> String {
        match self {
            FailureKind::DependencyMissing => format!("{} not found", subject),
            FailureKind::CreationFailed => format!("Failed to create {}", subject),
            FailureKind::VerificationTimeout => format!("{} not confirmed in time", subject),
            FailureKind::QueryFailed => format!("Could not query {}", subject),
        }
    }
}

/// Shell variable assigned before a create command runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub var: String,
    pub value: Word,
}

/// Create a resource unless the guard finds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardedCreate {
    pub guard: Guard,
    /// Dependency resolved only when the resource is absent
    pub requires: Option<Lookup>,
    pub binding: Option<Binding>,
    pub command: Command,
    /// Rate-limit pause after a successful create
    pub pause_after_secs: Option<u64>,
    /// Manual follow-up notes emitted after a successful create
    pub followups: Vec<String>,
}

/// Repeat `body` for every id in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForEach {
    /// Listing whose first column holds the ids
    pub listing: Command,
    /// Shell variable holding the current id
    pub var: String,
    /// Progress message printed before each iteration
    pub item_label: String,
    /// Ids that are skipped
    pub exclude: Vec<String>,
    pub body: Vec<Step>,
}

/// What a step does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Comment lines only
    Note { lines: Vec<String> },
    Run { command: Command },
    Create(GuardedCreate),
    /// Look up an id, then run `then` with it bound
    Resolve { lookup: Lookup, then: Vec<Step> },
    ForEach(ForEach),
    Verify(VerificationLoop),
    MakeDirectory { path: PathBuf },
}

/// One unit of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Progress message, empty for silent steps
    pub description: String,
    pub action: Action,
    pub on_failure: OnFailure,
}

impl Step {
    pub fn new(description: impl Into<String>, action: Action, on_failure: OnFailure) -> Self {
        Self {
            description: description.into(),
            action,
            on_failure,
        }
    }

    pub fn note<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: String::new(),
            action: Action::Note {
                lines: lines.into_iter().map(Into::into).collect(),
            },
            on_failure: OnFailure::WarnAndContinue,
        }
    }

    pub fn run(command: Command, on_failure: OnFailure) -> Self {
        Self {
            description: String::new(),
            action: Action::Run { command },
            on_failure,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.action, Action::Note { .. })
    }

    /// Failure policy once the guard has been evaluated
    ///
    /// An unknown existence only keeps an abort policy for hard-stop kinds;
    /// every other step keeps its declared policy.
    pub fn effective_policy(&self, existence: Existence) -> OnFailure {
        match &self.action {
            Action::Create(create)
                if existence == Existence::Unknown && !create.guard.kind.is_hard_stop() =>
            {
                OnFailure::WarnAndContinue
            }
            _ => self.on_failure,
        }
    }

    /// Nested steps, in order
    pub fn children(&self) -> &[Step] {
        match &self.action {
            Action::Resolve { then, .. } => then,
            Action::ForEach(each) => &each.body,
            _ => &[],
        }
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Step>) {
        out.push(self);
        for child in self.children() {
            child.walk(out);
        }
    }
}

/// Phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    LocalDirectories,
    Authentication,
    Organizations,
    OrganizationVerification,
    Teams,
    UserInvitations,
    Projects,
    Environments,
    Domains,
    Certificates,
    Variables,
    Integrations,
    Backups,
    ProjectDeletion,
    ProjectDrain,
    UserRemoval,
    TeamDeletion,
    OrganizationDeletion,
}

impl PhaseKind {
    pub fn title(self) -> &'static str {
        match self {
            PhaseKind::LocalDirectories => "Create local directories",
            PhaseKind::Authentication => "Check authentication",
            PhaseKind::Organizations => "Create organizations",
            PhaseKind::OrganizationVerification => "Verify organizations",
            PhaseKind::Teams => "Create teams",
            PhaseKind::UserInvitations => "Invite users",
            PhaseKind::Projects => "Create projects",
            PhaseKind::Environments => "Create environments",
            PhaseKind::Domains => "Add domains",
            PhaseKind::Certificates => "Add certificates",
            PhaseKind::Variables => "Set environment variables",
            PhaseKind::Integrations => "Add integrations",
            PhaseKind::Backups => "Create backups",
            PhaseKind::ProjectDeletion => "Delete projects",
            PhaseKind::ProjectDrain => "Wait for project deletion",
            PhaseKind::UserRemoval => "Remove users",
            PhaseKind::TeamDeletion => "Delete teams",
            PhaseKind::OrganizationDeletion => "Delete organizations",
        }
    }
}

/// Ordered group of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub title: String,
    pub steps: Vec<Step>,
}

impl Phase {
    pub fn new(kind: PhaseKind, steps: Vec<Step>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            steps,
        }
    }

    /// Whether every step is a comment
    pub fn is_notes_only(&self) -> bool {
        self.steps.iter().all(Step::is_note)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Setup,
    Cleanup,
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanKind::Setup => write!(f, "setup"),
            PlanKind::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Complete provisioning or teardown plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub kind: PlanKind,
    /// Profile the plan was built for
    pub profile: String,
    /// CLI binary every command is run with
    pub cli: String,
    pub phases: Vec<Phase>,
}

impl Plan {
    pub fn phase(&self, kind: PhaseKind) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.kind == kind)
    }

    /// Every step, nested ones included, in order
    pub fn steps(&self) -> Vec<&Step> {
        let mut out = Vec::new();
        for step in self.phases.iter().flat_map(|phase| &phase.steps) {
            step.walk(&mut out);
        }
        out
    }

    /// Commands that change or query platform state, excluding guard listings
    pub fn commands(&self) -> Vec<&Command> {
        self.steps()
            .into_iter()
            .filter_map(|step| match &step.action {
                Action::Run { command } => Some(command),
                Action::Create(create) => Some(&create.command),
                _ => None,
            })
            .collect()
    }

    /// Commands using `verb`
    pub fn commands_with_verb(&self, verb: &str) -> Vec<&Command> {
        self.commands()
            .into_iter()
            .filter(|command| command.verb() == verb)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for step in self.steps() {
            match &step.action {
                Action::Create(_) => {
                    summary.create += 1;
                    summary.guarded += 1;
                }
                Action::Run { command } => match command.effect() {
                    Effect::Create => summary.create += 1,
                    Effect::Delete => summary.delete += 1,
                    Effect::Query => summary.query += 1,
                },
                Action::Verify(_) => summary.verify += 1,
                Action::Note { .. } => summary.note += 1,
                Action::MakeDirectory { .. } => summary.create += 1,
                Action::Resolve { .. } | Action::ForEach(_) => {}
            }
        }
        summary
    }
}

/// Summary of planned steps
///
/// Steps inside a loop are counted once, whatever the number of ids listed
/// at run time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub guarded: usize,
    pub delete: usize,
    pub query: usize,
    pub verify: usize,
    pub note: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create ({} guarded), {} to delete, {} checks, {} verifications, {} notes",
            self.create, self.guarded, self.delete, self.query, self.verify, self.note
        )
    }
}
