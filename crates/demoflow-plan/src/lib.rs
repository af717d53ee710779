//! demoflow plan generation
//!
//! Turns a [`Topology`](demoflow_core::Topology) into an ordered provisioning
//! or teardown [`Plan`], and renders plans as bash scripts that drive the
//! platform CLI.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐     ┌──────────────┐
//! │  demoflow-core   │     │   demoflow-plan    │     │  bash script │
//! │  Topology        ├────►│  phases/assembler  ├────►│  (rendered)  │
//! │  (JSON / YAML)   │     │  Plan → Step       │     │              │
//! └──────────────────┘     └─────────┬──────────┘     └──────────────┘
//!                                    │
//!                         ┌──────────▼──────────┐
//!                         │ Profile             │
//!                         │ (staging/production)│
//!                         └─────────────────────┘
//! ```
//!
//! Plans are data: guards, lookups, loops and verification loops are typed
//! values that can be inspected in tests. Only [`script`] knows about shell
//! syntax.

pub mod assembler;
pub mod command;
pub mod error;
pub mod guard;
pub mod phases;
pub mod profile;
pub mod script;
pub mod step;
pub mod verify;

// Re-exports
pub use assembler::{SetupOptions, build_cleanup_plan, build_setup_plan};
pub use command::{Command, Effect, Fragment, Word, shell_quote};
pub use error::{PlanError, Result};
pub use guard::{Existence, Guard, Lookup, QueryFailed, ResourceKind, normalize_label};
pub use profile::{PROTECTED_ORGANIZATION_ID, Profile, RateLimit, RetryConfig};
pub use script::{PRELUDE, ScriptOptions, render_script};
pub use step::{
    Action, Binding, FailureKind, ForEach, GuardedCreate, OnFailure, Phase, PhaseKind, Plan,
    PlanKind, PlanSummary, Step,
};
pub use verify::{Condition, VerificationLoop, VerificationOutcome};
