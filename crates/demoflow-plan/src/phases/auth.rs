//! Authentication check

use crate::command::Command;
use crate::step::{Action, OnFailure, Phase, PhaseKind, Step};

/// Stop before touching anything when the CLI is not logged in
pub fn build() -> Phase {
    Phase::new(
        PhaseKind::Authentication,
        vec![Step::new(
            "Checking CLI authentication",
            Action::Run {
                command: Command::AuthInfo,
            },
            OnFailure::Abort,
        )],
    )
}
