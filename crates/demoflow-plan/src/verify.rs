//! Bounded verification loops
//!
//! Creation and deletion are eventually consistent on the platform, so some
//! phases poll a listing until a condition holds. A loop runs at most
//! `attempts` queries, pausing `delay_secs` between them but not after the
//! last one. Running out of attempts is only ever a warning.

use crate::command::Command;
use crate::guard::{QueryFailed, ResourceKind, count_rows, find_id};
use serde::{Deserialize, Serialize};

/// Condition checked against a fresh listing on every attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Every label appears in the listing
    LabelsListed {
        kind: ResourceKind,
        labels: Vec<String>,
    },
    /// The listing has no rows left
    Drained { kind: ResourceKind },
}

impl Condition {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Condition::LabelsListed { kind, .. } | Condition::Drained { kind } => *kind,
        }
    }

    /// Listing queried on each attempt
    pub fn listing(&self) -> Command {
        match self {
            Condition::Drained {
                kind: ResourceKind::Project,
            } => Command::ProjectIds,
            other => other.kind().listing(None),
        }
    }

    /// Whether one listing satisfies the condition; a failed query never does
    pub fn is_satisfied(&self, listing: Result<&str, QueryFailed>) -> bool {
        let Ok(rows) = listing else {
            return false;
        };
        match self {
            Condition::LabelsListed { labels, .. } => labels
                .iter()
                .all(|label| find_id(rows, label).is_some()),
            Condition::Drained { .. } => count_rows(rows) == 0,
        }
    }
}

/// Outcome of running a loop against a sequence of listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified { attempt: u32, waited_secs: u64 },
    TimedOut { attempts: u32, waited_secs: u64 },
}

/// Poll a listing until a condition holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationLoop {
    pub attempts: u32,
    pub delay_secs: u64,
    pub condition: Condition,
}

impl VerificationLoop {
    /// Wait until every organization label is listed
    pub fn organizations_listed(labels: Vec<String>, attempts: u32, delay_secs: u64) -> Self {
        Self {
            attempts,
            delay_secs,
            condition: Condition::LabelsListed {
                kind: ResourceKind::Organization,
                labels,
            },
        }
    }

    /// Wait until no project is left
    pub fn projects_drained(attempts: u32, delay_secs: u64) -> Self {
        Self {
            attempts,
            delay_secs,
            condition: Condition::Drained {
                kind: ResourceKind::Project,
            },
        }
    }

    /// Longest time the loop can spend sleeping
    pub fn max_wait_secs(&self) -> u64 {
        u64::from(self.attempts.saturating_sub(1)) * self.delay_secs
    }

    /// Run the loop against a sequence of listings, one per attempt
    ///
    /// A sequence shorter than `attempts` behaves as if the remaining
    /// queries failed.
    pub fn simulate<'a, I>(&self, listings: I) -> VerificationOutcome
    where
        I: IntoIterator<Item = Result<&'a str, QueryFailed>>,
    {
        let mut listings = listings.into_iter();
        let mut waited_secs = 0;

        for attempt in 1..=self.attempts {
            let listing = listings.next().unwrap_or(Err(QueryFailed));
            if self.condition.is_satisfied(listing) {
                return VerificationOutcome::Verified {
                    attempt,
                    waited_secs,
                };
            }

            // 最後の試行でなければ待機
            if attempt < self.attempts {
                waited_secs += self.delay_secs;
            }
        }

        VerificationOutcome::TimedOut {
            attempts: self.attempts,
            waited_secs,
        }
    }
}
