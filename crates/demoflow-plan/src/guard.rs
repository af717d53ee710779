//! Existence guards
//!
//! Every create step is preceded by a guard that lists the resources of one
//! kind and looks for a row whose label matches the declared key. The guard
//! logic lives here so that it can be reasoned about (and tested) without a
//! shell; the script renderer emits the equivalent shell helpers.

use crate::command::{Command, Word};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of platform resource a guard inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Organization,
    Team,
    Project,
}

impl ResourceKind {
    /// Listing whose rows start with the resource id, followed by its label
    ///
    /// Teams are listed per organization, so they need a `scope`.
    pub fn listing(self, scope: Option<&Word>) -> Command {
        match self {
            ResourceKind::Organization => Command::OrganizationList,
            ResourceKind::Project => Command::ProjectList,
            ResourceKind::Team => Command::TeamList {
                org: scope.cloned().unwrap_or_else(|| Word::var("org_id")),
            },
        }
    }

    /// Whether an unverifiable guard on this kind must stop the run
    ///
    /// Everything downstream depends on organizations, so an organization
    /// that cannot be confirmed is fatal; other kinds degrade to a warning.
    pub fn is_hard_stop(self) -> bool {
        matches!(self, ResourceKind::Organization)
    }

    /// Plural noun used in messages
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Organization => "organizations",
            ResourceKind::Team => "teams",
            ResourceKind::Project => "projects",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Organization => write!(f, "Organization"),
            ResourceKind::Team => write!(f, "Team"),
            ResourceKind::Project => write!(f, "Project"),
        }
    }
}

/// A listing query that could not be run
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("listing query failed")]
pub struct QueryFailed;

/// Result of evaluating a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Existence {
    Present,
    Absent,
    /// The listing query itself failed
    Unknown,
}

/// Collapse whitespace and fold ASCII case
///
/// Only ASCII letters are folded, matching the byte-wise comparison the
/// generated script runs. `Ökosystem` and `ökosystem` stay distinct.
pub fn normalize_label(label: &str) -> String {
    label
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Label text of a listing row: every column after the id
fn row_label(row: &str) -> Option<(&str, String)> {
    let mut columns = row.split_ascii_whitespace();
    let id = columns.next()?;
    let label = columns.collect::<Vec<_>>().join(" ").to_ascii_lowercase();
    Some((id, label))
}

/// Id of the first row whose label contains `key`
pub fn find_id<'a>(listing: &'a str, key: &str) -> Option<&'a str> {
    let key = normalize_label(key);
    listing
        .lines()
        .filter_map(row_label)
        .find(|(_, label)| label.contains(&key))
        .map(|(id, _)| id)
}

/// Number of non-empty rows in a listing
pub fn count_rows(listing: &str) -> usize {
    listing
        .lines()
        .filter(|line| !line.trim_ascii().is_empty())
        .count()
}

/// Existence check run before creating a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub kind: ResourceKind,
    /// Declared label, compared after normalization
    pub key: String,
    /// Parent resource the listing is scoped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Word>,
}

impl Guard {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            scope: None,
        }
    }

    pub fn scoped(kind: ResourceKind, key: impl Into<String>, scope: Word) -> Self {
        Self {
            kind,
            key: key.into(),
            scope: Some(scope),
        }
    }

    pub fn normalized_key(&self) -> String {
        normalize_label(&self.key)
    }

    pub fn listing(&self) -> Command {
        self.kind.listing(self.scope.as_ref())
    }

    /// Decide existence from the listing query's output
    pub fn evaluate(&self, listing: Result<&str, QueryFailed>) -> Existence {
        match listing {
            Err(QueryFailed) => Existence::Unknown,
            Ok(rows) if find_id(rows, &self.key).is_some() => Existence::Present,
            Ok(_) => Existence::Absent,
        }
    }
}

/// Resolution of a resource id by label, stored in a shell variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub kind: ResourceKind,
    pub label: String,
    /// Shell variable receiving the id
    pub var: String,
    /// A missing resource stops the run when true
    pub required: bool,
}

impl Lookup {
    pub fn required(kind: ResourceKind, label: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            var: var.into(),
            required: true,
        }
    }

    pub fn optional(kind: ResourceKind, label: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            var: var.into(),
            required: false,
        }
    }

    pub fn listing(&self) -> Command {
        self.kind.listing(None)
    }

    /// Resolve the id from a listing; a failed query resolves to nothing
    pub fn resolve<'a>(&self, listing: Result<&'a str, QueryFailed>) -> Option<&'a str> {
        listing.ok().and_then(|rows| find_id(rows, &self.label))
    }
}
