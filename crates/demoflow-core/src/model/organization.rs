//! Organization (tenant) definitions

use serde::{Deserialize, Serialize};

/// Billing tier of an organization
///
/// The two tiers are created through different platform verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Fixed,
    Flex,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Fixed => write!(f, "fixed"),
            Tier::Flex => write!(f, "flex"),
        }
    }
}

/// Organization as declared in the topology document
///
/// The tier is not part of the serialized entry; it comes from the
/// `organizations.fixed` / `organizations.flex` group the entry sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Human-facing identity, matched against the platform listing
    pub label: String,

    /// Machine identifier (slugified and timestamped at creation)
    pub name: String,

    #[serde(skip, default = "default_tier")]
    pub tier: Tier,
}

fn default_tier() -> Tier {
    Tier::Flex
}

impl Organization {
    pub fn new(label: impl Into<String>, name: impl Into<String>, tier: Tier) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            tier,
        }
    }

    /// Slug used as the prefix of the unique creation name
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Whether `reference` designates this organization
    ///
    /// Projects and teams may refer to an organization by label, by name,
    /// or by the slug of its name. Comparison ignores case.
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        let reference = reference.trim();
        self.label.eq_ignore_ascii_case(reference)
            || self.name.eq_ignore_ascii_case(reference)
            || self.slug() == slugify(reference)
    }
}

/// Organizations grouped by tier, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizations {
    #[serde(default)]
    pub fixed: Vec<Organization>,

    #[serde(default)]
    pub flex: Vec<Organization>,
}

impl Organizations {
    /// Stamp each entry with the tier of its group
    pub(crate) fn assign_tiers(&mut self) {
        for org in &mut self.fixed {
            org.tier = Tier::Fixed;
        }
        for org in &mut self.flex {
            org.tier = Tier::Flex;
        }
    }

    /// All organizations, fixed first
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.fixed.iter().chain(self.flex.iter())
    }

    pub fn len(&self) -> usize {
        self.fixed.len() + self.flex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty() && self.flex.is_empty()
    }

    /// Default organization for resources without an explicit one
    ///
    /// The first flex organization wins, then the first fixed one.
    pub fn default_organization(&self) -> Option<&Organization> {
        self.flex.first().or_else(|| self.fixed.first())
    }

    /// Resolve a reference (label, name or slug) to a declared organization
    pub fn resolve(&self, reference: &str) -> Option<&Organization> {
        self.iter().find(|org| org.is_referenced_by(reference))
    }
}

/// Lower-case the string and replace whitespace runs with `-`
pub fn slugify(value: &str) -> String {
    value
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
