//! Deployment profiles
//!
//! A profile bundles everything that differs between the staging and
//! production platforms: the CLI binary, the region, which optional phases
//! run and how long the verification loops wait.

use crate::error::{PlanError, Result};
use crate::step::PhaseKind;
use demoflow_core::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Organization that is never deleted by a cleanup plan
pub const PROTECTED_ORGANIZATION_ID: &str = "01k4606e9hqxyxdn2ph0k06ee1";

/// Bounded polling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_secs: 10,
        }
    }
}

/// Pause after each organization create, per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub fixed_secs: u64,
    pub flex_secs: u64,
}

impl RateLimit {
    pub fn pause_for(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Fixed => self.fixed_secs,
            Tier::Flex => self.flex_secs,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            fixed_secs: 10,
            flex_secs: 15,
        }
    }
}

/// Phases a profile may switch off
pub const OPTIONAL_PHASES: [PhaseKind; 7] = [
    PhaseKind::Teams,
    PhaseKind::Environments,
    PhaseKind::Domains,
    PhaseKind::Certificates,
    PhaseKind::Variables,
    PhaseKind::Integrations,
    PhaseKind::Backups,
];

/// Parameters the plan builders are generic over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// CLI binary every command is run with
    pub cli: String,
    pub region: String,
    /// Optional phases that run; the others are replaced by notes
    pub enabled_phases: BTreeSet<PhaseKind>,
    pub organization_verification: RetryConfig,
    pub project_drain: RetryConfig,
    pub rate_limit: RateLimit,
    /// Organization ids cleanup never deletes
    pub protected_organizations: Vec<String>,
}

impl Profile {
    /// Staging platform: every phase enabled
    pub fn staging() -> Self {
        Self {
            name: "staging".to_string(),
            cli: "upsunstg".to_string(),
            region: "plc.recreation.plat.farm".to_string(),
            enabled_phases: OPTIONAL_PHASES.into_iter().collect(),
            organization_verification: RetryConfig {
                max_attempts: 5,
                delay_secs: 10,
            },
            project_drain: RetryConfig::default(),
            rate_limit: RateLimit::default(),
            protected_organizations: vec![PROTECTED_ORGANIZATION_ID.to_string()],
        }
    }

    /// Production platform: only integrations among the optional phases
    pub fn production() -> Self {
        Self {
            name: "production".to_string(),
            cli: "upsun".to_string(),
            region: "eu-5.platform.sh".to_string(),
            enabled_phases: [PhaseKind::Integrations].into_iter().collect(),
            organization_verification: RetryConfig {
                max_attempts: 3,
                delay_secs: 10,
            },
            project_drain: RetryConfig::default(),
            rate_limit: RateLimit::default(),
            protected_organizations: vec![PROTECTED_ORGANIZATION_ID.to_string()],
        }
    }

    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "staging" | "stg" => Ok(Self::staging()),
            "production" | "prod" => Ok(Self::production()),
            _ => Err(PlanError::UnknownProfile(name.to_string())),
        }
    }

    /// Replace the CLI binary
    pub fn with_cli(mut self, cli: &str) -> Result<Self> {
        let cli = cli.trim();
        if cli.is_empty() || cli.chars().any(char::is_whitespace) {
            return Err(PlanError::InvalidProfile(format!(
                "CLI binary must be a single word, got '{}'",
                cli
            )));
        }
        self.cli = cli.to_string();
        Ok(self)
    }

    /// Replace the project region
    pub fn with_region(mut self, region: &str) -> Result<Self> {
        let region = region.trim();
        if region.is_empty() {
            return Err(PlanError::InvalidProfile(
                "region must not be empty".to_string(),
            ));
        }
        self.region = region.to_string();
        Ok(self)
    }

    /// Whether a phase runs; mandatory phases always do
    pub fn enables(&self, phase: PhaseKind) -> bool {
        !OPTIONAL_PHASES.contains(&phase) || self.enabled_phases.contains(&phase)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::production()
    }
}

impl FromStr for Profile {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::by_name(s)
    }
}
