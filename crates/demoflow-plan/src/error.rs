//! Plan generation error types

use thiserror::Error;

/// Plan generation errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Unknown profile: {0} (expected 'staging' or 'production')")]
    UnknownProfile(String),

    #[error("Invalid profile setting: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
