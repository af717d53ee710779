//! demoflow core
//!
//! Topology model of a multi-tenant demo ecosystem (organizations, teams,
//! users, projects, variables, integrations) and the loader that reads it
//! from a JSON or YAML document.

pub mod error;
pub mod loader;
pub mod model;

pub use error::{Result, TopologyError};
pub use loader::{
    DocumentFormat, load_topology, parse_topology_json, parse_topology_yaml, validate,
};
pub use model::*;
