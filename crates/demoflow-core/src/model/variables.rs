//! Environment variable definitions

use super::integration::value_to_text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variables applied to every project or to one environment name
///
/// ```json
/// "environment_variables": {
///     "global": { "APP_NAME": "demo" },
///     "production": { "DEBUG": false }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariables {
    #[serde(default)]
    pub global: BTreeMap<String, serde_json::Value>,

    /// Any other key names an environment
    #[serde(flatten)]
    pub per_environment: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl EnvironmentVariables {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_environment.values().all(BTreeMap::is_empty)
    }

    /// Global variables as `(name, value)` text pairs
    pub fn global_pairs(&self) -> Vec<(String, String)> {
        to_pairs(&self.global)
    }

    /// Variables scoped to `environment`
    pub fn environment_pairs(&self, environment: &str) -> Vec<(String, String)> {
        self.per_environment
            .get(environment)
            .map(to_pairs)
            .unwrap_or_default()
    }
}

fn to_pairs(map: &BTreeMap<String, serde_json::Value>) -> Vec<(String, String)> {
    map.iter()
        .map(|(name, value)| (name.clone(), value_to_text(value)))
        .collect()
}
