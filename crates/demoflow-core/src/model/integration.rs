//! Third-party integration definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integration type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntegrationKind {
    Github,
    NewRelic,
    Datadog,
    Other(String),
}

impl From<String> for IntegrationKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "github" => IntegrationKind::Github,
            "newrelic" => IntegrationKind::NewRelic,
            "datadog" => IntegrationKind::Datadog,
            _ => IntegrationKind::Other(value),
        }
    }
}

impl From<IntegrationKind> for String {
    fn from(kind: IntegrationKind) -> Self {
        kind.to_string()
    }
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationKind::Github => write!(f, "github"),
            IntegrationKind::NewRelic => write!(f, "newrelic"),
            IntegrationKind::Datadog => write!(f, "datadog"),
            IntegrationKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Integration with type-specific options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    #[serde(rename = "type")]
    pub kind: IntegrationKind,

    /// Remaining fields, passed through as CLI options
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Integration {
    /// Option rendered as text (strings verbatim, other scalars as JSON)
    pub fn option(&self, key: &str) -> Option<String> {
        self.options.get(key).map(value_to_text)
    }

    /// Options other than `exclude`, as `(flag-name, value)` pairs
    pub fn flags_except<'a>(
        &'a self,
        exclude: &'a [&'a str],
    ) -> impl Iterator<Item = (String, String)> + 'a {
        self.options
            .iter()
            .filter(move |(key, _)| !exclude.contains(&key.as_str()))
            .map(|(key, value)| (key.replace('_', "-"), value_to_text(value)))
    }
}

/// Render a scalar document value as command-line text
pub fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
