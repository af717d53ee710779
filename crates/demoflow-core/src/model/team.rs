//! Team definitions

use serde::{Deserialize, Serialize};

/// Team inside an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display title, used as the existence key
    pub title: String,

    pub name: String,

    /// Owning organization reference; the default organization when unset
    #[serde(default)]
    pub organization: Option<String>,
}
