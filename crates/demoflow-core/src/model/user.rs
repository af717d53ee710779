//! User definitions

use serde::{Deserialize, Serialize};

const ADMIN_ROLE: &str = "admin";

/// Environment non-admin project roles are scoped to
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// User invited to the demo ecosystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub role: String,

    #[serde(default)]
    pub team: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Role passed to project invitations
    ///
    /// Admins become project admins; every other role is scoped to the
    /// production environment (`production:<role>`).
    pub fn project_role(&self) -> String {
        if self.is_admin() {
            ADMIN_ROLE.to_string()
        } else {
            format!("{}:{}", PRODUCTION_ENVIRONMENT, self.role.trim())
        }
    }

    /// Role passed to organization invitations
    pub fn organization_role(&self) -> &'static str {
        if self.is_admin() { ADMIN_ROLE } else { "member" }
    }
}
