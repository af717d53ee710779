//! Topology - the whole demo ecosystem

use super::integration::Integration;
use super::organization::{Organization, Organizations};
use super::project::Project;
use super::team::Team;
use super::user::User;
use super::variables::EnvironmentVariables;
use serde::{Deserialize, Serialize};

/// Declarative description of a demo ecosystem
///
/// Every top-level key is optional and defaults to an empty collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub organizations: Organizations,

    #[serde(default)]
    pub teams: Vec<Team>,

    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub environment_variables: EnvironmentVariables,

    /// Integrations attached to every project
    #[serde(default)]
    pub integrations: Vec<Integration>,
}

impl Topology {
    /// Organization owning `project`
    pub fn organization_of(&self, project: &Project) -> Option<&Organization> {
        self.organizations.resolve(&project.organization)
    }

    /// Organization owning `team`, falling back to the default organization
    pub fn organization_of_team(&self, team: &Team) -> Option<&Organization> {
        match &team.organization {
            Some(reference) => self.organizations.resolve(reference),
            None => self.organizations.default_organization(),
        }
    }

    /// Integrations that apply to `project`: global ones first, then its own
    pub fn integrations_for<'a>(
        &'a self,
        project: &'a Project,
    ) -> impl Iterator<Item = &'a Integration> + 'a {
        self.integrations.iter().chain(project.integrations.iter())
    }
}
