//! Project-scoped phases
//!
//! Everything after project creation works on a project resolved by title.
//! A project that cannot be found is skipped with a warning.

use super::{PROJECT_ID, per_project};
use crate::command::{Command, Word};
use crate::step::{OnFailure, Phase, PhaseKind, Step};
use demoflow_core::{Integration, IntegrationKind, PRODUCTION_ENVIRONMENT, Project, Topology};

fn project() -> Word {
    Word::var(PROJECT_ID)
}

fn warn(command: Command) -> Step {
    Step::run(command, OnFailure::WarnAndContinue)
}

/// Activate production, branch every other environment from it
pub fn environments(topology: &Topology) -> Phase {
    per_project(PhaseKind::Environments, &topology.projects, |p| {
        p.environments
            .iter()
            .map(|env| {
                if env == PRODUCTION_ENVIRONMENT {
                    warn(Command::EnvironmentActivate {
                        project: project(),
                        environment: env.clone(),
                    })
                } else {
                    warn(Command::EnvironmentBranch {
                        project: project(),
                        environment: env.clone(),
                        parent: PRODUCTION_ENVIRONMENT.to_string(),
                    })
                }
            })
            .collect()
    })
}

pub fn domains(topology: &Topology) -> Phase {
    per_project(PhaseKind::Domains, &topology.projects, |p| {
        p.domains
            .iter()
            .flat_map(|(env, domains)| {
                let environment = (env != PRODUCTION_ENVIRONMENT).then(|| env.clone());
                domains.iter().map(move |domain| {
                    warn(Command::DomainAdd {
                        project: project(),
                        domain: domain.clone(),
                        environment: environment.clone(),
                    })
                })
            })
            .collect()
    })
}

/// One certificate per production domain, read from `<domain-with-dashes>.crt/.key`
pub fn certificates(topology: &Topology) -> Phase {
    per_project(PhaseKind::Certificates, &topology.projects, |p| {
        p.certificates()
            .into_iter()
            .map(|cert| {
                warn(Command::CertificateAdd {
                    project: project(),
                    certificate_file: cert.certificate_file(),
                    key_file: cert.key_file(),
                })
            })
            .collect()
    })
}

/// Global variables on every project, then per-environment ones
pub fn variables(topology: &Topology) -> Phase {
    let vars = &topology.environment_variables;
    per_project(PhaseKind::Variables, &topology.projects, |p| {
        let global = vars.global_pairs().into_iter().map(|(name, value)| {
            warn(Command::VariableCreate {
                project: project(),
                environment: None,
                name,
                value,
            })
        });
        let scoped = p.environments.iter().flat_map(|env| {
            vars.environment_pairs(env)
                .into_iter()
                .map(move |(name, value)| {
                    warn(Command::VariableCreate {
                        project: project(),
                        environment: Some(env.clone()),
                        name,
                        value,
                    })
                })
        });
        global.chain(scoped).collect()
    })
}

pub fn integrations(topology: &Topology) -> Phase {
    per_project(PhaseKind::Integrations, &topology.projects, |p| {
        topology
            .integrations_for(p)
            .map(|integration| integration_step(p, integration))
            .collect()
    })
}

fn integration_step(project: &Project, integration: &Integration) -> Step {
    let kind = integration.kind.to_string();
    let options = match &integration.kind {
        IntegrationKind::Github => {
            let repository = integration
                .option("repository")
                .or_else(|| project.github_repository().map(str::to_string));
            let Some(repository) = repository else {
                return Step::note([format!(
                    "GitHub integration for {} skipped: no repository",
                    project.title
                )]);
            };
            std::iter::once(("repository".to_string(), repository))
                .chain(integration.flags_except(&["repository"]))
                .collect()
        }
        IntegrationKind::NewRelic | IntegrationKind::Datadog => {
            let Some(api_key) = integration.option("api_key") else {
                return Step::note([format!(
                    "{} integration for {} skipped: no api_key",
                    kind, project.title
                )]);
            };
            std::iter::once(("api-key".to_string(), api_key))
                .chain(integration.flags_except(&["api_key"]))
                .collect()
        }
        IntegrationKind::Other(_) => integration.flags_except(&[]).collect(),
    };

    warn(Command::IntegrationAdd {
        project: Word::var(PROJECT_ID),
        kind,
        options,
    })
}

/// Back up the primary environment
pub fn backups(topology: &Topology) -> Phase {
    per_project(PhaseKind::Backups, &topology.projects, |p| {
        p.primary_environment()
            .map(|env| {
                warn(Command::BackupCreate {
                    project: project(),
                    environment: env.to_string(),
                })
            })
            .into_iter()
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Action;
    use demoflow_core::parse_topology_json;

    fn topology() -> Topology {
        parse_topology_json(
            r#"{
                "organizations": {"flex": [{"label": "Acme", "name": "acme"}]},
                "projects": [
                    {
                        "name": "shop",
                        "title": "Shop",
                        "organization": "Acme",
                        "source": {"type": "github", "repository": "https://github.com/acme/shop"},
                        "environments": ["production", "staging"],
                        "domains": {
                            "production": ["shop.example.com"],
                            "staging": ["staging.shop.example.com"]
                        },
                        "integrations": [{"type": "datadog"}]
                    },
                    {"name": "empty", "title": "Empty", "organization": "Acme"}
                ],
                "environment_variables": {
                    "global": {"APP_NAME": "demo"},
                    "staging": {"DEBUG": true}
                },
                "integrations": [
                    {"type": "github"},
                    {"type": "newrelic", "api_key": "nr-123", "app_name": "shop"}
                ]
            }"#,
        )
        .unwrap()
    }

    fn inner(phase: &Phase, index: usize) -> &[Step] {
        match &phase.steps[index].action {
            Action::Resolve { lookup, then } => {
                assert_eq!(lookup.var, PROJECT_ID);
                then
            }
            other => panic!("Expected project lookup, got {other:?}"),
        }
    }

    fn verbs(steps: &[Step]) -> Vec<String> {
        steps
            .iter()
            .map(|step| match &step.action {
                Action::Run { command } => command.verb().to_string(),
                Action::Note { .. } => "note".to_string(),
                other => panic!("Unexpected action {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_environments() {
        let phase = environments(&topology());
        // the project without environments has nothing to do
        assert_eq!(phase.steps.len(), 1);
        assert_eq!(
            verbs(inner(&phase, 0)),
            vec!["environment:activate", "environment:branch"]
        );
    }

    #[test]
    fn test_domains_scope_non_production() {
        let phase = domains(&topology());
        let steps = inner(&phase, 0);
        assert_eq!(steps.len(), 2);
        let Action::Run {
            command: Command::DomainAdd { environment, .. },
        } = &steps[1].action
        else {
            panic!("Expected domain:add");
        };
        assert_eq!(environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_certificates_from_production_domains() {
        let phase = certificates(&topology());
        let steps = inner(&phase, 0);
        assert_eq!(
            steps[0].action,
            Action::Run {
                command: Command::CertificateAdd {
                    project: Word::var(PROJECT_ID),
                    certificate_file: "shop-example-com.crt".to_string(),
                    key_file: "shop-example-com.key".to_string(),
                }
            }
        );
    }

    #[test]
    fn test_variables_global_then_environment() {
        let phase = variables(&topology());
        // both projects get the global variable
        assert_eq!(phase.steps.len(), 2);
        assert_eq!(inner(&phase, 0).len(), 2);
        assert_eq!(inner(&phase, 1).len(), 1);
    }

    #[test]
    fn test_integrations() {
        let phase = integrations(&topology());
        let shop = inner(&phase, 0);
        assert_eq!(verbs(shop), vec!["integration:add", "integration:add", "note"]);

        let Action::Run {
            command: Command::IntegrationAdd { options, .. },
        } = &shop[1].action
        else {
            panic!("Expected integration:add");
        };
        assert_eq!(
            options,
            &vec![
                ("api-key".to_string(), "nr-123".to_string()),
                ("app-name".to_string(), "shop".to_string()),
            ]
        );

        // no GitHub source and no repository option
        let empty = inner(&phase, 1);
        assert_eq!(verbs(empty), vec!["note", "integration:add"]);
    }

    #[test]
    fn test_backups_primary_environment() {
        let phase = backups(&topology());
        assert_eq!(phase.steps.len(), 1);
        assert_eq!(verbs(inner(&phase, 0)), vec!["backup:create"]);
    }
}
