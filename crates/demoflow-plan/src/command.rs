//! Typed platform CLI commands
//!
//! Every command the generator can emit is a variant of [`Command`]. Arguments
//! are [`Word`]s so that run-time values (shell variables, the creation
//! timestamp) never get spliced into shell text by hand; [`Word::render`] is
//! the only place that produces quoted shell syntax.

use serde::{Deserialize, Serialize};

/// Piece of a command argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    /// Literal text
    Text(String),
    /// Value of a shell variable set earlier in the script
    Var(String),
    /// Unix timestamp taken when the command runs
    UnixTime,
}

/// Command argument built from fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word(pub Vec<Fragment>);

impl Word {
    pub fn lit(text: impl Into<String>) -> Self {
        Word(vec![Fragment::Text(text.into())])
    }

    pub fn var(name: impl Into<String>) -> Self {
        Word(vec![Fragment::Var(name.into())])
    }

    /// `<prefix>-<unix time>`, unique per run
    pub fn timestamped(prefix: &str) -> Self {
        Word(vec![
            Fragment::Text(format!("{}-", prefix)),
            Fragment::UnixTime,
        ])
    }

    pub fn concat(fragments: Vec<Fragment>) -> Self {
        Word(fragments)
    }

    /// Text of a word made only of literals
    pub fn literal(&self) -> Option<String> {
        self.0
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat())
    }

    /// Shell syntax for this word
    ///
    /// Pure literals are single-quoted (or left bare when they only contain
    /// safe characters); words with run-time parts are double-quoted with
    /// the literal parts escaped.
    pub fn render(&self) -> String {
        if let Some(text) = self.literal() {
            return shell_quote(&text);
        }

        let mut out = String::from("\"");
        for fragment in &self.0 {
            match fragment {
                Fragment::Text(text) => {
                    for c in text.chars() {
                        if matches!(c, '"' | '\\' | '$' | '`') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                }
                Fragment::Var(name) => {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                }
                Fragment::UnixTime => out.push_str("$(date +%s)"),
            }
        }
        out.push('"');
        out
    }
}

impl From<&str> for Word {
    fn from(text: &str) -> Self {
        Word::lit(text)
    }
}

impl From<String> for Word {
    fn from(text: String) -> Self {
        Word::lit(text)
    }
}

/// Quote a literal for the shell
pub fn shell_quote(s: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);
    if !s.is_empty() && s.chars().all(is_safe) {
        return s.to_string();
    }
    // シングルクォートでラップしてエスケープ
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// What a command does to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Create,
    Delete,
    Query,
}

/// Platform CLI command, one variant per verb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Command {
    AuthInfo,
    OrganizationList,
    OrganizationCreate {
        label: String,
        name: Word,
    },
    /// Raw API call for organization types without a dedicated verb
    OrganizationCurl {
        payload: Word,
    },
    OrganizationDelete {
        org: Word,
    },
    OrganizationUserAdd {
        org: Word,
        email: String,
        role: String,
    },
    TeamList {
        org: Word,
    },
    TeamCreate {
        org: Word,
        label: String,
    },
    TeamDelete {
        team: Word,
    },
    UserAdd {
        project: Word,
        email: String,
        role: String,
    },
    UserDelete {
        project: Word,
        email: String,
    },
    ProjectList,
    /// Bare project ids, one per line
    ProjectIds,
    ProjectCreate {
        title: String,
        org: Word,
        region: String,
        init_repo: Option<String>,
    },
    ProjectDelete {
        project: Word,
    },
    EnvironmentActivate {
        project: Word,
        environment: String,
    },
    EnvironmentBranch {
        project: Word,
        environment: String,
        parent: String,
    },
    DomainAdd {
        project: Word,
        domain: String,
        environment: Option<String>,
    },
    CertificateAdd {
        project: Word,
        certificate_file: String,
        key_file: String,
    },
    VariableCreate {
        project: Word,
        environment: Option<String>,
        name: String,
        value: String,
    },
    IntegrationAdd {
        project: Word,
        kind: String,
        options: Vec<(String, String)>,
    },
    BackupCreate {
        project: Word,
        environment: String,
    },
}

impl Command {
    /// CLI verb, e.g. `organization:create`
    pub fn verb(&self) -> &'static str {
        match self {
            Command::AuthInfo => "auth:info",
            Command::OrganizationList => "organization:list",
            Command::OrganizationCreate { .. } => "organization:create",
            Command::OrganizationCurl { .. } => "a:curl",
            Command::OrganizationDelete { .. } => "organization:delete",
            Command::OrganizationUserAdd { .. } => "organization:user:add",
            Command::TeamList { .. } => "team:list",
            Command::TeamCreate { .. } => "team:create",
            Command::TeamDelete { .. } => "team:delete",
            Command::UserAdd { .. } => "user:add",
            Command::UserDelete { .. } => "user:delete",
            Command::ProjectList | Command::ProjectIds => "project:list",
            Command::ProjectCreate { .. } => "project:create",
            Command::ProjectDelete { .. } => "project:delete",
            Command::EnvironmentActivate { .. } => "environment:activate",
            Command::EnvironmentBranch { .. } => "environment:branch",
            Command::DomainAdd { .. } => "domain:add",
            Command::CertificateAdd { .. } => "certificate:add",
            Command::VariableCreate { .. } => "variable:create",
            Command::IntegrationAdd { .. } => "integration:add",
            Command::BackupCreate { .. } => "backup:create",
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            Command::AuthInfo
            | Command::OrganizationList
            | Command::TeamList { .. }
            | Command::ProjectList
            | Command::ProjectIds => Effect::Query,
            Command::OrganizationDelete { .. }
            | Command::TeamDelete { .. }
            | Command::UserDelete { .. }
            | Command::ProjectDelete { .. } => Effect::Delete,
            _ => Effect::Create,
        }
    }

    /// Arguments after the CLI binary, verb first
    pub fn argv(&self) -> Vec<Word> {
        let mut args = Args(vec![Word::lit(self.verb())]);

        match self {
            Command::AuthInfo => {}
            Command::ProjectIds => {
                args.lits(&["--pipe"]);
            }
            Command::OrganizationList | Command::ProjectList => {
                args.lits(&["--format", "plain", "--no-header"]);
            }
            Command::OrganizationCreate { label, name } => {
                args.lits(&["--label", label.as_str(), "--name"])
                    .word(name)
                    .lits(&["--yes"]);
            }
            Command::OrganizationCurl { payload } => {
                args.lits(&[
                    "-X",
                    "POST",
                    "organizations",
                    "-H",
                    "Content-Type: application/json",
                    "-d",
                ])
                .word(payload);
            }
            Command::OrganizationDelete { org } => {
                args.lits(&["--org"]).word(org).lits(&["--yes"]);
            }
            Command::OrganizationUserAdd { org, email, role } => {
                args.lits(&["--org"])
                    .word(org)
                    .lits(&[
                        "--email",
                        email.as_str(),
                        "--role",
                        role.as_str(),
                        "--yes",
                    ]);
            }
            Command::TeamList { org } => {
                args.lits(&["--org"])
                    .word(org)
                    .lits(&["--format", "plain", "--no-header"]);
            }
            Command::TeamCreate { org, label } => {
                args.lits(&["--org"])
                    .word(org)
                    .lits(&["--label", label.as_str(), "--yes"]);
            }
            Command::TeamDelete { team } => {
                args.lits(&["--team"]).word(team).lits(&["--yes"]);
            }
            Command::UserAdd {
                project,
                email,
                role,
            } => {
                args.lits(&[email.as_str(), "--project"])
                    .word(project)
                    .lits(&["--role", role.as_str(), "--yes"]);
            }
            Command::UserDelete { project, email } => {
                args.lits(&[email.as_str(), "--project"])
                    .word(project)
                    .lits(&["--yes"]);
            }
            Command::ProjectCreate {
                title,
                org,
                region,
                init_repo,
            } => {
                args.lits(&["--title", title.as_str(), "--org"])
                    .word(org)
                    .lits(&["--region", region.as_str()]);
                if let Some(repo) = init_repo {
                    args.lits(&["--init-repo", repo.as_str()]);
                }
                args.lits(&["--yes"]);
            }
            Command::ProjectDelete { project } => {
                args.lits(&["--project"]).word(project).lits(&["--yes"]);
            }
            Command::EnvironmentActivate {
                project,
                environment,
            } => {
                args.lits(&["--project"])
                    .word(project)
                    .lits(&["--environment", environment.as_str(), "--yes"]);
            }
            Command::EnvironmentBranch {
                project,
                environment,
                parent,
            } => {
                args.lits(&[environment.as_str(), parent.as_str(), "--project"])
                    .word(project)
                    .lits(&["--yes"]);
            }
            Command::DomainAdd {
                project,
                domain,
                environment,
            } => {
                args.lits(&[domain.as_str(), "--project"]).word(project);
                if let Some(env) = environment {
                    args.lits(&["--environment", env.as_str()]);
                }
                args.lits(&["--yes"]);
            }
            Command::CertificateAdd {
                project,
                certificate_file,
                key_file,
            } => {
                args.lits(&["--project"]).word(project).lits(&[
                    "--certificate-file",
                    certificate_file.as_str(),
                    "--key-file",
                    key_file.as_str(),
                ]);
            }
            Command::VariableCreate {
                project,
                environment,
                name,
                value,
            } => {
                args.lits(&["--project"]).word(project);
                match environment {
                    Some(env) => {
                        args.lits(&["--level", "environment", "--environment", env.as_str()])
                    }
                    None => args.lits(&["--level", "project"]),
                };
                args.lits(&[
                    "--name",
                    name.as_str(),
                    "--value",
                    value.as_str(),
                    "--yes",
                ]);
            }
            Command::IntegrationAdd {
                project,
                kind,
                options,
            } => {
                args.lits(&["--project"])
                    .word(project)
                    .lits(&["--type", kind.as_str()]);
                for (flag, value) in options {
                    let flag = format!("--{}", flag);
                    args.lits(&[flag.as_str(), value.as_str()]);
                }
                args.lits(&["--yes"]);
            }
            Command::BackupCreate {
                project,
                environment,
            } => {
                args.lits(&["--project"])
                    .word(project)
                    .lits(&["--environment", environment.as_str(), "--yes"]);
            }
        }
        args.0
    }

    /// Full shell command line for the given CLI binary
    pub fn render(&self, cli: &str) -> String {
        std::iter::once(shell_quote(cli))
            .chain(self.argv().iter().map(Word::render))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

struct Args(Vec<Word>);

impl Args {
    fn lits(&mut self, items: &[&str]) -> &mut Self {
        self.0.extend(items.iter().map(|item| Word::lit(*item)));
        self
    }

    fn word(&mut self, word: &Word) -> &mut Self {
        self.0.push(word.clone());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("acme-co"), "acme-co");
        assert_eq!(shell_quote("Acme Co"), "'Acme Co'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote("$(rm -rf /)"), "'$(rm -rf /)'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_word_render() {
        assert_eq!(Word::var("org_id").render(), "\"${org_id}\"");
        assert_eq!(
            Word::timestamped("acme-co").render(),
            "\"acme-co-$(date +%s)\""
        );
        let word = Word::concat(vec![
            Fragment::Text("say \"$HOME\" ".to_string()),
            Fragment::Var("x".to_string()),
        ]);
        assert_eq!(word.render(), "\"say \\\"\\$HOME\\\" ${x}\"");
        assert!(word.literal().is_none());
    }

    #[test]
    fn test_flex_organization_create() {
        let cmd = Command::OrganizationCreate {
            label: "Acme".to_string(),
            name: Word::var("unique_name"),
        };
        assert_eq!(
            cmd.render("upsun"),
            "upsun organization:create --label Acme --name \"${unique_name}\" --yes"
        );
        assert_eq!(cmd.effect(), Effect::Create);
    }

    #[test]
    fn test_project_create_with_repo() {
        let cmd = Command::ProjectCreate {
            title: "Demo Shop".to_string(),
            org: Word::var("org_id"),
            region: "eu-5.platform.sh".to_string(),
            init_repo: Some("https://github.com/acme/shop".to_string()),
        };
        assert_eq!(
            cmd.render("upsun"),
            "upsun project:create --title 'Demo Shop' --org \"${org_id}\" --region eu-5.platform.sh --init-repo https://github.com/acme/shop --yes"
        );
    }

    #[test]
    fn test_listing_commands() {
        assert_eq!(
            Command::OrganizationList.render("upsunstg"),
            "upsunstg organization:list --format plain --no-header"
        );
        assert_eq!(Command::ProjectIds.render("upsun"), "upsun project:list --pipe");
        assert_eq!(Command::AuthInfo.render("upsun"), "upsun auth:info");
        assert_eq!(Command::ProjectIds.effect(), Effect::Query);
    }

    #[test]
    fn test_variable_levels() {
        let project = Command::VariableCreate {
            project: Word::var("project_id"),
            environment: None,
            name: "APP_ENV".to_string(),
            value: "demo value".to_string(),
        };
        assert!(project.render("upsun").contains("--level project --name APP_ENV --value 'demo value'"));

        let env = Command::VariableCreate {
            project: Word::var("project_id"),
            environment: Some("staging".to_string()),
            name: "DEBUG".to_string(),
            value: "true".to_string(),
        };
        assert!(env.render("upsun").contains("--level environment --environment staging"));
    }

    #[test]
    fn test_delete_effects() {
        let cmd = Command::OrganizationDelete {
            org: Word::var("org_id"),
        };
        assert_eq!(cmd.effect(), Effect::Delete);
        assert_eq!(
            cmd.render("upsun"),
            "upsun organization:delete --org \"${org_id}\" --yes"
        );
    }
}
