//! Plan generation tests over whole topologies

use demoflow_core::{Topology, load_topology, parse_topology_json};
use demoflow_plan::{
    Action, Condition, PROTECTED_ORGANIZATION_ID, PhaseKind, Plan, Profile, ResourceKind,
    ScriptOptions, SetupOptions, Step, build_cleanup_plan, build_setup_plan, normalize_label,
    render_script,
};
use std::io::Write;

const ACME_DEMO: &str = r#"{
    "organizations": {"flex": [{"label": "Acme", "name": "Acme Co"}]},
    "projects": [
        {"title": "Demo", "organization": "Acme", "environments": ["production"]}
    ]
}"#;

fn setup(topology: &Topology, profile: &Profile) -> Plan {
    build_setup_plan(topology, profile, SetupOptions::default())
}

fn organization_loop_exclusions(plan: &Plan) -> Vec<String> {
    let phase = plan.phase(PhaseKind::OrganizationDeletion).unwrap();
    match &phase.steps[0].action {
        Action::ForEach(each) => each.exclude.clone(),
        other => panic!("Expected organization loop, got {other:?}"),
    }
}

#[test]
fn test_acme_demo_setup() {
    let topology = parse_topology_json(ACME_DEMO).unwrap();
    let plan = setup(&topology, &Profile::production());

    // organization create is guarded
    let orgs = plan.phase(PhaseKind::Organizations).unwrap();
    let Action::Create(create) = &orgs.steps[0].action else {
        panic!("Expected guarded organization create");
    };
    assert_eq!(create.guard.kind, ResourceKind::Organization);
    assert_eq!(create.guard.normalized_key(), "acme");

    // verification lists exactly one label
    let verification = plan.phase(PhaseKind::OrganizationVerification).unwrap();
    let Action::Verify(verify) = &verification.steps[0].action else {
        panic!("Expected verification loop");
    };
    let Condition::LabelsListed { labels, .. } = &verify.condition else {
        panic!("Expected label condition");
    };
    assert_eq!(labels.len(), 1);
    assert_eq!(normalize_label(&labels[0]), "acme");

    // project create looks its organization up by label
    let projects = plan.phase(PhaseKind::Projects).unwrap();
    let Action::Create(create) = &projects.steps[0].action else {
        panic!("Expected guarded project create");
    };
    let lookup = create.requires.as_ref().unwrap();
    assert_eq!(lookup.kind, ResourceKind::Organization);
    assert_eq!(lookup.label, "Acme");

    // teams and users are comments only
    assert!(plan.phase(PhaseKind::Teams).unwrap().is_notes_only());
    assert!(plan.phase(PhaseKind::UserInvitations).unwrap().is_notes_only());

    let script = render_script(&plan, &ScriptOptions::default());
    assert!(script.contains("has_all_labels \"$listing\" acme; then"));
}

#[test]
fn test_acme_demo_cleanup_order() {
    let topology = parse_topology_json(ACME_DEMO).unwrap();
    let plan = build_cleanup_plan(&topology, &Profile::production());
    let script = render_script(&plan, &ScriptOptions::default());

    let project_delete = script.find("upsun project:delete").unwrap();
    let organization_delete = script.find("upsun organization:delete").unwrap();
    assert!(project_delete < organization_delete);

    let drain = script.find("for attempt in $(seq 1 5); do").unwrap();
    assert!(project_delete < drain && drain < organization_delete);
}

#[test]
fn test_every_organization_is_guarded() {
    let topology = parse_topology_json(
        r#"{
            "organizations": {
                "fixed": [{"label": "Big Corp", "name": "big-corp"}, {"label": "Initech", "name": "initech"}],
                "flex": [{"label": "Acme", "name": "Acme Co"}]
            }
        }"#,
    )
    .unwrap();

    for profile in [Profile::staging(), Profile::production()] {
        let plan = setup(&topology, &profile);
        let script = render_script(&plan, &ScriptOptions::default());

        for org in topology.organizations.iter() {
            let key = demoflow_plan::shell_quote(&normalize_label(&org.label));
            let guard = script
                .find(&format!("existence=$(check_existence {} ", key))
                .unwrap_or_else(|| panic!("No guard for {}", org.label));
            let create = script
                .find(&format!("\"label\\\": \\\"{}\\\"", org.label))
                .or_else(|| script.find(&format!("--label {}", demoflow_plan::shell_quote(&org.label))))
                .unwrap_or_else(|| panic!("No create for {}", org.label));
            assert!(guard < create, "{} created before its guard", org.label);
        }

        // no create step without a guard anywhere in the plan
        for step in plan.steps() {
            if let Action::Run { command } = &step.action {
                assert_ne!(command.verb(), "organization:create");
                assert_ne!(command.verb(), "a:curl");
            }
        }
    }
}

#[test]
fn test_protected_organization_always_excluded() {
    let topologies = [
        Topology::default(),
        parse_topology_json(ACME_DEMO).unwrap(),
        parse_topology_json(r#"{"users": [{"name": "Ada", "email": "ada@example.com", "role": "admin"}]}"#)
            .unwrap(),
    ];

    for topology in &topologies {
        for profile in [Profile::staging(), Profile::production()] {
            let plan = build_cleanup_plan(topology, &profile);
            assert_eq!(
                organization_loop_exclusions(&plan),
                vec![PROTECTED_ORGANIZATION_ID.to_string()]
            );
            let script = render_script(&plan, &ScriptOptions::default());
            assert!(script.contains(&format!("= {} ]; then", PROTECTED_ORGANIZATION_ID)));
        }
    }
}

#[test]
fn test_generation_is_byte_identical() {
    let topology = parse_topology_json(ACME_DEMO).unwrap();
    let options = ScriptOptions {
        source: Some("demo-config.json".to_string()),
    };
    for profile in [Profile::staging(), Profile::production()] {
        let first = render_script(&setup(&topology, &profile), &options);
        let second = render_script(&setup(&topology, &profile), &options);
        assert_eq!(first, second);

        let first = render_script(&build_cleanup_plan(&topology, &profile), &options);
        let second = render_script(&build_cleanup_plan(&topology, &profile), &options);
        assert_eq!(first, second);
    }
}

#[test]
fn test_zero_projects_means_no_user_commands() {
    let topology = parse_topology_json(
        r#"{
            "organizations": {"flex": [{"label": "Acme", "name": "Acme Co"}]},
            "users": [
                {"name": "Ada", "email": "ada@example.com", "role": "admin"},
                {"name": "Bob", "email": "bob@example.com", "role": "viewer"}
            ]
        }"#,
    )
    .unwrap();

    let plan = setup(&topology, &Profile::staging());
    let invitations = plan.phase(PhaseKind::UserInvitations).unwrap();
    assert!(invitations.steps.iter().all(Step::is_note));
    assert!(plan.commands_with_verb("user:add").is_empty());
    assert!(plan.commands_with_verb("user:delete").is_empty());
    assert!(plan.commands_with_verb("organization:user:add").is_empty());
}

#[test]
fn test_github_path_adds_followup_note() {
    let with_path = parse_topology_json(
        r#"{
            "organizations": {"flex": [{"label": "Acme", "name": "Acme Co"}]},
            "projects": [{
                "name": "web", "title": "Web", "organization": "Acme",
                "source": {"type": "github", "repository": "https://github.com/acme/mono", "path": "apps/web"}
            }]
        }"#,
    )
    .unwrap();
    let script = render_script(
        &setup(&with_path, &Profile::production()),
        &ScriptOptions::default(),
    );
    assert!(script.contains("--init-repo https://github.com/acme/mono --yes"));
    assert!(script.contains("manual configuration may be required"));

    let without_path = parse_topology_json(
        r#"{
            "organizations": {"flex": [{"label": "Acme", "name": "Acme Co"}]},
            "projects": [{
                "name": "web", "title": "Web", "organization": "Acme",
                "source": {"type": "github", "repository": "https://github.com/acme/web"}
            }]
        }"#,
    )
    .unwrap();
    let script = render_script(
        &setup(&without_path, &Profile::production()),
        &ScriptOptions::default(),
    );
    assert!(script.contains("--init-repo https://github.com/acme/web --yes"));
    assert!(!script.contains("manual configuration may be required"));
}

#[test]
fn test_staging_runs_every_phase() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        r#"
organizations:
  flex:
    - label: Acme
      name: Acme Co
teams:
  - title: Ops
    name: ops
users:
  - name: Ada
    email: ada@example.com
    role: admin
projects:
  - name: demo
    title: Demo
    organization: Acme
    source:
      type: github
      repository: https://github.com/acme/demo
    environments: [production, staging]
    domains:
      production: [demo.example.com]
environment_variables:
  global:
    APP_NAME: demo
integrations:
  - type: github
"#
    )
    .unwrap();

    let topology = load_topology(file.path()).unwrap();
    let plan = setup(&topology, &Profile::staging());

    for verb in [
        "team:create",
        "organization:user:add",
        "user:add",
        "project:create",
        "environment:activate",
        "environment:branch",
        "domain:add",
        "certificate:add",
        "variable:create",
        "integration:add",
        "backup:create",
    ] {
        assert!(
            !plan.commands_with_verb(verb).is_empty(),
            "missing {verb}"
        );
    }

    let script = render_script(&plan, &ScriptOptions::default());
    assert!(script.contains("upsunstg project:create --title Demo --org \"${org_id}\" --region plc.recreation.plat.farm"));
    assert!(script.contains("upsunstg certificate:add --project \"${project_id}\" --certificate-file demo-example-com.crt --key-file demo-example-com.key"));
}
