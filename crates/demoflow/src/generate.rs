use crate::Cli;
use crate::output::{cleanup_path, setup_path, write_script};
use anyhow::Context;
use colored::Colorize;
use demoflow_plan::{
    Plan, Profile, ScriptOptions, SetupOptions, build_cleanup_plan, build_setup_plan,
    render_script,
};
use std::path::PathBuf;
use tracing::info;

/// プロファイルを決定し、CLI / リージョンの上書きを適用
fn resolve_profile(cli: &Cli) -> anyhow::Result<Profile> {
    let mut profile = Profile::by_name(&cli.profile)?;
    if let Some(binary) = &cli.cli {
        profile = profile.with_cli(binary)?;
    }
    if let Some(region) = &cli.region {
        profile = profile.with_region(region)?;
    }
    Ok(profile)
}

pub fn handle(cli: &Cli) -> anyhow::Result<()> {
    let topology = demoflow_core::load_topology(&cli.config)
        .with_context(|| format!("設定ファイルを読み込めません: {}", cli.config.display()))?;
    let profile = resolve_profile(cli)?;
    info!(profile = %profile.name, cli = %profile.cli, "Profile resolved");

    let mut plans: Vec<(Plan, PathBuf)> = Vec::new();
    if cli.action.includes_setup() {
        let plan = build_setup_plan(
            &topology,
            &profile,
            SetupOptions {
                create_dirs: cli.create_dirs,
            },
        );
        plans.push((plan, setup_path(cli.output.as_deref())));
    }
    if cli.action.includes_cleanup() {
        let plan = build_cleanup_plan(&topology, &profile);
        plans.push((plan, cleanup_path(cli.output.as_deref())));
    }

    if cli.print_plan {
        let plans: Vec<&Plan> = plans.iter().map(|(plan, _)| plan).collect();
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    println!("{}", "デモ環境スクリプトを生成中...".blue());
    println!("  設定ファイル: {}", cli.config.display().to_string().cyan());
    println!(
        "  プロファイル: {} (CLI: {}, リージョン: {})",
        profile.name.cyan(),
        profile.cli,
        profile.region
    );
    println!(
        "  組織: {}個, チーム: {}個, ユーザー: {}個, プロジェクト: {}個",
        topology.organizations.len(),
        topology.teams.len(),
        topology.users.len(),
        topology.projects.len()
    );
    println!();

    let options = ScriptOptions {
        source: cli
            .config
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
    };
    for (plan, path) in &plans {
        let script = render_script(plan, &options);
        write_script(path, &script)?;
        println!(
            "{} {} スクリプトを書き出しました: {}",
            "✓".green().bold(),
            plan.kind,
            path.display().to_string().cyan()
        );
        println!("    {}", plan.summary());
    }

    Ok(())
}
