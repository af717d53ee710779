mod generate;
mod output;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "demoflow", version)]
#[command(about = "デモ環境の構築・削除スクリプトを生成します", long_about = None)]
pub struct Cli {
    /// トポロジー定義ファイル (JSON / YAML)
    #[arg(short, long, env = "DEMOFLOW_CONFIG", default_value = "demo-config.json")]
    pub config: PathBuf,

    /// 生成するスクリプト
    #[arg(short, long, value_enum, default_value_t = ScriptAction::Both)]
    pub action: ScriptAction,

    /// setup スクリプトの出力先 (cleanup は末尾の .sh を -cleanup.sh に置き換えたパス)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// ローカルのプロジェクトディレクトリを作成するステップを追加
    #[arg(long)]
    pub create_dirs: bool,

    /// プロファイル (staging / production)
    #[arg(short, long, env = "DEMOFLOW_PROFILE", default_value = "production")]
    pub profile: String,

    /// プラットフォーム CLI のコマンド名 (プロファイルの既定値を上書き)
    #[arg(long, env = "DEMOFLOW_CLI")]
    pub cli: Option<String>,

    /// プロジェクトのリージョン (プロファイルの既定値を上書き)
    #[arg(long, env = "DEMOFLOW_REGION")]
    pub region: Option<String>,

    /// スクリプトを書き出さず、計画を JSON で標準出力に表示
    #[arg(long)]
    pub print_plan: bool,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptAction {
    Setup,
    Cleanup,
    Both,
}

impl ScriptAction {
    pub fn includes_setup(self) -> bool {
        matches!(self, ScriptAction::Setup | ScriptAction::Both)
    }

    pub fn includes_cleanup(self) -> bool {
        matches!(self, ScriptAction::Cleanup | ScriptAction::Both)
    }
}

fn main() {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は --print-plan の JSON 用）
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = generate::handle(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
