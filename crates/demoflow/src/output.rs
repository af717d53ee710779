use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SETUP_SCRIPT: &str = "setup-demo-ecosystem.sh";
pub const DEFAULT_CLEANUP_SCRIPT: &str = "cleanup-demo-ecosystem.sh";

/// setup スクリプトの出力先
pub fn setup_path(output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETUP_SCRIPT))
}

/// cleanup スクリプトの出力先
///
/// `--output demo.sh` → `demo-cleanup.sh`。拡張子が `.sh` でなければ末尾に付け足す。
pub fn cleanup_path(output: Option<&Path>) -> PathBuf {
    let Some(output) = output else {
        return PathBuf::from(DEFAULT_CLEANUP_SCRIPT);
    };
    let output = output.to_string_lossy();
    match output.strip_suffix(".sh") {
        Some(stem) => PathBuf::from(format!("{}-cleanup.sh", stem)),
        None => PathBuf::from(format!("{}-cleanup.sh", output)),
    }
}

/// スクリプトを書き出し、実行権限 (0755) を付与
pub fn write_script(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content)
        .with_context(|| format!("スクリプトを書き込めません: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("実行権限を設定できません: {}", path.display()))?;
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "Script written");
    Ok(())
}
