use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Acme / Demo ecosystem used by most CLI tests
pub const ACME_DEMO: &str = r#"{
    "organizations": {
        "fixed": [{"label": "Big Corp", "name": "big-corp"}],
        "flex": [{"label": "Acme", "name": "Acme Co"}]
    },
    "users": [{"name": "Ada", "email": "ada@example.com", "role": "admin"}],
    "projects": [{
        "name": "demo",
        "title": "Demo",
        "organization": "Acme",
        "source": {"type": "github", "repository": "https://github.com/acme/demo"},
        "environments": ["production"],
        "local_directory": "projects/demo"
    }]
}"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root.path().join(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.root.path().join(name).exists()
    }
}
