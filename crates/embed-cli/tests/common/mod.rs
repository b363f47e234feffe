#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

pub const HELLO: &str = r#"<html><body><h1 class="title">Hello</h1></body></html>"#;

/// Isolated config file and cache directory for one test.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Sandbox whose config points `base_url` at `base_url` with a `page` action.
    pub fn new(base_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create sandbox dir");
        let config = format!(
            "base_url = \"{base_url}\"\ntimeout = 5\n\n[actions]\npage = \"/p\"\n"
        );
        std::fs::write(dir.path().join("config.toml"), config).expect("write config");
        Self { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }
}

/// Create an `embed` command wired to the sandbox.
pub fn embed_cmd(sandbox: &Sandbox) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("embed"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("EMBED_CONFIG", sandbox.config_path());
    cmd.env("EMBED_DATA_DIR", sandbox.cache_dir());
    cmd.env("NO_COLOR", "1");
    cmd
}
