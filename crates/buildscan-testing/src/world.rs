//! TestWorld pattern for declarative integration test setup.
//!
//! Each world owns a temp directory holding a build tree, the logs describing
//! it, an output directory and an isolated `BUILDSCAN_PATH` data directory.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{self, LogBuilder};

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use buildscan_testing::{LogBuilder, TestWorld};
///
/// let world = TestWorld::new();
/// world.write_log("build.log", &LogBuilder::new().line("Build started.")).unwrap();
///
/// let result = world.analyze(&[]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    cwd: PathBuf,
    data_dir: PathBuf,
    logs_dir: PathBuf,
    out_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path().to_path_buf();
        let data_dir = base_path.join(".buildscan");
        let logs_dir = base_path.join("logs");
        let out_dir = base_path.join("out");

        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");
        std::fs::create_dir_all(&logs_dir).expect("Failed to create logs dir");

        Self {
            cwd: base_path,
            temp_dir,
            data_dir,
            logs_dir,
            out_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Directory used as `BUILDSCAN_PATH` (holds `config.toml`).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` under the world root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `<dir>/<assembly_name>.csproj` declaring `assembly_name`.
    pub fn write_project(&self, dir: &str, assembly_name: &str) -> Result<PathBuf> {
        let project_dir = self.path(dir);
        std::fs::create_dir_all(&project_dir)?;
        let project_file = project_dir.join(format!("{}.csproj", assembly_name));
        std::fs::write(&project_file, fixtures::project_xml(assembly_name))?;
        Ok(project_file)
    }

    /// Write a placeholder binary at `relative` under the world root.
    pub fn write_binary(&self, relative: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        fixtures::write_binary(&path)?;
        Ok(path)
    }

    pub fn write_log(&self, name: &str, log: &LogBuilder) -> Result<PathBuf> {
        let path = self.logs_dir.join(name);
        std::fs::write(&path, log.build())?;
        Ok(path)
    }

    /// Read one of the emitted list files from the output directory.
    pub fn read_output(&self, name: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.out_dir.join(name))?)
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.env("BUILDSCAN_PATH", &self.data_dir);
        cmd.env_remove("RUST_LOG");
        cmd.current_dir(&self.cwd);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `buildscan` binary with `args` and capture its output.
    ///
    /// Uses `Command::cargo_bin()`, which requires the binary to be built by
    /// the surrounding `cargo test` run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("buildscan")
            .map_err(|e| anyhow::anyhow!("Failed to find buildscan binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// `buildscan analyze <logs_dir> --out <out_dir> <extra...>`.
    pub fn analyze(&self, extra: &[&str]) -> Result<CliResult> {
        let logs = self.logs_dir.to_string_lossy().to_string();
        let out = self.out_dir.to_string_lossy().to_string();
        let mut args = vec!["analyze", logs.as_str(), "--out", out.as_str()];
        args.extend_from_slice(extra);
        self.run(&args)
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
