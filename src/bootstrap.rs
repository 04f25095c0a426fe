//! Rebuilds the packaged executable before the dashboard starts.
//!
//! The packaging step sits behind [`BuildProvider`]. [`CargoBuild`] drives
//! `cargo build --release` and copies the binary to
//! `dist/TimerDashboard[.exe]`.

use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::BuildError;

pub const EXE_BASE_NAME: &str = "TimerDashboard";
pub const BIN_NAME: &str = "timer-dashboard";

pub trait BuildProvider {
    /// Running as the packaged artifact, where there is nothing to rebuild.
    fn is_packaged(&self) -> bool;

    fn tool_available(&self) -> bool;

    fn artifact_path(&self) -> PathBuf;

    /// Removes transient output from previous builds.
    fn clean(&self) -> Result<(), BuildError>;

    /// Produces the artifact at `artifact_path()`.
    fn build(&self) -> Result<(), BuildError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Flag,
    Packaged,
    ToolMissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Skipped(SkipReason),
    Built(PathBuf),
}

pub struct Bootstrapper<P> {
    provider: P,
    skip_build: bool,
}

impl<P: BuildProvider> Bootstrapper<P> {
    pub fn new(provider: P, skip_build: bool) -> Self {
        Bootstrapper {
            provider,
            skip_build,
        }
    }

    /// Deletes the previous artifact and rebuilds it. Any failure after the
    /// old artifact is touched aborts startup.
    pub fn run(&self) -> Result<BuildOutcome, BuildError> {
        if self.skip_build {
            tracing::info!("Skipping executable build (--skip-build)");
            return Ok(BuildOutcome::Skipped(SkipReason::Flag));
        }

        if self.provider.is_packaged() {
            tracing::debug!("Running packaged executable, not rebuilding");
            return Ok(BuildOutcome::Skipped(SkipReason::Packaged));
        }

        if !self.provider.tool_available() {
            tracing::warn!("Packaging tool not available, launching without rebuild");
            return Ok(BuildOutcome::Skipped(SkipReason::ToolMissing));
        }

        let artifact = self.provider.artifact_path();
        if artifact.exists() {
            fs::remove_file(&artifact).map_err(|source| BuildError::RemoveStale {
                path: artifact.clone(),
                source,
            })?;
            tracing::info!("Removed old executable: {:?}", artifact);
        }

        self.provider.clean()?;

        tracing::info!("Building executable...");
        self.provider.build()?;

        if !artifact.is_file() {
            return Err(BuildError::MissingArtifact { path: artifact });
        }

        tracing::info!("Built executable: {:?}", artifact);
        Ok(BuildOutcome::Built(artifact))
    }
}

/// `BuildProvider` for this crate's own Cargo project.
pub struct CargoBuild {
    project_root: PathBuf,
    dist_dir: PathBuf,
    target_dir: PathBuf,
    current_exe: Option<PathBuf>,
}

impl CargoBuild {
    pub fn new(project_root: impl Into<PathBuf>, dist_dir: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let target_dir = std::env::var_os("CARGO_TARGET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root.join("target"));
        CargoBuild {
            project_root,
            dist_dir: dist_dir.into(),
            target_dir,
            current_exe: std::env::current_exe().ok(),
        }
    }

    fn release_binary(&self) -> PathBuf {
        self.target_dir
            .join("release")
            .join(format!("{BIN_NAME}{EXE_SUFFIX}"))
    }
}

pub fn exe_file_name() -> String {
    format!("{EXE_BASE_NAME}{EXE_SUFFIX}")
}

impl BuildProvider for CargoBuild {
    /// Packaged when there is no project to build, or when the running
    /// binary is the artifact itself.
    fn is_packaged(&self) -> bool {
        if !self.project_root.join("Cargo.toml").is_file() {
            return true;
        }
        self.current_exe
            .as_deref()
            .is_some_and(|exe| same_file(exe, &self.artifact_path()))
    }

    fn tool_available(&self) -> bool {
        Command::new("cargo")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn artifact_path(&self) -> PathBuf {
        self.dist_dir.join(exe_file_name())
    }

    fn clean(&self) -> Result<(), BuildError> {
        fs::create_dir_all(&self.dist_dir).map_err(|source| BuildError::Prepare {
            path: self.dist_dir.clone(),
            source,
        })?;

        // A failed build must not leave last run's binary to be copied.
        remove_if_exists(&self.release_binary())
    }

    fn build(&self) -> Result<(), BuildError> {
        let status = Command::new("cargo")
            .args(["build", "--release", "--bin", BIN_NAME])
            .current_dir(&self.project_root)
            .status()
            .map_err(|source| BuildError::Spawn {
                program: "cargo".to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::Failed {
                code: status.code(),
            });
        }

        let from = self.release_binary();
        let to = self.artifact_path();
        fs::copy(&from, &to).map_err(|source| BuildError::Copy { from, to, source })?;
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn remove_if_exists(path: &Path) -> Result<(), BuildError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Prepare {
            path: path.to_path_buf(),
            source,
        }),
    }
}
