//! Git repository operations.
//!
//! This module provides utilities for interacting with Git repositories,
//! including finding the repository root, the hooks directory, reading the
//! staged file set and re-staging paths.

use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Maximum number of paths passed to a single `git add` invocation.
const STAGE_BATCH_SIZE: usize = 256;

/// Operations the hook needs from the version-control index.
#[cfg_attr(test, mockall::automock)]
pub trait Index {
    /// Returns the paths that differ between the index and `HEAD`.
    fn staged_files(&self) -> Result<Vec<PathBuf>>;

    /// Adds the given paths to the index.
    fn stage(&self, paths: &[PathBuf]) -> Result<()>;
}

/// Represents a Git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
    /// Path to the .git directory (or file for worktrees).
    git_dir: PathBuf,
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel", "--git-dir"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        let root = lines.next().map(PathBuf::from).ok_or(Error::NotGitRepo)?;

        // --git-dir is relative to the directory git was run from
        let git_dir = lines
            .next()
            .map(|s| {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    path.join(p)
                }
            })
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root, git_dir })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .git directory path.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Returns the hooks directory path.
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        // Check for custom hooks path first
        if let Ok(output) = Command::new("git")
            .args(["config", "--get", "core.hooksPath"])
            .current_dir(&self.root)
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    let hooks_path = PathBuf::from(&path);
                    if hooks_path.is_absolute() {
                        return hooks_path;
                    }
                    return self.root.join(hooks_path);
                }
            }
        }

        // Default to .git/hooks
        self.git_dir.join("hooks")
    }

    /// Returns the path to a specific hook.
    #[must_use]
    pub fn hook_path(&self, hook_name: &str) -> PathBuf {
        self.hooks_dir().join(hook_name)
    }
}

impl Index for GitRepo {
    /// Added, copied, modified and renamed paths; deletions cannot be re-added.
    fn staged_files(&self) -> Result<Vec<PathBuf>> {
        let output = Command::new("git")
            .args(["diff", "--cached", "--name-only", "-z", "--diff-filter=ACMR"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("get staged files", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git("diff --cached", stderr.trim().to_string()));
        }

        let files = output
            .stdout
            .split(|b| *b == b'\0')
            .filter(|name| !name.is_empty())
            .map(|name| self.root.join(path_from_bytes(name)))
            .collect();

        Ok(files)
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        for batch in paths.chunks(STAGE_BATCH_SIZE) {
            let output = Command::new("git")
                .arg("add")
                .arg("--")
                .args(batch)
                .current_dir(&self.root)
                .output()
                .map_err(|e| Error::io("run git add", e))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::git("add", stderr.trim().to_string()));
            }
        }

        Ok(())
    }
}

/// Paths in git output are raw bytes; keep them intact where the OS allows.
#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
