//! Hook installation.
//!
//! The installer prepares the hook source, probes the configured formatters
//! and copies the hook into the repository's hooks directory, asking before
//! it replaces an existing hook.

use crate::config::FormatterConfig;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandRunner, Invocation};
use console::style;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Name of the installed hook file.
pub const HOOK_NAME: &str = "pre-commit";

/// Marker identifying hooks written by autofmt.
pub const HOOK_MARKER: &str = "# autofmt hook";

/// Hook script installed when no `--source` is given.
pub const HOOK_SCRIPT: &str = r#"#!/bin/sh
# autofmt hook - installed by `autofmt install`
# Formats staged Python and Rust sources, then re-stages them.

# Skip if AUTOFMT_SKIP is set
if [ "$AUTOFMT_SKIP" = "1" ]; then
    exit 0
fi

exec autofmt run
"#;

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Returns true if the user confirmed. The default answer is no.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompts on the terminal, or reads one answer line from a piped stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
            return dialoguer::Confirm::new()
                .with_prompt(question)
                .default(false)
                .interact()
                .map_err(|e| Error::Internal {
                    message: format!("Failed to read confirmation: {e}"),
                });
        }

        eprint!("{question} [y/N]: ");
        std::io::stderr()
            .flush()
            .map_err(|e| Error::io("flush prompt", e))?;

        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| Error::io("read confirmation", e))?;

        Ok(is_affirmative(&answer))
    }
}

/// Answers yes to every question (`--force`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Returns true for `y` or `yes`, ignoring case and surrounding whitespace.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Where the installed hook comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookSource {
    /// The built-in shim that runs `autofmt run`.
    #[default]
    Embedded,
    /// A hook script on disk, copied as-is.
    File(PathBuf),
}

impl HookSource {
    /// Makes a file source executable. Safe to repeat.
    pub fn prepare(&self) -> Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };

        let metadata = std::fs::metadata(path).map_err(|e| Error::io("read hook source", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = metadata.permissions();
            perms.set_mode(perms.mode() | 0o111);
            std::fs::set_permissions(path, perms)
                .map_err(|e| Error::io("make hook source executable", e))?;
        }
        #[cfg(not(unix))]
        drop(metadata);

        Ok(())
    }

    /// Writes the hook to `dest`.
    fn write_to(&self, dest: &Path) -> Result<()> {
        match self {
            Self::Embedded => {
                std::fs::write(dest, HOOK_SCRIPT).map_err(|e| Error::io("write hook", e))?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))
                        .map_err(|e| Error::io("set hook perms", e))?;
                }
            },
            Self::File(src) => {
                // fs::copy carries the permission bits over
                std::fs::copy(src, dest).map_err(|e| Error::io("copy hook", e))?;
            },
        }

        Ok(())
    }
}

/// Availability of one formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The probe succeeded.
    Found {
        /// First line the probe printed.
        version: String,
    },
    /// The probe could not run or failed.
    Missing {
        /// Why the probe failed.
        reason: String,
    },
}

/// Result of probing one formatter.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Program that was probed.
    pub program: String,
    /// Probe result.
    pub status: ProbeStatus,
    /// Install instructions from the formatter config.
    pub install_hint: Vec<String>,
}

/// What the installer did with the hook file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The hook was written.
    Installed {
        /// Installed hook path.
        path: PathBuf,
        /// Whether an existing hook was replaced.
        replaced: bool,
        /// Backup of a replaced hook not written by autofmt.
        backup: Option<PathBuf>,
    },
    /// The user declined to overwrite an existing hook.
    Cancelled {
        /// Existing hook path, left untouched.
        path: PathBuf,
    },
    /// The hooks directory does not exist.
    NoHooksDir {
        /// Directory that was expected.
        path: PathBuf,
    },
}

/// Installs the pre-commit hook.
#[derive(Debug)]
pub struct Installer<'a, R: ?Sized, P: ?Sized> {
    formatters: &'a [FormatterConfig],
    runner: &'a R,
    prompter: &'a P,
    source: HookSource,
}

impl<'a, R, P> Installer<'a, R, P>
where
    R: CommandRunner + ?Sized,
    P: Prompter + ?Sized,
{
    /// Creates an installer.
    pub fn new(
        formatters: &'a [FormatterConfig],
        runner: &'a R,
        prompter: &'a P,
        source: HookSource,
    ) -> Self {
        Self {
            formatters,
            runner,
            prompter,
            source,
        }
    }

    /// Probes every configured formatter. Never fails.
    pub fn probe_formatters(&self) -> Vec<ProbeReport> {
        self.formatters.iter().map(|f| self.probe(f)).collect()
    }

    fn probe(&self, formatter: &FormatterConfig) -> ProbeReport {
        let program = formatter
            .probe
            .first()
            .cloned()
            .unwrap_or_else(|| formatter.name.clone());

        let status = match Invocation::from_argv(&formatter.probe) {
            None => ProbeStatus::Missing {
                reason: "no probe command configured".to_string(),
            },
            Some(invocation) => match self.runner.run(&invocation) {
                Ok(output) if output.success() => {
                    let version = first_line(&output.stdout)
                        .or_else(|| first_line(&output.stderr))
                        .unwrap_or_default();
                    ProbeStatus::Found { version }
                },
                Ok(output) => ProbeStatus::Missing {
                    reason: format!(
                        "`{}` exited with status {}",
                        invocation.display(),
                        output
                            .exit_code
                            .map_or_else(|| "unknown".to_string(), |c| c.to_string())
                    ),
                },
                Err(e) => ProbeStatus::Missing {
                    reason: e.to_string(),
                },
            },
        };

        tracing::debug!(program = %program, status = ?status, "probed formatter");

        ProbeReport {
            program,
            status,
            install_hint: formatter.install_hint.clone(),
        }
    }

    /// Copies the hook into `hooks_dir`.
    ///
    /// A missing hooks directory is not an error. An existing hook is only
    /// replaced after the prompter confirms; declining leaves it untouched.
    pub fn install_hook(&self, hooks_dir: &Path) -> Result<InstallOutcome> {
        if !hooks_dir.is_dir() {
            return Ok(InstallOutcome::NoHooksDir {
                path: hooks_dir.to_path_buf(),
            });
        }

        let hook_path = hooks_dir.join(HOOK_NAME);
        let mut replaced = false;
        let mut backup = None;

        if hook_path.exists() {
            eprintln!(
                "{} Pre-commit hook already exists at {}",
                style("•").cyan(),
                hook_path.display()
            );

            if !self.prompter.confirm("Overwrite existing pre-commit hook?")? {
                return Ok(InstallOutcome::Cancelled { path: hook_path });
            }

            let existing =
                std::fs::read(&hook_path).map_err(|e| Error::io("read existing hook", e))?;
            if !String::from_utf8_lossy(&existing).contains(HOOK_MARKER) {
                let backup_path = free_backup_path(hooks_dir);
                std::fs::rename(&hook_path, &backup_path)
                    .map_err(|e| Error::io("backup hook", e))?;
                backup = Some(backup_path);
            }
            replaced = true;
        }

        self.source.write_to(&hook_path)?;

        Ok(InstallOutcome::Installed {
            path: hook_path,
            replaced,
            backup,
        })
    }
}

/// `pre-commit.bak`, or the first unused `pre-commit.bak.N`.
fn free_backup_path(hooks_dir: &Path) -> PathBuf {
    let base = hooks_dir.join(format!("{HOOK_NAME}.bak"));
    if !base.exists() {
        return base;
    }

    (1..)
        .map(|n| hooks_dir.join(format!("{HOOK_NAME}.bak.{n}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(base)
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::{CommandOutput, MockCommandRunner};
    use crate::formatters;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn hooks_dir() -> TempDir {
        TempDir::new().expect("create hooks dir")
    }

    fn silent_runner() -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        runner
    }

    fn prompter(answer: bool) -> MockPrompter {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .times(1)
            .returning(move |_| Ok(answer));
        prompter
    }

    fn never_prompted() -> MockPrompter {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().never();
        prompter
    }

    // =========================================================================
    // Prompt tests
    // =========================================================================

    #[rstest]
    #[case("y\n", true)]
    #[case("Y", true)]
    #[case("  yes  ", true)]
    #[case("YES\n", true)]
    #[case("n\n", false)]
    #[case("", false)]
    #[case("\n", false)]
    #[case("yep", false)]
    fn test_is_affirmative(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_affirmative(answer), expected);
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("anything?").expect("confirm"));
    }

    // =========================================================================
    // Probe tests
    // =========================================================================

    #[test]
    fn test_probe_found_reports_version() {
        let builtin = formatters::builtin();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(|inv| {
            Ok(CommandOutput {
                exit_code: Some(0),
                stdout: format!("\n{} 1.2.3\nextra\n", inv.program),
                ..CommandOutput::default()
            })
        });
        let prompter = never_prompted();

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let reports = installer.probe_formatters();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].program, "black");
        assert_eq!(
            reports[0].status,
            ProbeStatus::Found {
                version: "black 1.2.3".to_string()
            }
        );
        assert_eq!(reports[1].program, "rustfmt");
    }

    #[test]
    fn test_probe_version_on_stderr() {
        let builtin = formatters::builtin();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                exit_code: Some(0),
                stderr: "tool 9.9\n".to_string(),
                ..CommandOutput::default()
            })
        });
        let prompter = never_prompted();

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let reports = installer.probe_formatters();
        assert_eq!(
            reports[0].status,
            ProbeStatus::Found {
                version: "tool 9.9".to_string()
            }
        );
    }

    #[test]
    fn test_probe_missing_binaries_are_warnings() {
        let builtin = formatters::builtin();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.program == "black")
            .returning(|inv| {
                Err(Error::CommandNotFound {
                    command: inv.program.clone(),
                })
            });
        runner
            .expect_run()
            .withf(|inv| inv.program == "rustfmt")
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: Some(1),
                    ..CommandOutput::default()
                })
            });
        let prompter = never_prompted();

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let reports = installer.probe_formatters();

        assert!(matches!(&reports[0].status, ProbeStatus::Missing { reason }
            if reason == "Command not found: black"));
        assert!(matches!(&reports[1].status, ProbeStatus::Missing { reason }
            if reason.contains("status 1")));
        assert_eq!(reports[0].install_hint, vec!["pip install black"]);
        assert_eq!(reports[1].install_hint, vec!["rustup component add rustfmt"]);
    }

    // =========================================================================
    // Install tests
    // =========================================================================

    #[test]
    fn test_install_fresh_hook() {
        let dir = hooks_dir();
        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = never_prompted();

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let outcome = installer.install_hook(dir.path()).expect("install");

        let hook = dir.path().join(HOOK_NAME);
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                path: hook.clone(),
                replaced: false,
                backup: None,
            }
        );
        let content = std::fs::read_to_string(&hook).expect("read hook");
        assert!(content.contains(HOOK_MARKER));
        assert!(content.contains("exec autofmt run"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&hook).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_install_without_hooks_dir_is_noop() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join(".git/hooks");
        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = never_prompted();

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let outcome = installer.install_hook(&missing).expect("install");

        assert_eq!(outcome, InstallOutcome::NoHooksDir { path: missing.clone() });
        assert!(!missing.exists());
    }

    #[test]
    fn test_declining_overwrite_leaves_hook_unchanged() {
        let dir = hooks_dir();
        let hook = dir.path().join(HOOK_NAME);
        let original = b"#!/bin/sh\necho custom hook\n\xff\n".to_vec();
        std::fs::write(&hook, &original).expect("write existing hook");

        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = prompter(false);

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let outcome = installer.install_hook(dir.path()).expect("install");

        assert_eq!(outcome, InstallOutcome::Cancelled { path: hook.clone() });
        assert_eq!(std::fs::read(&hook).expect("read hook"), original);
        assert!(!dir.path().join("pre-commit.bak").exists());
    }

    #[test]
    fn test_overwrite_foreign_hook_makes_backup() {
        let dir = hooks_dir();
        let hook = dir.path().join(HOOK_NAME);
        std::fs::write(&hook, "#!/bin/sh\necho custom\n").expect("write existing hook");

        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = prompter(true);

        let installer = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded);
        let outcome = installer.install_hook(dir.path()).expect("install");

        let backup = dir.path().join("pre-commit.bak");
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                path: hook.clone(),
                replaced: true,
                backup: Some(backup.clone()),
            }
        );
        assert_eq!(
            std::fs::read_to_string(&backup).expect("read backup"),
            "#!/bin/sh\necho custom\n"
        );
        assert_eq!(std::fs::read_to_string(&hook).expect("read hook"), HOOK_SCRIPT);
    }

    #[test]
    fn test_existing_backup_is_kept() {
        let dir = hooks_dir();
        let hook = dir.path().join(HOOK_NAME);
        let old_backup = dir.path().join("pre-commit.bak");
        std::fs::write(&old_backup, "#!/bin/sh
echo first
").expect("write old backup");
        std::fs::write(&hook, "#!/bin/sh
echo second
").expect("write existing hook");

        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = prompter(true);

        let outcome = Installer::new(&builtin, &runner, &prompter, HookSource::Embedded)
            .install_hook(dir.path())
            .expect("install");

        let new_backup = dir.path().join("pre-commit.bak.1");
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                path: hook,
                replaced: true,
                backup: Some(new_backup.clone()),
            }
        );
        assert_eq!(
            std::fs::read_to_string(&old_backup).expect("read old backup"),
            "#!/bin/sh
echo first
"
        );
        assert_eq!(
            std::fs::read_to_string(&new_backup).expect("read new backup"),
            "#!/bin/sh
echo second
"
        );
    }

    #[test]
    fn test_reinstall_own_hook_skips_backup() {
        let dir = hooks_dir();
        let builtin = formatters::builtin();
        let runner = silent_runner();

        let first = never_prompted();
        Installer::new(&builtin, &runner, &first, HookSource::Embedded)
            .install_hook(dir.path())
            .expect("first install");

        let second = prompter(true);
        let outcome = Installer::new(&builtin, &runner, &second, HookSource::Embedded)
            .install_hook(dir.path())
            .expect("second install");

        assert!(matches!(outcome, InstallOutcome::Installed { replaced: true, backup: None, .. }));
        assert!(!dir.path().join("pre-commit.bak").exists());
    }

    #[test]
    fn test_install_from_file_source() {
        let dir = hooks_dir();
        let src_dir = TempDir::new().expect("source dir");
        let src = src_dir.path().join("pre-commit.sh");
        std::fs::write(&src, "#!/bin/sh\nexit 0\n").expect("write source");

        let source = HookSource::File(src.clone());
        source.prepare().expect("prepare");
        source.prepare().expect("prepare is idempotent");

        let builtin = formatters::builtin();
        let runner = silent_runner();
        let prompter = never_prompted();
        let installer = Installer::new(&builtin, &runner, &prompter, source);
        installer.install_hook(dir.path()).expect("install");

        let hook = dir.path().join(HOOK_NAME);
        assert_eq!(
            std::fs::read_to_string(&hook).expect("read hook"),
            "#!/bin/sh\nexit 0\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let src_mode = std::fs::metadata(&src).expect("metadata").permissions().mode();
            let hook_mode = std::fs::metadata(&hook).expect("metadata").permissions().mode();
            assert_eq!(src_mode & 0o111, 0o111);
            assert_eq!(hook_mode & 0o777, src_mode & 0o777);
        }
    }

    #[test]
    fn test_prepare_missing_file_source_fails() {
        let temp = TempDir::new().expect("temp dir");
        let source = HookSource::File(temp.path().join("nope"));
        assert!(matches!(source.prepare(), Err(Error::Io { .. })));
    }

    #[test]
    fn test_prepare_embedded_is_noop() {
        assert!(HookSource::Embedded.prepare().is_ok());
    }
}
