//! CLI command implementations.

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::error::{Error, Result};
use crate::core::executor::Executor;
use crate::core::git::GitRepo;
use crate::core::hook::HookRunner;
use crate::core::installer::{
    AssumeYes, HookSource, InstallOutcome, Installer, ProbeStatus, Prompter, TerminalPrompter,
    HOOK_MARKER, HOOK_NAME,
};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

/// Number of formatter output lines echoed on failure.
const FAILURE_OUTPUT_LINES: usize = 40;

/// Run the formatting pass.
pub fn run() -> Result<ExitCode> {
    if std::env::var("AUTOFMT_SKIP").ok().as_deref() == Some("1") {
        eprintln!("{} Skipping formatting (AUTOFMT_SKIP=1)", style("•").cyan());
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load_or_default()?;
    let repo = GitRepo::discover()?;
    let executor = Executor::new();

    let runner = HookRunner::new(&config.formatters, &repo, &executor, repo.root());

    let outcome = match runner.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Error::FormatterFailed { output, .. } = &e {
                for line in output.lines().take(FAILURE_OUTPUT_LINES) {
                    eprintln!("    {line}");
                }
            }
            eprintln!("{} Commit aborted", style("✗").red().bold());
            return Err(e);
        },
    };

    if outcome.nothing_to_do() {
        tracing::debug!(staged = outcome.staged.len(), "no formatter applies");
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!(
        "{} Formatted and re-staged {} file(s) in {:?}",
        style("✓").green().bold(),
        outcome.staged.len(),
        outcome.duration
    );

    Ok(ExitCode::SUCCESS)
}

/// Install git hook.
pub fn install(force: bool, source: Option<PathBuf>) -> Result<ExitCode> {
    let config = Config::load_or_default()?;

    let source = source.map_or(HookSource::Embedded, HookSource::File);
    source.prepare()?;

    let prompter: &dyn Prompter = if force { &AssumeYes } else { &TerminalPrompter };
    let executor = Executor::new();
    let installer = Installer::new(&config.formatters, &executor, prompter, source);

    for report in installer.probe_formatters() {
        eprintln!("{} Checking for {}...", style("•").cyan(), report.program);
        match report.status {
            ProbeStatus::Found { version } => {
                eprintln!("{} Found {}: {version}", style("✓").green(), report.program);
            },
            ProbeStatus::Missing { reason } => {
                tracing::debug!(program = %report.program, %reason, "probe failed");
                eprintln!(
                    "{} Warning: {} not found. Please install {}:",
                    style("!").yellow(),
                    report.program,
                    report.program
                );
                for hint in &report.install_hint {
                    eprintln!("    {hint}");
                }
            },
        }
    }

    let hooks_dir = match GitRepo::discover() {
        Ok(repo) => repo.hooks_dir(),
        Err(Error::NotGitRepo) => PathBuf::from(".git").join("hooks"),
        Err(e) => return Err(e),
    };

    match installer.install_hook(&hooks_dir)? {
        InstallOutcome::NoHooksDir { path } => {
            eprintln!(
                "{} Warning: {} directory not found. Are you in a git repository?",
                style("!").yellow(),
                path.display()
            );
        },
        InstallOutcome::Cancelled { .. } => {
            eprintln!("{} Setup cancelled.", style("•").cyan());
        },
        InstallOutcome::Installed { path, backup, .. } => {
            if let Some(backup) = backup {
                eprintln!(
                    "{} Backed up existing hook to {}",
                    style("•").cyan(),
                    backup.display()
                );
            }
            eprintln!(
                "{} Installed pre-commit hook to {}",
                style("✓").green(),
                path.display()
            );

            eprintln!("\nPre-commit hook setup complete!");
            eprintln!("The hook will:");
            for formatter in &config.formatters {
                let extensions: Vec<_> = formatter
                    .extensions
                    .iter()
                    .map(|e| format!(".{}", e.trim_start_matches('.')))
                    .collect();
                eprintln!(
                    "- Run '{}' when {} files are staged",
                    formatter.command_line(),
                    extensions.join("/")
                );
            }
            eprintln!("- Automatically stage formatted files");
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Uninstall git hook.
pub fn uninstall() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;
    let hook_path = repo.hook_path(HOOK_NAME);

    if !hook_path.exists() {
        eprintln!(
            "{} No hook installed at {}",
            style("•").cyan(),
            hook_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let content = std::fs::read(&hook_path).map_err(|e| Error::io("read hook", e))?;

    if !String::from_utf8_lossy(&content).contains(HOOK_MARKER) {
        eprintln!(
            "{} Hook at {} was not installed by autofmt",
            style("!").yellow(),
            hook_path.display()
        );
        eprintln!("  Remove manually if desired.");
        return Ok(ExitCode::FAILURE);
    }

    std::fs::remove_file(&hook_path).map_err(|e| Error::io("remove hook", e))?;

    eprintln!(
        "{} Removed pre-commit hook from {}",
        style("✓").green(),
        hook_path.display()
    );

    let backup_path = repo.hooks_dir().join(format!("{HOOK_NAME}.bak"));
    if backup_path.exists() {
        eprintln!(
            "  Backup exists at {} - restore if needed",
            backup_path.display()
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize configuration.
pub fn init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    let toml = Config::default_toml()?;

    std::fs::write(&config_path, toml).map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Review and customize {CONFIG_FILE_NAME}");
    eprintln!("  2. Run: autofmt install");

    Ok(ExitCode::SUCCESS)
}

/// List configured formatters.
pub fn list() -> Result<ExitCode> {
    let config = Config::load_or_default()?;

    eprintln!("{}", style("Formatters:").bold());
    for formatter in &config.formatters {
        let program = formatter.command.first().map_or("", String::as_str);
        let availability = if Executor::command_exists(program) {
            style("available").green()
        } else {
            style("not found").yellow()
        };
        let description = if formatter.description.is_empty() {
            "(no description)"
        } else {
            formatter.description.as_str()
        };

        eprintln!(
            "  {} - {} [{}]",
            style(&formatter.name).cyan(),
            description,
            availability
        );
        eprintln!("      extensions: {}", formatter.extensions.join(", "));
        eprintln!("      command:    {}", formatter.command_line());
    }

    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "autofmt",
        &mut std::io::stdout(),
    );
}
