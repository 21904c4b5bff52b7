//! Pre-commit hook runner.
//!
//! Reads the staged file set, picks the formatters whose extensions occur in
//! it, runs each of them once over the whole working tree and re-stages the
//! originally staged paths so formatter rewrites land in the commit.

use crate::config::FormatterConfig;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandOutput, CommandRunner, Invocation};
use crate::core::git::Index;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Formatters selected for one hook invocation, in configuration order.
#[derive(Debug, Clone)]
pub struct FormatPlan<'a> {
    formatters: Vec<&'a FormatterConfig>,
}

impl<'a> FormatPlan<'a> {
    /// Selects every formatter with at least one matching staged path.
    #[must_use]
    pub fn from_staged(formatters: &'a [FormatterConfig], staged: &[PathBuf]) -> Self {
        let formatters = formatters
            .iter()
            .filter(|f| staged.iter().any(|path| f.matches(path)))
            .collect();

        Self { formatters }
    }

    /// Returns true if no formatter needs to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Returns true if the named formatter is part of the plan.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.iter().any(|f| f.name == name)
    }

    /// Returns the planned formatters.
    #[must_use]
    pub fn formatters(&self) -> &[&'a FormatterConfig] {
        &self.formatters
    }
}

/// Result of running one formatter.
#[derive(Debug, Clone)]
pub struct FormatterRun {
    /// Name of the formatter.
    pub name: String,
    /// Output from the formatter.
    pub output: CommandOutput,
}

/// Result of one hook invocation.
#[derive(Debug)]
pub struct HookOutcome {
    /// Paths that were staged when the hook started.
    pub staged: Vec<PathBuf>,
    /// Formatters that ran, in order.
    pub formatted: Vec<FormatterRun>,
    /// Total duration.
    pub duration: Duration,
}

impl HookOutcome {
    /// Returns true if no formatter was relevant and nothing was touched.
    #[must_use]
    pub fn nothing_to_do(&self) -> bool {
        self.formatted.is_empty()
    }
}

/// Runs the pre-commit formatting pass.
#[derive(Debug)]
pub struct HookRunner<'a, I: ?Sized, R: ?Sized> {
    formatters: &'a [FormatterConfig],
    index: &'a I,
    runner: &'a R,
    root: PathBuf,
}

impl<'a, I, R> HookRunner<'a, I, R>
where
    I: Index + ?Sized,
    R: CommandRunner + ?Sized,
{
    /// Creates a runner that formats the tree rooted at `root`.
    pub fn new(
        formatters: &'a [FormatterConfig],
        index: &'a I,
        runner: &'a R,
        root: impl AsRef<Path>,
    ) -> Self {
        Self {
            formatters,
            index,
            runner,
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Runs the hook.
    ///
    /// Any formatter failure is returned before anything is re-staged.
    pub fn run(&self) -> Result<HookOutcome> {
        let start = Instant::now();

        let staged = self.index.staged_files()?;
        let plan = FormatPlan::from_staged(self.formatters, &staged);

        tracing::debug!(
            staged = staged.len(),
            planned = plan.formatters().len(),
            "built format plan"
        );

        if plan.is_empty() {
            return Ok(HookOutcome {
                staged,
                formatted: Vec::new(),
                duration: start.elapsed(),
            });
        }

        let mut formatted = Vec::with_capacity(plan.formatters().len());
        for formatter in plan.formatters() {
            formatted.push(self.run_formatter(formatter)?);
        }

        tracing::debug!(paths = staged.len(), "re-staging formatted paths");
        self.index.stage(&staged)?;

        Ok(HookOutcome {
            staged,
            formatted,
            duration: start.elapsed(),
        })
    }

    /// Runs a single formatter over the whole tree.
    fn run_formatter(&self, formatter: &FormatterConfig) -> Result<FormatterRun> {
        let invocation = Invocation::from_argv(&formatter.command)
            .ok_or_else(|| Error::config_invalid(&formatter.name, "command must not be empty"))?
            .cwd(&self.root);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .ok()
                .unwrap_or_else(ProgressStyle::default_spinner),
        );
        pb.set_message(format!("Running {}...", invocation.display()));
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = self.runner.run(&invocation);
        pb.finish_and_clear();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                eprintln!("{} {}", style("✗").red(), formatter.name);
                return Err(e);
            },
        };

        if !output.success() {
            eprintln!("{} {}", style("✗").red(), formatter.name);
            return Err(Error::formatter_failed(
                &formatter.name,
                invocation.display(),
                output.exit_code,
                output.combined_output(),
            ));
        }

        eprintln!(
            "{} {} ({})",
            style("✓").green(),
            formatter.name,
            style(invocation.display()).dim()
        );

        Ok(FormatterRun {
            name: formatter.name.clone(),
            output,
        })
    }
}
