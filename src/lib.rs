//! # autofmt-hook
//!
//! A pre-commit hook that formats staged sources.
//!
//! When a commit contains Python files the hook runs `black .`; when it
//! contains Rust files it runs `cargo fmt`. Files the formatters rewrite are
//! re-staged so the commit contains the formatted versions. A formatter that
//! exits with a non-zero status aborts the commit.
//!
//! ## Example
//!
//! ```rust,no_run
//! use autofmt_hook::{Config, Executor, GitRepo, HookRunner};
//!
//! fn main() -> autofmt_hook::Result<()> {
//!     let config = Config::load_or_default()?;
//!     let repo = GitRepo::discover()?;
//!
//!     let outcome = HookRunner::new(&config.formatters, &repo, &Executor::new(), repo.root())
//!         .run()?;
//!
//!     if outcome.nothing_to_do() {
//!         println!("no Python or Rust files staged");
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
pub mod config;
pub mod core;
pub mod formatters;

// Re-export main types for convenience
pub use crate::config::{Config, FormatterConfig};
pub use crate::core::error::{Error, Result};
pub use crate::core::executor::{CommandOutput, CommandRunner, Executor, Invocation};
pub use crate::core::git::{GitRepo, Index};
pub use crate::core::hook::{FormatPlan, HookOutcome, HookRunner};
pub use crate::core::installer::{HookSource, InstallOutcome, Installer, Prompter};
