//! Core functionality for autofmt-hook.
//!
//! This module contains the main components:
//! - [`hook`]: The pre-commit formatting pass
//! - [`installer`]: Hook installation into a repository
//! - [`executor`]: External process execution
//! - [`git`]: Git repository operations
//! - [`error`]: Error types and result handling

pub mod error;
pub mod executor;
pub mod git;
pub mod hook;
pub mod installer;
