//! Built-in formatter definitions.
//!
//! The default configuration formats Python sources with `black` and Rust
//! sources with `cargo fmt`.

use crate::config::FormatterConfig;

/// Names of built-in formatters.
pub mod names {
    /// Python formatter.
    pub const BLACK: &str = "black";
    /// Rust formatter, run through cargo.
    pub const RUSTFMT: &str = "rustfmt";
}

/// Returns the built-in formatter definitions, in the order they run.
#[must_use]
pub fn builtin() -> Vec<FormatterConfig> {
    vec![black(), rustfmt()]
}

fn black() -> FormatterConfig {
    FormatterConfig {
        name: names::BLACK.to_string(),
        description: "Format Python sources".to_string(),
        extensions: vec!["py".to_string()],
        command: argv(&["black", "."]),
        probe: argv(&["black", "--version"]),
        install_hint: vec!["pip install black".to_string()],
    }
}

fn rustfmt() -> FormatterConfig {
    FormatterConfig {
        name: names::RUSTFMT.to_string(),
        description: "Format Rust sources".to_string(),
        extensions: vec!["rs".to_string()],
        command: argv(&["cargo", "fmt"]),
        probe: argv(&["rustfmt", "--version"]),
        install_hint: vec!["rustup component add rustfmt".to_string()],
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}
