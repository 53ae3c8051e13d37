//! CLI module for cabind
//!
//! ## Commands
//!
//! - `generate <DESCRIPTOR>` - Generate the binding stub for a JSON module descriptor
//! - `check <DESCRIPTOR>` - Report unsupported items without writing a stub
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::backend::{Edition, GeneratorConfig};
use crate::version::CABIND_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// C-ABI binding stub generator
#[derive(Parser, Debug)]
#[command(name = "cabind")]
#[command(version = CABIND_VERSION)]
#[command(about = "Generate C-ABI binding stubs for Rust modules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the binding stub for a module descriptor
    Generate {
        /// JSON module descriptor
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: PathBuf,
        /// Write the stub here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        #[command(flatten)]
        options: GenerateOptions,
        /// Print diagnostics as JSON on stderr
        #[arg(long)]
        diagnostics_json: bool,
        /// Write the stub even when declarations were skipped
        #[arg(long)]
        keep_partial: bool,
    },

    /// Report unsupported items without writing a stub
    Check {
        /// JSON module descriptor
        #[arg(value_name = "DESCRIPTOR")]
        descriptor: PathBuf,
        /// Print diagnostics as JSON on stdout
        #[arg(long)]
        diagnostics_json: bool,
    },
}

/// Flags that map onto [`GeneratorConfig`].
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateOptions {
    /// Print tokens without prettyplease formatting
    #[arg(long)]
    pub no_format: bool,
    /// Path of the runtime crate in generated code
    #[arg(long, value_name = "PATH", default_value = "::cabind_runtime")]
    pub runtime_crate: String,
    /// Edition the stub is compiled with
    #[arg(long, value_enum, default_value = "2021")]
    pub edition: Edition,
    /// Do not emit the crate-level lint allows
    #[arg(long)]
    pub no_lint_allows: bool,
}

impl GenerateOptions {
    pub fn to_config(&self) -> GeneratorConfig {
        let config = GeneratorConfig::new()
            .with_runtime_crate(self.runtime_crate.clone())
            .with_pretty(!self.no_format)
            .with_edition(self.edition);
        if self.no_lint_allows { config.without_lint_allows() } else { config }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            descriptor,
            output,
            options,
            diagnostics_json,
            keep_partial,
        } => commands::generate(
            &descriptor,
            output.as_deref(),
            &options.to_config(),
            diagnostics_json,
            keep_partial,
        ),
        Command::Check {
            descriptor,
            diagnostics_json,
        } => commands::check(&descriptor, diagnostics_json),
    }
}

// ============================================================================
// Tests
// ============================================================================
