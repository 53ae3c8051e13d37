//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io;
use std::path::Path;

use crate::backend::{BindingGenerator, Diagnostic, GeneratorConfig};
use crate::descriptor::ModuleDescriptor;

use super::{CliError, CliResult, ExitCode};

/// Maximum descriptor file size (100 MB)
const MAX_DESCRIPTOR_SIZE: u64 = 100 * 1024 * 1024;

/// Read and parse a JSON module descriptor.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_DESCRIPTOR_SIZE` (100 MB)
/// - The contents are not a valid descriptor
pub fn read_descriptor(path: &Path) -> CliResult<ModuleDescriptor> {
    let shown = path.display();
    let metadata =
        fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", shown, e)))?;

    if metadata.len() > MAX_DESCRIPTOR_SIZE {
        return Err(CliError::failure(format!(
            "Descriptor '{}' is too large ({} bytes, max {} bytes)",
            shown,
            metadata.len(),
            MAX_DESCRIPTOR_SIZE
        )));
    }

    let text =
        fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", shown, e)))?;
    ModuleDescriptor::from_json(&text).map_err(|e| CliError::failure(format!("Invalid descriptor '{}': {}", shown, e)))
}

/// Generate the stub for `descriptor`.
///
/// A run that reports diagnostics fails with `FAILURE` and produces no stub: nothing is printed, and a stale stub
/// left at `output` by an earlier run is removed. `keep_partial` writes the partial text anyway; the exit code is
/// still `FAILURE`.
#[tracing::instrument(skip(config))]
pub fn generate(
    descriptor: &Path,
    output: Option<&Path>,
    config: &GeneratorConfig,
    diagnostics_json: bool,
    keep_partial: bool,
) -> CliResult<ExitCode> {
    let module = read_descriptor(descriptor)?;
    let generated = BindingGenerator::with_config(config.clone())
        .generate(&module)
        .map_err(|e| CliError::failure(format!("Code generation error: {}", e)))?;

    let emit = generated.is_success() || keep_partial;
    match output {
        Some(out) if emit => write_output(out, &generated.source)?,
        Some(out) => remove_stale_output(out)?,
        None if emit => print!("{}", generated.source),
        None => {}
    }

    if diagnostics_json {
        eprintln!("{}", diagnostics_to_json(generated.diagnostics())?);
    } else {
        print_diagnostics(generated.diagnostics());
    }

    Ok(exit_code(generated.diagnostics()))
}

/// Report the diagnostics `generate` would produce, without writing a stub.
#[tracing::instrument]
pub fn check(descriptor: &Path, diagnostics_json: bool) -> CliResult<ExitCode> {
    let module = read_descriptor(descriptor)?;
    let generated = BindingGenerator::new()
        .generate(&module)
        .map_err(|e| CliError::failure(format!("Code generation error: {}", e)))?;

    if diagnostics_json {
        println!("{}", diagnostics_to_json(generated.diagnostics())?);
    } else if generated.is_success() {
        println!("✓ {} declarations, no unsupported items", module.declarations.len());
    } else {
        print_diagnostics(generated.diagnostics());
    }

    Ok(exit_code(generated.diagnostics()))
}

fn write_output(path: &Path, source: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CliError::failure(format!("Cannot create directory '{}': {}", parent.display(), e)))?;
    }
    fs::write(path, source).map_err(|e| CliError::failure(format!("Error writing '{}': {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), "wrote stub");
    Ok(())
}

fn remove_stale_output(path: &Path) -> CliResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "removed stale stub");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CliError::failure(format!("Cannot remove stale '{}': {}", path.display(), e))),
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("error: {}", diag);
    }
    if !diagnostics.is_empty() {
        eprintln!("{} unsupported item(s)", diagnostics.len());
    }
}

fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> CliResult<String> {
    serde_json::to_string_pretty(diagnostics)
        .map_err(|e| CliError::failure(format!("Cannot serialize diagnostics: {}", e)))
}

fn exit_code(diagnostics: &[Diagnostic]) -> ExitCode {
    if diagnostics.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
