//! Binding generation entry point.
//!
//! [`BindingGenerator::generate`] visits every declaration of a module once, in lexical order, and assembles the
//! stub:
//!
//! 1. preamble
//! 2. function wrappers, in declaration order
//! 3. struct blocks, in declaration order
//! 4. trailer
//!
//! Functions and structs are collected into separate sinks while walking, so a struct declared before a function
//! still lands after it. A declaration that cannot be bound contributes diagnostics and no text; the walk
//! continues with the next one.

use tracing::debug;

use super::config::GeneratorConfig;
use super::diagnostics::{Diagnostic, DiagnosticKind, GenerationErrors};
use super::emit::{BindingEmitter, BoundBlock, EmitError};
use super::naming::SymbolTable;
use crate::descriptor::{Declaration, ModuleDescriptor};

/// Whole-run failure of [`BindingGenerator::generate`].
pub type GenerateError = EmitError;

/// Output of one run: the stub text and every problem found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    /// `true` if no diagnostic was reported.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The source text, or the diagnostics when there are any.
    pub fn into_result(self) -> Result<String, GenerationErrors> {
        match GenerationErrors::from_vec(self.diagnostics) {
            Some(errors) => Err(errors),
            None => Ok(self.source),
        }
    }
}

/// Generates C-ABI binding stubs.
#[derive(Debug, Clone, Default)]
pub struct BindingGenerator {
    config: GeneratorConfig,
}

impl BindingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the stub for `module`.
    ///
    /// ## Errors
    ///
    /// Only whole-run failures: an unusable module name or path, an unusable runtime path, or generated tokens that
    /// do not parse. Unsupported declarations are reported in [`Generated::diagnostics`] instead.
    #[tracing::instrument(skip_all, fields(module = %module.name, decl_count = module.declarations.len()))]
    pub fn generate(&self, module: &ModuleDescriptor) -> Result<Generated, GenerateError> {
        let emitter = BindingEmitter::new(module, &self.config)?;
        let mut symbols = SymbolTable::with_preamble();
        let mut diagnostics = Vec::new();
        let mut function_text = String::new();
        let mut struct_text = String::new();

        for decl in &module.declarations {
            let name = decl.name();
            let (bound, sink) = match decl {
                Declaration::Function(func) => {
                    debug!(function = %name, params = func.signature.params.len(), "binding function");
                    (emitter.bind_function(func), &mut function_text)
                }
                Declaration::Struct(record) => {
                    debug!(record = %name, fields = record.fields().len(), "binding struct");
                    (emitter.bind_struct(record), &mut struct_text)
                }
                Declaration::Unsupported { kind, .. } => {
                    report(
                        &mut diagnostics,
                        name,
                        vec![DiagnosticKind::UnsupportedDeclarationKind { decl_kind: *kind }],
                    );
                    continue;
                }
            };

            match bound {
                Ok(BoundBlock { tokens, symbols: exported }) => match symbols.claim_all(name, &exported) {
                    Ok(()) => sink.push_str(&emitter.format_block(tokens)?),
                    Err(collision) => report(&mut diagnostics, name, vec![collision]),
                },
                Err(problems) => report(&mut diagnostics, name, problems),
            }
        }

        let mut source = emitter.preamble_text()?;
        source.push_str(&function_text);
        source.push_str(&struct_text);
        source.push_str(&emitter.trailer_text()?);

        debug!(bytes = source.len(), diagnostics = diagnostics.len(), "generated stub");
        Ok(Generated { source, diagnostics })
    }

    /// The preamble `generate` would emit for `module`.
    pub fn preamble(&self, module: &ModuleDescriptor) -> Result<String, GenerateError> {
        BindingEmitter::new(module, &self.config)?.preamble_text()
    }

    /// The trailer `generate` would emit for `module`.
    pub fn trailer(&self, module: &ModuleDescriptor) -> Result<String, GenerateError> {
        BindingEmitter::new(module, &self.config)?.trailer_text()
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, declaration: &str, problems: Vec<DiagnosticKind>) {
    for kind in problems {
        let diag = Diagnostic::new(declaration, kind);
        debug!(declaration, "{diag}");
        diagnostics.push(diag);
    }
}
