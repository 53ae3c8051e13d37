//! Emit binding stubs as Rust source.
//!
//! This module defines [`BindingEmitter`] and wires together the submodules that build the token blocks of one
//! stub. The driver decides *what* to emit and in which order; the emitter only knows *how*.
//!
//! ## Notes
//! - Every block is built with `quote!`, parsed back with `syn` (so malformed output is an error, never text) and
//!   formatted with `prettyplease`.
//! - Per-declaration problems come back as [`DiagnosticKind`]s, all of them for the declaration at once.
//!
//! ## See also
//! - [`functions`]: function wrappers
//! - [`structs`]: handle types, getters and constructors
//! - [`preamble`]: header, string bridge and trailer

mod errors;
mod functions;
mod preamble;
mod structs;

pub use errors::EmitError;

use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, format_ident, quote};

use super::classify::{Classification, TypeClassifier};
use super::config::{Edition, GeneratorConfig};
use super::diagnostics::DiagnosticKind;
use crate::descriptor::ModuleDescriptor;

/// Reserved + strict keywords in Rust.
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Tokens for one declaration, plus every symbol they export.
#[derive(Debug, Clone)]
pub struct BoundBlock {
    pub tokens: TokenStream,
    pub symbols: Vec<String>,
}

/// Builds the token blocks of one module's stub.
pub struct BindingEmitter<'m> {
    module: &'m ModuleDescriptor,
    config: &'m GeneratorConfig,
    classifier: TypeClassifier<'m>,
    /// Local alias of the bound module in generated code.
    module_ident: Ident,
    module_path: syn::Path,
    runtime: syn::Path,
}

impl<'m> BindingEmitter<'m> {
    pub fn new(module: &'m ModuleDescriptor, config: &'m GeneratorConfig) -> Result<Self, EmitError> {
        let module_ident =
            Self::ident(&module.name).map_err(|_| EmitError::InvalidModuleName(module.name.clone()))?;
        let module_path = Self::parse_path(&module.path)?;
        let runtime = Self::parse_path(&config.runtime_crate)?;
        Ok(Self {
            module,
            config,
            classifier: TypeClassifier::new(module),
            module_ident,
            module_path,
            runtime,
        })
    }

    pub fn classifier(&self) -> &TypeClassifier<'m> {
        &self.classifier
    }

    /// Validate and format one block for appending after the preamble.
    ///
    /// The returned text starts with a blank line separating it from whatever precedes it.
    pub fn format_block(&self, tokens: TokenStream) -> Result<String, EmitError> {
        Ok(format!("\n{}", self.format_tokens(tokens)?))
    }

    fn format_tokens(&self, tokens: TokenStream) -> Result<String, EmitError> {
        let file: syn::File = syn::parse2(tokens).map_err(|e| EmitError::SynParse(e.to_string()))?;
        if self.config.pretty {
            Ok(prettyplease::unparse(&file))
        } else {
            Ok(format!("{}\n", file.to_token_stream()))
        }
    }

    fn parse_path(path: &str) -> Result<syn::Path, EmitError> {
        syn::parse_str(path).map_err(|_| EmitError::InvalidPath(path.to_string()))
    }

    /// Attribute that exports a function under its own name.
    fn export_attr(&self) -> TokenStream {
        match self.config.edition {
            Edition::E2021 => quote! { #[no_mangle] },
            Edition::E2024 => quote! { #[unsafe(no_mangle)] },
        }
    }

    /// Escape Rust keywords by adding `r#` prefix.
    ///
    /// Note: `self`, `Self`, `super`, `crate` cannot be raw identifiers; they are rejected by [`Self::ident`].
    fn escape_keyword(name: &str) -> String {
        if RUST_KEYWORDS.contains(&name) && !matches!(name, "crate" | "super") {
            return format!("r#{}", name);
        }
        name.to_string()
    }

    /// Identifier for a declared name (declaration, field, parameter).
    fn ident(name: &str) -> Result<Ident, DiagnosticKind> {
        syn::parse_str::<Ident>(&Self::escape_keyword(name)).map_err(|_| DiagnosticKind::InvalidIdentifier {
            name: name.to_string(),
        })
    }

    /// Identifier for a derived export symbol.
    fn symbol_ident(symbol: &str) -> Result<Ident, DiagnosticKind> {
        syn::parse_str::<Ident>(symbol).map_err(|_| DiagnosticKind::InvalidIdentifier {
            name: symbol.to_string(),
        })
    }

    /// `<module>::<Record>`
    fn record_path(&self, record: &str) -> Result<TokenStream, DiagnosticKind> {
        let m = &self.module_ident;
        let r = Self::ident(record)?;
        Ok(quote! { #m::#r })
    }

    /// The type a classified value has in an exported signature.
    fn abi_type(&self, class: &Classification<'_>) -> Result<TokenStream, DiagnosticKind> {
        match class {
            Classification::ByValue(p) => {
                let p = format_ident!("{}", p.as_str());
                Ok(quote! { #p })
            }
            Classification::Handle { handle_type, .. } => {
                let h = Self::symbol_ident(handle_type)?;
                Ok(quote! { #h })
            }
        }
    }

    /// `.unwrap_or_else(|err| <runtime>::raise(err))`
    fn or_raise(&self) -> TokenStream {
        let rt = &self.runtime;
        quote! { .unwrap_or_else(|err| #rt::raise(err)) }
    }
}
