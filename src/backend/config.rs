//! Generator options.

/// Rust edition the generated stub is compiled with.
///
/// Only the export attribute differs: edition 2024 requires `#[unsafe(no_mangle)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Edition {
    #[default]
    #[value(name = "2021")]
    E2021,
    #[value(name = "2024")]
    E2024,
}

/// Options for one [`BindingGenerator`](super::BindingGenerator).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Path of the runtime crate as written in generated code.
    pub runtime_crate: String,
    /// Format each block with `prettyplease` (otherwise tokens are printed as-is).
    pub pretty: bool,
    /// Emit a crate-level `#![allow(...)]` for the lints positional export names trip.
    pub add_lint_allows: bool,
    pub edition: Edition,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: "::cabind_runtime".to_string(),
            pretty: true,
            add_lint_allows: true,
            edition: Edition::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime_crate(mut self, path: impl Into<String>) -> Self {
        self.runtime_crate = path.into();
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Disable the lint allows (for consumers that configure lints themselves).
    pub fn without_lint_allows(mut self) -> Self {
        self.add_lint_allows = false;
        self
    }

    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = edition;
        self
    }
}
