//! Diagnostics collected while generating one module.
//!
//! The generator does not stop at the first unsupported item: every declaration is visited and each problem is
//! recorded as a [`Diagnostic`]. A run with any diagnostic is a failed run, even though the output text contains
//! the wrappers for everything that was supported.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::descriptor::DeclKind;

/// What went wrong, scoped to the item inside the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    #[error("{decl_kind} declarations are not supported")]
    UnsupportedDeclarationKind { decl_kind: DeclKind },

    #[error("field `{field}` (field {raw_index}): {reason}")]
    UnsupportedFieldType {
        field: String,
        raw_index: usize,
        reason: String,
    },

    #[error("parameter `{param}`: {reason}")]
    UnsupportedParameterType { param: String, reason: String },

    #[error("result {index}{}: {reason}", .name.as_deref().map(|n| format!(" `{n}`")).unwrap_or_default())]
    UnsupportedResultType {
        index: usize,
        name: Option<String>,
        reason: String,
    },

    #[error("symbol `{symbol}` is already exported by `{first_owner}`")]
    SymbolCollision { symbol: String, first_owner: String },

    #[error("`{name}` cannot be used as a Rust identifier")]
    InvalidIdentifier { name: String },
}

/// One reported problem, attributed to a top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the declaration the problem belongs to.
    pub declaration: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(declaration: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            declaration: declaration.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.declaration, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// The diagnostics of a failed run, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationErrors(pub Vec<Diagnostic>);

impl GenerationErrors {
    /// `Some` if `diagnostics` is non-empty.
    pub fn from_vec(diagnostics: Vec<Diagnostic>) -> Option<Self> {
        if diagnostics.is_empty() { None } else { Some(Self(diagnostics)) }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl fmt::Display for GenerationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() == 1 {
            write!(f, "{}", self.0[0])
        } else {
            writeln!(f, "{} unsupported items:", self.0.len())?;
            for (i, diag) in self.0.iter().enumerate() {
                writeln!(f, "  {}: {}", i + 1, diag)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for GenerationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_declaration_and_item() {
        let diag = Diagnostic::new(
            "Shape",
            DiagnosticKind::UnsupportedFieldType {
                field: "Tags".to_string(),
                raw_index: 4,
                reason: "type `Vec<String>` has no C ABI representation".to_string(),
            },
        );
        assert_eq!(
            diag.to_string(),
            "`Shape`: field `Tags` (field 4): type `Vec<String>` has no C ABI representation"
        );
    }

    #[test]
    fn test_result_display_with_and_without_name() {
        let unnamed = DiagnosticKind::UnsupportedResultType {
            index: 1,
            name: None,
            reason: "nope".to_string(),
        };
        assert_eq!(unnamed.to_string(), "result 1: nope");
        let named = DiagnosticKind::UnsupportedResultType {
            index: 0,
            name: Some("err".to_string()),
            reason: "nope".to_string(),
        };
        assert_eq!(named.to_string(), "result 0 `err`: nope");
    }

    #[test]
    fn test_declaration_kind_display() {
        let kind = DiagnosticKind::UnsupportedDeclarationKind {
            decl_kind: DeclKind::Interface,
        };
        assert_eq!(kind.to_string(), "interface declarations are not supported");
    }

    #[test]
    fn test_serializes_flat() {
        let diag = Diagnostic::new(
            "Reader",
            DiagnosticKind::UnsupportedDeclarationKind {
                decl_kind: DeclKind::Interface,
            },
        );
        let value = serde_json::to_value(&diag).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!({
                "declaration": "Reader",
                "kind": "unsupported_declaration_kind",
                "decl_kind": "interface"
            })
        );
    }

    #[test]
    fn test_errors_from_empty_vec() {
        assert!(GenerationErrors::from_vec(Vec::new()).is_none());
    }
}
