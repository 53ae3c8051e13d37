//! Export symbol names.
//!
//! Names are plain concatenations of the declaration names and a field's raw index, so a foreign caller can
//! compute them without any table:
//!
//! | Entity | Name |
//! |---|---|
//! | function wrapper | `Wrapper_<Func>` |
//! | struct handle type | `Wrapper_<Struct>` |
//! | field wrapper type | `Wrapper_<Struct>_field_<rawIndex>` |
//! | field getter | `Wrapper_<Struct>_getter_<rawIndex>` |
//! | constructor | `Wrapper_<Struct>_new` |
//!
//! Uniqueness follows from unique declaration names, except where a function name happens to spell a struct's
//! derived symbol (a function `Point_new` next to a struct `Point`). [`SymbolTable`] catches those at emission time.

use std::collections::HashMap;

use super::diagnostics::DiagnosticKind;

pub const PREFIX: &str = "Wrapper";

/// Foreign string → host `String` handle.
pub const STRING_FROM_FOREIGN: &str = "Wrapper_RustString";
/// Host `String` handle → foreign string.
pub const STRING_TO_FOREIGN: &str = "Wrapper_CString";
/// Frees a string returned by [`STRING_TO_FOREIGN`].
pub const FREE_FOREIGN_STRING: &str = "Wrapper_FreeCString";
/// Drops any handle.
pub const RELEASE_HANDLE: &str = "Wrapper_Release";

/// Symbols every stub exports from its preamble.
pub const PREAMBLE_SYMBOLS: [&str; 4] = [STRING_FROM_FOREIGN, STRING_TO_FOREIGN, FREE_FOREIGN_STRING, RELEASE_HANDLE];

/// Owner recorded for the preamble symbols in a [`SymbolTable`].
pub const PREAMBLE_OWNER: &str = "<preamble>";

pub fn function_wrapper(func: &str) -> String {
    format!("{PREFIX}_{func}")
}

pub fn struct_handle(record: &str) -> String {
    format!("{PREFIX}_{record}")
}

pub fn field_wrapper(record: &str, raw_index: usize) -> String {
    format!("{PREFIX}_{record}_field_{raw_index}")
}

pub fn getter(record: &str, raw_index: usize) -> String {
    format!("{PREFIX}_{record}_getter_{raw_index}")
}

pub fn constructor(record: &str) -> String {
    format!("{PREFIX}_{record}_new")
}

/// Symbols already claimed in one generated artifact, with the declaration that claimed each.
#[derive(Debug, Default)]
pub struct SymbolTable {
    owners: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the preamble exports already claimed.
    pub fn with_preamble() -> Self {
        let mut table = Self::new();
        for symbol in PREAMBLE_SYMBOLS {
            table.owners.insert(symbol.to_string(), PREAMBLE_OWNER.to_string());
        }
        table
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.owners.contains_key(symbol)
    }

    /// Claim every symbol of one declaration, or none of them.
    ///
    /// Fails on the first symbol (in the given order) that is already claimed, either by an earlier declaration
    /// or earlier in `symbols` itself.
    pub fn claim_all(&mut self, owner: &str, symbols: &[String]) -> Result<(), DiagnosticKind> {
        for (i, symbol) in symbols.iter().enumerate() {
            if let Some(first_owner) = self.owners.get(symbol) {
                return Err(DiagnosticKind::SymbolCollision {
                    symbol: symbol.clone(),
                    first_owner: first_owner.clone(),
                });
            }
            if symbols[..i].contains(symbol) {
                return Err(DiagnosticKind::SymbolCollision {
                    symbol: symbol.clone(),
                    first_owner: owner.to_string(),
                });
            }
        }
        for symbol in symbols {
            self.owners.insert(symbol.clone(), owner.to_string());
        }
        Ok(())
    }
}
