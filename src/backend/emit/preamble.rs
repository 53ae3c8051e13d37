//! Header, string bridge and trailer shared by every stub.

use quote::quote;

use super::super::naming;
use super::{BindingEmitter, EmitError};
use crate::version::CABIND_VERSION;

impl<'m> BindingEmitter<'m> {
    /// Everything before the first wrapper: header comment, lint allows, module import and the bridge exports.
    pub fn preamble_text(&self) -> Result<String, EmitError> {
        let header = format!(
            "// Code generated by cabind v{} for module `{}` ({}). Do not edit.\n",
            CABIND_VERSION, self.module.name, self.module.path
        );

        let allows = if self.config.add_lint_allows {
            quote! {
                #![allow(
                    non_snake_case,
                    non_camel_case_types,
                    dead_code,
                    improper_ctypes_definitions,
                    clippy::missing_safety_doc
                )]
            }
        } else {
            quote! {}
        };

        let m = &self.module_ident;
        let path = &self.module_path;
        // `use m as m;` would be a redefinition
        let import = if self.module.path == self.module.name {
            quote! {}
        } else {
            quote! { use #path as #m; }
        };

        let export = self.export_attr();
        let rt = &self.runtime;
        let or_raise = self.or_raise();
        let from_foreign = Self::bridge_ident(naming::STRING_FROM_FOREIGN)?;
        let to_foreign = Self::bridge_ident(naming::STRING_TO_FOREIGN)?;
        let free = Self::bridge_ident(naming::FREE_FOREIGN_STRING)?;
        let release = Self::bridge_ident(naming::RELEASE_HANDLE)?;

        let tokens = quote! {
            #allows

            #import

            /// Copy a NUL-terminated UTF-8 string into a host `String` and return its handle.
            #export
            pub unsafe extern "C" fn #from_foreign(ptr: *const ::core::ffi::c_char) -> #rt::Handle {
                unsafe { #rt::strings::from_c(ptr) } #or_raise
            }

            /// Allocate a NUL-terminated copy of the host `String` behind `handle`.
            /// Free it with `Wrapper_FreeCString`.
            #export
            pub extern "C" fn #to_foreign(handle: #rt::Handle) -> *mut ::core::ffi::c_char {
                #rt::strings::to_c(handle) #or_raise
            }

            /// Free a string returned by `Wrapper_CString`.
            #export
            pub unsafe extern "C" fn #free(ptr: *mut ::core::ffi::c_char) {
                unsafe { #rt::strings::free_c(ptr) }
            }

            /// Drop the value behind `handle`. Returns `false` if it was not live.
            #export
            pub extern "C" fn #release(handle: #rt::Handle) -> bool {
                #rt::handles::release(handle).is_ok()
            }
        };

        Ok(format!("{header}{}", self.format_tokens(tokens)?))
    }

    /// Everything after the last wrapper: entry stub and the retention item for the bridge.
    pub fn trailer_text(&self) -> Result<String, EmitError> {
        let rt = &self.runtime;
        let from_foreign = Self::bridge_ident(naming::STRING_FROM_FOREIGN)?;
        let to_foreign = Self::bridge_ident(naming::STRING_TO_FOREIGN)?;
        let tokens = quote! {
            #[used]
            static WRAPPER_STRING_BRIDGE: (
                unsafe extern "C" fn(*const ::core::ffi::c_char) -> #rt::Handle,
                extern "C" fn(#rt::Handle) -> *mut ::core::ffi::c_char,
            ) = (#from_foreign, #to_foreign);

            fn main() {}
        };
        self.format_block(tokens)
    }

    fn bridge_ident(symbol: &str) -> Result<proc_macro2::Ident, EmitError> {
        Self::symbol_ident(symbol).map_err(|_| EmitError::SynParse(format!("invalid bridge symbol `{symbol}`")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::config::GeneratorConfig;
    use crate::descriptor::ModuleDescriptor;

    fn exported_fns(text: &str) -> Vec<String> {
        let file = syn::parse_file(text).unwrap();
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_preamble_exports_the_bridge() {
        let module = ModuleDescriptor::new("geometry", "shapes::geometry");
        let config = GeneratorConfig::default();
        let emitter = BindingEmitter::new(&module, &config).unwrap();
        let text = emitter.preamble_text().unwrap();

        assert!(text.starts_with("// Code generated by cabind v"));
        assert!(text.contains("`geometry` (shapes::geometry)"));
        assert!(text.contains("use shapes::geometry as geometry;"));
        assert_eq!(exported_fns(&text), naming::PREAMBLE_SYMBOLS.to_vec());
    }

    #[test]
    fn test_same_name_module_is_not_reimported() {
        let module = ModuleDescriptor::new("geometry", "geometry");
        let config = GeneratorConfig::default().without_lint_allows();
        let emitter = BindingEmitter::new(&module, &config).unwrap();
        let text = emitter.preamble_text().unwrap();
        assert!(!text.contains("use geometry"));
        assert!(!text.contains("#![allow"));
    }

    #[test]
    fn test_trailer_keeps_bridge_alive() {
        let module = ModuleDescriptor::new("geometry", "shapes::geometry");
        let config = GeneratorConfig::default();
        let emitter = BindingEmitter::new(&module, &config).unwrap();
        let text = emitter.trailer_text().unwrap();
        assert!(text.starts_with('\n'));
        assert!(text.contains("#[used]"));
        assert_eq!(exported_fns(&text), vec!["main"]);
    }
}
