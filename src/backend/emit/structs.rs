//! Emit the handle type, field getters and constructor of an exported struct.
//!
//! Layout of one struct block, in raw field order:
//!
//! ```text
//! Wrapper_<S>                       handle type
//! Wrapper_<S>_field_<i>             handle type for field i (only when field i is a record)
//! Wrapper_<S>_getter_<i>            getter for exported field i
//! Wrapper_<S>_new                   constructor
//! ```
//!
//! Getters resolve the handle through the runtime registry, which checks liveness and type before any field is
//! read. Non-exported fields produce nothing but keep their raw index.

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use super::super::classify::Classification;
use super::super::diagnostics::DiagnosticKind;
use super::super::naming;
use super::{BindingEmitter, BoundBlock};
use crate::descriptor::{Field, StructDescriptor};

impl<'m> BindingEmitter<'m> {
    /// Emit the block for `record`, or every problem that prevents it.
    pub fn bind_struct(&self, record: &StructDescriptor) -> Result<BoundBlock, Vec<DiagnosticKind>> {
        let name = record.name();
        let record_ty = self.record_path(name).map_err(|e| vec![e])?;
        let handle_symbol = naming::struct_handle(name);
        let handle = Self::symbol_ident(&handle_symbol).map_err(|e| vec![e])?;

        let mut problems = Vec::new();
        let mut items = vec![self.handle_type(&handle, &format!("{}::{}", self.module.name, name))];
        let mut symbols = vec![handle_symbol];

        for field in record.exported_fields() {
            match self.bind_field(name, &record_ty, &handle, field) {
                Ok((tokens, field_symbols)) => {
                    items.push(tokens);
                    symbols.extend(field_symbols);
                }
                Err(e) => problems.push(e),
            }
        }

        if !problems.is_empty() {
            return Err(problems);
        }

        let ctor_symbol = naming::constructor(name);
        let ctor = Self::symbol_ident(&ctor_symbol).map_err(|e| vec![e])?;
        let export = self.export_attr();
        let rt = &self.runtime;
        let doc = format!(" Allocate a zero-valued `{}::{}` and return its handle.", self.module.name, name);
        items.push(quote! {
            #[doc = #doc]
            #export
            pub extern "C" fn #ctor() -> #handle {
                #handle(#rt::handles::insert(<#record_ty as ::core::default::Default>::default()))
            }
        });
        symbols.push(ctor_symbol);

        Ok(BoundBlock {
            tokens: quote! { #(#items)* },
            symbols,
        })
    }

    /// `#[repr(transparent)]` newtype over the runtime handle.
    fn handle_type(&self, ident: &Ident, describes: &str) -> TokenStream {
        let rt = &self.runtime;
        let doc = format!(" Opaque handle to a `{describes}`.");
        quote! {
            #[doc = #doc]
            #[repr(transparent)]
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
            pub struct #ident(pub #rt::Handle);
        }
    }

    /// Field wrapper type (if the field is a record) and getter for one exported field.
    fn bind_field(
        &self,
        struct_name: &str,
        record_ty: &TokenStream,
        handle: &Ident,
        field: &Field,
    ) -> Result<(TokenStream, Vec<String>), DiagnosticKind> {
        let class = self
            .classifier()
            .classify(field.ty())
            .map_err(|err| DiagnosticKind::UnsupportedFieldType {
                field: field.name().to_string(),
                raw_index: field.raw_index(),
                reason: err.to_string(),
            })?;
        let member = Self::member(field.name())?;
        let getter_symbol = naming::getter(struct_name, field.raw_index());
        let getter = Self::symbol_ident(&getter_symbol)?;
        let export = self.export_attr();
        let rt = &self.runtime;
        let or_raise = self.or_raise();
        let doc = format!(" Read `{}.{}`.", struct_name, field.name());

        match &class {
            Classification::ByValue(_) => {
                let ty = self.abi_type(&class)?;
                Ok((
                    quote! {
                        #[doc = #doc]
                        #export
                        pub extern "C" fn #getter(handle: #handle) -> #ty {
                            #rt::handles::with(handle.0, |record: &#record_ty| record.#member) #or_raise
                        }
                    },
                    vec![getter_symbol],
                ))
            }
            Classification::Handle { record, .. } => {
                let field_symbol = naming::field_wrapper(struct_name, field.raw_index());
                let field_handle = Self::symbol_ident(&field_symbol)?;
                let wrapper_type = self.handle_type(&field_handle, &format!("{}::{}", self.module.name, record));
                Ok((
                    quote! {
                        #wrapper_type

                        #[doc = #doc]
                        #export
                        pub extern "C" fn #getter(handle: #handle) -> #field_handle {
                            let value = #rt::handles::with(handle.0, |record: &#record_ty| record.#member.clone()) #or_raise;
                            #field_handle(#rt::handles::insert(value))
                        }
                    },
                    vec![field_symbol, getter_symbol],
                ))
            }
        }
    }

    /// Field access token: a name, or a position for tuple structs.
    fn member(name: &str) -> Result<syn::Member, DiagnosticKind> {
        if let Ok(position) = name.parse::<usize>() {
            return Ok(syn::Member::Unnamed(syn::Index::from(position)));
        }
        Self::ident(name).map(syn::Member::Named)
    }
}
