//! Emit one `extern "C"` wrapper per exported function.
//!
//! The wrapper keeps the original parameter list (names, order, count) with each type translated to its ABI form,
//! calls the original, and returns its results in order, moving record results into the handle registry.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::super::classify::Classification;
use super::super::diagnostics::DiagnosticKind;
use super::super::naming;
use super::{BindingEmitter, BoundBlock};
use crate::descriptor::FunctionDecl;

impl<'m> BindingEmitter<'m> {
    /// Emit the wrapper for `func`, or every problem that prevents it.
    pub fn bind_function(&self, func: &FunctionDecl) -> Result<BoundBlock, Vec<DiagnosticKind>> {
        let mut problems = Vec::new();

        let symbol = naming::function_wrapper(&func.name);
        let named = Self::ident(&func.name).and_then(|name| Self::symbol_ident(&symbol).map(|wrapper| (name, wrapper)));
        let names = match named {
            Ok(names) => Some(names),
            Err(e) => {
                problems.push(e);
                None
            }
        };

        let mut params = Vec::new();
        let mut args = Vec::new();
        let mut resolves = Vec::new();
        for p in &func.signature.params {
            let class = match self.classifier().classify(&p.ty) {
                Ok(class) => class,
                Err(err) => {
                    problems.push(DiagnosticKind::UnsupportedParameterType {
                        param: p.name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let pname = match Self::ident(&p.name) {
                Ok(pname) => pname,
                Err(e) => {
                    problems.push(e);
                    continue;
                }
            };
            match self.param_tokens(&pname, &class) {
                Ok((param, resolve)) => {
                    params.push(param);
                    resolves.extend(resolve);
                    args.push(pname);
                }
                Err(e) => problems.push(e),
            }
        }

        let mut result_types = Vec::new();
        let mut result_exprs = Vec::new();
        for (i, r) in func.signature.results.iter().enumerate() {
            let class = match self.classifier().classify(&r.ty) {
                Ok(class) => class,
                Err(err) => {
                    problems.push(DiagnosticKind::UnsupportedResultType {
                        index: i,
                        name: r.name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            match self.abi_type(&class) {
                Ok(ty) => {
                    result_exprs.push(self.result_expr(i, &class, &ty));
                    result_types.push(ty);
                }
                Err(e) => problems.push(e),
            }
        }

        let (name, wrapper) = match names {
            Some(names) if problems.is_empty() => names,
            _ => return Err(problems),
        };

        let m = &self.module_ident;
        let call = quote! { #m::#name(#(#args),*) };
        let locals: Vec<_> = (0..result_exprs.len()).map(Self::result_local).collect();

        let (ret_clause, body) = match result_exprs.len() {
            0 => (quote! {}, quote! { #call; }),
            1 => {
                let ty = &result_types[0];
                let local = &locals[0];
                let expr = &result_exprs[0];
                (quote! { -> #ty }, quote! { let #local = #call; #expr })
            }
            _ => (
                quote! { -> (#(#result_types),*) },
                quote! {
                    let (#(#locals),*) = #call;
                    (#(#result_exprs),*)
                },
            ),
        };

        let export = self.export_attr();
        let doc = format!(" Wraps `{}::{}`.", self.module.name, func.name);
        let tokens = quote! {
            #[doc = #doc]
            #export
            pub extern "C" fn #wrapper(#(#params),*) #ret_clause {
                #(#resolves)*
                #body
            }
        };
        Ok(BoundBlock {
            tokens,
            symbols: vec![symbol],
        })
    }

    /// Signature entry for a parameter, and the statement resolving it to a record when it is a handle.
    fn param_tokens(
        &self,
        pname: &proc_macro2::Ident,
        class: &Classification<'_>,
    ) -> Result<(TokenStream, Option<TokenStream>), DiagnosticKind> {
        let ty = self.abi_type(class)?;
        let resolve = match class {
            Classification::ByValue(_) => None,
            Classification::Handle { record, .. } => {
                let rt = &self.runtime;
                let record_ty = self.record_path(record)?;
                let or_raise = self.or_raise();
                Some(quote! {
                    let #pname: #record_ty = #rt::handles::cloned(#pname.0) #or_raise;
                })
            }
        };
        Ok((quote! { #pname: #ty }, resolve))
    }

    /// Synthetic local bound to result `i`.
    fn result_local(i: usize) -> proc_macro2::Ident {
        format_ident!("_ret_{}", i)
    }

    /// The returned expression for result `i`: the local itself, or a fresh handle owning it.
    fn result_expr(&self, i: usize, class: &Classification<'_>, abi_ty: &TokenStream) -> TokenStream {
        let local = Self::result_local(i);
        match class {
            Classification::ByValue(_) => quote! { #local },
            Classification::Handle { .. } => {
                let rt = &self.runtime;
                quote! { #abi_ty(#rt::handles::insert(#local)) }
            }
        }
    }
}
