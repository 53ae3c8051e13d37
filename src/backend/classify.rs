//! Decide how each type crosses the ABI boundary.
//!
//! Scalars pass by value under their canonical spelling. Records declared in the module pass behind an opaque
//! handle whose exported type is `Wrapper_<Record>`. Everything else fails classification and is reported by the
//! binder that asked.
//!
//! Records are never expanded inline into their fields; a record is always exactly one handle.

use std::collections::HashSet;

use thiserror::Error;

use super::naming;
use crate::descriptor::{ModuleDescriptor, Primitive, TypeRef};

/// Why a type has no binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("type `{0}` has no C ABI representation")]
    Unsupported(String),

    #[error("record `{0}` is not a struct declared in this module")]
    UnknownRecord(String),
}

/// How a classified type is represented at the ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'t> {
    /// Passed as the scalar itself.
    ByValue(Primitive),
    /// Passed as an opaque handle to a registered record.
    Handle {
        record: &'t str,
        /// Exported handle type, `Wrapper_<record>`.
        handle_type: String,
    },
}

/// Whether values of `ty` must be represented behind an opaque handle.
pub fn needs_wrap(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::Record(_))
}

/// Classifies type references against the structs one module declares.
#[derive(Debug, Clone)]
pub struct TypeClassifier<'m> {
    records: HashSet<&'m str>,
}

impl<'m> TypeClassifier<'m> {
    pub fn new(module: &'m ModuleDescriptor) -> Self {
        Self {
            records: module.structs().map(|s| s.name()).collect(),
        }
    }

    /// Whether `name` is a struct of this module.
    pub fn is_record(&self, name: &str) -> bool {
        self.records.contains(name)
    }

    pub fn classify<'t>(&self, ty: &'t TypeRef) -> Result<Classification<'t>, ClassifyError> {
        match ty {
            TypeRef::Primitive(p) => Ok(Classification::ByValue(*p)),
            TypeRef::Record(name) if self.is_record(name) => Ok(Classification::Handle {
                record: name,
                handle_type: naming::struct_handle(name),
            }),
            TypeRef::Record(name) => Err(ClassifyError::UnknownRecord(name.clone())),
            TypeRef::Unsupported(desc) => Err(ClassifyError::Unsupported(desc.clone())),
        }
    }

    /// Name of the type used for `ty` in exported signatures.
    pub fn exported_type_name(&self, ty: &TypeRef) -> Result<String, ClassifyError> {
        Ok(match self.classify(ty)? {
            Classification::ByValue(p) => p.as_str().to_string(),
            Classification::Handle { handle_type, .. } => handle_type,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldSpec, StructDescriptor};

    fn module() -> ModuleDescriptor {
        ModuleDescriptor::new("geometry", "shapes::geometry")
            .with_struct(StructDescriptor::new("Point", [FieldSpec::exported("X", Primitive::F64.into())]))
    }

    #[test]
    fn test_needs_wrap() {
        assert!(needs_wrap(&TypeRef::record("Point")));
        assert!(!needs_wrap(&Primitive::I32.into()));
    }

    #[test]
    fn test_primitive_keeps_canonical_spelling() {
        let module = module();
        let classifier = TypeClassifier::new(&module);
        for p in Primitive::ALL {
            assert_eq!(classifier.exported_type_name(&p.into()).unwrap(), p.as_str());
        }
    }

    #[test]
    fn test_record_gets_handle_type() {
        let module = module();
        let classifier = TypeClassifier::new(&module);
        let ty = TypeRef::record("Point");
        assert_eq!(classifier.exported_type_name(&ty).unwrap(), "Wrapper_Point");
        assert_eq!(
            classifier.classify(&ty).unwrap(),
            Classification::Handle {
                record: "Point",
                handle_type: "Wrapper_Point".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_type_fails() {
        let module = module();
        let classifier = TypeClassifier::new(&module);
        assert_eq!(
            classifier.exported_type_name(&TypeRef::unsupported("Vec<u8>")),
            Err(ClassifyError::Unsupported("Vec<u8>".to_string()))
        );
    }

    #[test]
    fn test_undeclared_record_fails() {
        let module = module();
        let classifier = TypeClassifier::new(&module);
        assert_eq!(
            classifier.classify(&TypeRef::record("Circle")),
            Err(ClassifyError::UnknownRecord("Circle".to_string()))
        );
    }
}
