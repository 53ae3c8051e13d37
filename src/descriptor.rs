//! Module descriptors: the resolved public surface a binding is generated for.
//!
//! Descriptors are built once by a type-information provider (or deserialized from JSON by the CLI) and are
//! read-only afterwards. The generator never mutates them.
//!
//! ## Notes
//!
//! - Declaration order is lexical order and drives output order.
//! - A struct field's raw index is its 1-based position among *all* declared fields (exported or not). It is
//!   assigned when the [`StructDescriptor`] is built and is only readable afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The public surface of one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Local alias of the module inside the generated stub (`use <path> as <name>;`).
    pub name: String,
    /// Rust import path of the module, e.g. `shapes::geometry`.
    pub path: String,
    /// Exported declarations in lexical order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            declarations: Vec::new(),
        }
    }

    /// Parse a descriptor from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.declarations.push(Declaration::Function(function));
        self
    }

    pub fn with_struct(mut self, record: StructDescriptor) -> Self {
        self.declarations.push(Declaration::Struct(record));
        self
    }

    pub fn with_unsupported(mut self, kind: DeclKind, name: impl Into<String>) -> Self {
        self.declarations.push(Declaration::Unsupported {
            kind,
            name: name.into(),
        });
        self
    }

    /// Iterate the struct declarations of this module.
    pub fn structs(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Struct(s) => Some(s),
            _ => None,
        })
    }
}

/// One exported top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Declaration {
    Function(FunctionDecl),
    Struct(StructDescriptor),
    /// Anything the generator does not bind; reported as a diagnostic.
    Unsupported { kind: DeclKind, name: String },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Struct(s) => s.name(),
            Declaration::Unsupported { name, .. } => name,
        }
    }
}

/// Kinds of declarations that have no binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclKind {
    Const,
    Var,
    Interface,
    /// A named type whose underlying shape is not a struct.
    OtherNamedType,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Var => "var",
            DeclKind::Interface => "interface",
            DeclKind::OtherNamedType => "named type",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Functions
// ============================================================================

/// An exported function and its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub signature: FunctionSignature,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: FunctionSignature::default(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature.params.push(Parameter { name: name.into(), ty });
        self
    }

    pub fn result(mut self, ty: TypeRef) -> Self {
        self.signature.results.push(ResultSlot { name: None, ty });
        self
    }

    pub fn named_result(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.signature.results.push(ResultSlot {
            name: Some(name.into()),
            ty,
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub results: Vec<ResultSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
}

/// A function result; results may be unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ty: TypeRef,
}

// ============================================================================
// Structs
// ============================================================================

/// An exported struct with all of its fields in raw declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StructSpec", into = "StructSpec")]
pub struct StructDescriptor {
    name: String,
    fields: Vec<Field>,
}

impl StructDescriptor {
    /// Build a descriptor, assigning each field its 1-based raw index.
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Field {
                name: spec.name,
                ty: spec.ty,
                raw_index: i + 1,
                exported: spec.exported,
            })
            .collect();
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields, exported or not.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn exported_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.exported)
    }
}

/// A struct field. Only readable; see [`StructDescriptor::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    ty: TypeRef,
    raw_index: usize,
    exported: bool,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// 1-based position among all fields of the struct.
    pub fn raw_index(&self) -> usize {
        self.raw_index
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }
}

/// Serialized form of a struct: fields carry no index, their position is the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,
    pub exported: bool,
}

impl FieldSpec {
    pub fn exported(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            exported: true,
        }
    }

    pub fn private(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            exported: false,
        }
    }
}

impl From<StructSpec> for StructDescriptor {
    fn from(spec: StructSpec) -> Self {
        StructDescriptor::new(spec.name, spec.fields)
    }
}

impl From<StructDescriptor> for StructSpec {
    fn from(desc: StructDescriptor) -> Self {
        StructSpec {
            name: desc.name,
            fields: desc
                .fields
                .into_iter()
                .map(|f| FieldSpec {
                    name: f.name,
                    ty: f.ty,
                    exported: f.exported,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// A resolved type as seen at the binding surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRef {
    /// A scalar passed by value.
    Primitive(Primitive),
    /// A struct declared in the same module, referenced by name.
    Record(String),
    /// Any other type; the payload describes it for diagnostics.
    Unsupported(String),
}

impl TypeRef {
    pub fn record(name: impl Into<String>) -> Self {
        TypeRef::Record(name.into())
    }

    pub fn unsupported(description: impl Into<String>) -> Self {
        TypeRef::Unsupported(description.into())
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{p}"),
            TypeRef::Record(name) => write!(f, "{name}"),
            TypeRef::Unsupported(desc) => write!(f, "{desc}"),
        }
    }
}

/// Scalar types that cross the C ABI unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::Bool,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::Isize,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::Usize,
        Primitive::F32,
        Primitive::F64,
    ];

    /// Canonical spelling, which is also the Rust type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Primitive::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("`{s}` is not a primitive type"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_index_counts_private_fields() {
        let s = StructDescriptor::new(
            "Shape",
            [
                FieldSpec::exported("A", Primitive::I64.into()),
                FieldSpec::private("b", Primitive::I64.into()),
                FieldSpec::exported("C", TypeRef::record("Point")),
            ],
        );
        let indices: Vec<_> = s.fields().iter().map(|f| (f.name(), f.raw_index())).collect();
        assert_eq!(indices, vec![("A", 1), ("b", 2), ("C", 3)]);
        let exported: Vec<_> = s.exported_fields().map(Field::raw_index).collect();
        assert_eq!(exported, vec![1, 3]);
    }

    #[test]
    fn test_primitive_spelling_round_trips() {
        for p in Primitive::ALL {
            assert_eq!(p.as_str().parse::<Primitive>().unwrap(), p);
        }
        assert!("String".parse::<Primitive>().is_err());
    }

    #[test]
    fn test_json_form() {
        let json = r#"{
            "name": "geometry",
            "path": "shapes::geometry",
            "declarations": [
                { "function": { "name": "Area", "signature": {
                    "params": [ { "name": "p", "ty": { "record": "Point" } } ],
                    "results": [ { "ty": { "primitive": "f64" } } ] } } },
                { "struct": { "name": "Point", "fields": [
                    { "name": "X", "ty": { "primitive": "f64" }, "exported": true },
                    { "name": "cache", "ty": { "unsupported": "Vec<u8>" }, "exported": false } ] } },
                { "unsupported": { "kind": "other-named-type", "name": "Celsius" } }
            ]
        }"#;
        let module = ModuleDescriptor::from_json(json).unwrap();
        let expected = ModuleDescriptor::new("geometry", "shapes::geometry")
            .with_function(
                FunctionDecl::new("Area")
                    .param("p", TypeRef::record("Point"))
                    .result(Primitive::F64.into()),
            )
            .with_struct(StructDescriptor::new(
                "Point",
                [
                    FieldSpec::exported("X", Primitive::F64.into()),
                    FieldSpec::private("cache", TypeRef::unsupported("Vec<u8>")),
                ],
            ))
            .with_unsupported(DeclKind::OtherNamedType, "Celsius");
        assert_eq!(module, expected);
        assert_eq!(module.structs().next().unwrap().fields()[1].raw_index(), 2);
    }

    #[test]
    fn test_json_round_trip_preserves_indices() {
        let module = ModuleDescriptor::new("m", "m").with_struct(StructDescriptor::new(
            "S",
            [
                FieldSpec::private("a", Primitive::U8.into()),
                FieldSpec::exported("B", Primitive::U8.into()),
            ],
        ));
        let text = serde_json::to_string(&module).unwrap();
        assert!(!text.contains("raw_index"));
        assert_eq!(ModuleDescriptor::from_json(&text).unwrap(), module);
    }
}
