//! End-to-end tests for stub generation
//!
//! Each test builds a module descriptor, generates its stub, and inspects the output through `syn` so assertions
//! hold regardless of formatting details.

use cabind::backend::{BindingGenerator, DiagnosticKind, Edition, GeneratorConfig};
use cabind::descriptor::{DeclKind, FieldSpec, FunctionDecl, ModuleDescriptor, Primitive, StructDescriptor, TypeRef};
use quote::ToTokens;

fn parse(source: &str) -> syn::File {
    syn::parse_file(source).unwrap_or_else(|e| panic!("generated stub does not parse: {e}\n{source}"))
}

fn find_fn<'f>(file: &'f syn::File, name: &str) -> Option<&'f syn::ItemFn> {
    file.items.iter().find_map(|item| match item {
        syn::Item::Fn(f) if f.sig.ident == name => Some(f),
        _ => None,
    })
}

fn fn_names(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn struct_names(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Struct(s) => Some(s.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn tokens(node: &impl ToTokens) -> String {
    node.to_token_stream().to_string()
}

fn geometry() -> ModuleDescriptor {
    ModuleDescriptor::new("geometry", "shapes::geometry")
        .with_function(
            FunctionDecl::new("Area")
                .param("p", TypeRef::record("Point"))
                .result(Primitive::F64.into()),
        )
        .with_struct(StructDescriptor::new(
            "Point",
            [
                FieldSpec::exported("X", Primitive::F64.into()),
                FieldSpec::exported("Y", Primitive::F64.into()),
            ],
        ))
}

#[test]
fn test_empty_module_is_preamble_plus_trailer() {
    let module = ModuleDescriptor::new("geometry", "shapes::geometry");
    let generator = BindingGenerator::new();
    let out = generator.generate(&module).unwrap();

    assert!(out.is_success());
    let expected = format!(
        "{}{}",
        generator.preamble(&module).unwrap(),
        generator.trailer(&module).unwrap()
    );
    assert_eq!(out.source, expected);
    parse(&out.source);
}

#[test]
fn test_nullary_function() {
    let module = ModuleDescriptor::new("m", "m").with_function(FunctionDecl::new("Reset"));
    let out = BindingGenerator::new().generate(&module).unwrap();
    let file = parse(&out.source);

    let f = find_fn(&file, "Wrapper_Reset").unwrap();
    assert!(f.sig.inputs.is_empty());
    assert!(matches!(f.sig.output, syn::ReturnType::Default));
    assert_eq!(f.block.stmts.len(), 1);
    assert_eq!(tokens(&f.block.stmts[0]), "m :: Reset () ;");
}

#[test]
fn test_two_results_become_a_tuple() {
    let module = geometry().with_function(
        FunctionDecl::new("Split")
            .param("n", Primitive::I32.into())
            .named_result("count", Primitive::I32.into())
            .named_result("origin", TypeRef::record("Point")),
    );
    let out = BindingGenerator::new().generate(&module).unwrap();
    assert!(out.is_success(), "{:?}", out.diagnostics());
    let file = parse(&out.source);

    let f = find_fn(&file, "Wrapper_Split").unwrap();
    assert_eq!(tokens(&f.sig.output), "-> (i32 , Wrapper_Point)");

    let Some(syn::Stmt::Expr(syn::Expr::Tuple(ret), None)) = f.block.stmts.last() else {
        panic!("expected a tuple tail expression");
    };
    let elems: Vec<String> = ret.elems.iter().map(tokens).collect();
    assert_eq!(elems[0], "_ret_0");
    assert!(elems[1].starts_with("Wrapper_Point ("), "{}", elems[1]);
    assert!(elems[1].contains("_ret_1"), "{}", elems[1]);
}

#[test]
fn test_record_parameter_and_scalar_result() {
    let out = BindingGenerator::new().generate(&geometry()).unwrap();
    let file = parse(&out.source);

    let f = find_fn(&file, "Wrapper_Area").unwrap();
    assert_eq!(tokens(&f.sig.inputs), "p : Wrapper_Point");
    assert_eq!(tokens(&f.sig.output), "-> f64");
    let body = tokens(&f.block);
    assert!(body.contains("handles :: cloned (p . 0)"), "{body}");
    assert!(body.contains("geometry :: Area (p)"), "{body}");
}

#[test]
fn test_struct_getters_skip_private_fields() {
    let module = ModuleDescriptor::new("m", "m")
        .with_struct(StructDescriptor::new(
            "Shape",
            [
                FieldSpec::exported("A", Primitive::I64.into()),
                FieldSpec::private("b", Primitive::I64.into()),
                FieldSpec::exported("C", TypeRef::record("Other")),
            ],
        ))
        .with_struct(StructDescriptor::new("Other", Vec::<FieldSpec>::new()));
    let out = BindingGenerator::new().generate(&module).unwrap();
    assert!(out.is_success(), "{:?}", out.diagnostics());
    let file = parse(&out.source);

    let names = fn_names(&file);
    assert!(names.contains(&"Wrapper_Shape_getter_1".to_string()));
    assert!(names.contains(&"Wrapper_Shape_getter_3".to_string()));
    assert!(!names.contains(&"Wrapper_Shape_getter_2".to_string()));

    let structs = struct_names(&file);
    assert!(structs.contains(&"Wrapper_Shape_field_3".to_string()));
    assert!(!structs.contains(&"Wrapper_Shape_field_1".to_string()));

    let g1 = find_fn(&file, "Wrapper_Shape_getter_1").unwrap();
    assert_eq!(tokens(&g1.sig.output), "-> i64");
    let g3 = find_fn(&file, "Wrapper_Shape_getter_3").unwrap();
    assert_eq!(tokens(&g3.sig.output), "-> Wrapper_Shape_field_3");
}

#[test]
fn test_constructor_for_fieldless_struct() {
    let module = ModuleDescriptor::new("m", "m").with_struct(StructDescriptor::new("Unit", Vec::<FieldSpec>::new()));
    let out = BindingGenerator::new().generate(&module).unwrap();
    let file = parse(&out.source);

    let ctor = find_fn(&file, "Wrapper_Unit_new").unwrap();
    assert!(ctor.sig.inputs.is_empty());
    assert_eq!(tokens(&ctor.sig.output), "-> Wrapper_Unit");
    assert!(tokens(&ctor.block).contains("Default > :: default ()"));
    assert_eq!(fn_names(&file).iter().filter(|n| n.starts_with("Wrapper_Unit")).count(), 1);
}

#[test]
fn test_generation_is_deterministic() {
    let module = geometry()
        .with_unsupported(DeclKind::Interface, "Drawable")
        .with_function(FunctionDecl::new("Scale").param("k", Primitive::F32.into()));
    let generator = BindingGenerator::new();
    let first = generator.generate(&module).unwrap();
    let second = generator.generate(&module).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_interface_is_reported_and_function_still_emitted() {
    let module = ModuleDescriptor::new("m", "m")
        .with_unsupported(DeclKind::Interface, "Reader")
        .with_function(FunctionDecl::new("Ping"));
    let out = BindingGenerator::new().generate(&module).unwrap();

    assert!(!out.is_success());
    assert_eq!(out.diagnostics().len(), 1);
    let diag = &out.diagnostics()[0];
    assert_eq!(diag.declaration, "Reader");
    assert_eq!(
        diag.kind,
        DiagnosticKind::UnsupportedDeclarationKind {
            decl_kind: DeclKind::Interface
        }
    );
    assert!(find_fn(&parse(&out.source), "Wrapper_Ping").is_some());
}

#[test]
fn test_unsupported_items_do_not_stop_the_run() {
    let module = ModuleDescriptor::new("m", "m")
        .with_function(FunctionDecl::new("Open").param("path", TypeRef::unsupported("&Path")))
        .with_unsupported(DeclKind::Const, "Limit")
        .with_struct(StructDescriptor::new(
            "File",
            [FieldSpec::exported("Name", TypeRef::unsupported("String"))],
        ))
        .with_function(FunctionDecl::new("Close"));
    let out = BindingGenerator::new().generate(&module).unwrap();

    let declarations: Vec<&str> = out.diagnostics().iter().map(|d| d.declaration.as_str()).collect();
    assert_eq!(declarations, vec!["Open", "Limit", "File"]);

    let file = parse(&out.source);
    assert!(find_fn(&file, "Wrapper_Close").is_some());
    assert!(find_fn(&file, "Wrapper_Open").is_none());
    assert!(!struct_names(&file).contains(&"Wrapper_File".to_string()));
}

#[test]
fn test_edition_2024_uses_unsafe_attribute() {
    let config = GeneratorConfig::new().with_edition(Edition::E2024);
    let out = BindingGenerator::with_config(config).generate(&geometry()).unwrap();
    let file = parse(&out.source);
    let f = find_fn(&file, "Wrapper_Area").unwrap();
    assert!(f.attrs.iter().any(|a| tokens(a) == "# [unsafe (no_mangle)]"));
    assert!(!out.source.contains("#[no_mangle]"));
}

#[test]
fn test_unformatted_output_still_parses() {
    let config = GeneratorConfig::new().with_pretty(false).with_runtime_crate("crate::rt");
    let out = BindingGenerator::with_config(config).generate(&geometry()).unwrap();
    let file = parse(&out.source);
    assert!(find_fn(&file, "Wrapper_Point_getter_1").is_some());
    assert!(out.source.contains("crate :: rt :: handles"));
}

#[test]
fn test_keyword_names_are_escaped() {
    let module = ModuleDescriptor::new("m", "m")
        .with_function(FunctionDecl::new("Move").param("type", Primitive::U8.into()))
        .with_struct(StructDescriptor::new("Token", [FieldSpec::exported("loop", Primitive::Bool.into())]));
    let out = BindingGenerator::new().generate(&module).unwrap();
    assert!(out.is_success(), "{:?}", out.diagnostics());
    let file = parse(&out.source);
    assert_eq!(tokens(&find_fn(&file, "Wrapper_Move").unwrap().sig.inputs), "r#type : u8");
}

#[test]
fn test_descriptor_from_json_fixture() {
    let text = include_str!("fixtures/geometry.json");
    let module = ModuleDescriptor::from_json(text).unwrap();
    let out = BindingGenerator::new().generate(&module).unwrap();

    let file = parse(&out.source);
    for name in [
        "Wrapper_Area",
        "Wrapper_Translate",
        "Wrapper_Point_getter_1",
        "Wrapper_Point_getter_2",
        "Wrapper_Point_new",
        "Wrapper_Segment_getter_1",
        "Wrapper_Segment_getter_3",
        "Wrapper_Segment_new",
    ] {
        assert!(find_fn(&file, name).is_some(), "missing {name}");
    }
    let kinds: Vec<_> = out.diagnostics().iter().map(|d| d.declaration.as_str()).collect();
    assert_eq!(kinds, vec!["Origin", "Shape"]);
}
