//! Generate the stub for `fixtures/geometry.json` into `OUT_DIR`.
//!
//! The stub is emitted for edition 2024 (`#[unsafe(no_mangle)]`) and without crate-level lint allows, since
//! `src/lib.rs` includes it inside a module.

use std::env;
use std::fs;
use std::path::PathBuf;

use cabind::backend::{BindingGenerator, Edition, GeneratorConfig};
use cabind::descriptor::ModuleDescriptor;

const DESCRIPTOR: &str = "fixtures/geometry.json";

fn main() {
    println!("cargo::rerun-if-changed={DESCRIPTOR}");

    let text = fs::read_to_string(DESCRIPTOR).unwrap_or_else(|e| panic!("cannot read {DESCRIPTOR}: {e}"));
    let module = ModuleDescriptor::from_json(&text).unwrap_or_else(|e| panic!("invalid {DESCRIPTOR}: {e}"));

    let config = GeneratorConfig::new()
        .without_lint_allows()
        .with_edition(Edition::E2024);
    let source = BindingGenerator::with_config(config)
        .generate(&module)
        .unwrap_or_else(|e| panic!("cannot generate the {} stub: {e}", module.name))
        .into_result()
        .unwrap_or_else(|errors| panic!("{DESCRIPTOR} has unsupported items:\n{errors}"));

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_else(|| panic!("OUT_DIR is not set")));
    let path = out_dir.join("geometry_stub.rs");
    fs::write(&path, source).unwrap_or_else(|e| panic!("cannot write {}: {e}", path.display()));
}
