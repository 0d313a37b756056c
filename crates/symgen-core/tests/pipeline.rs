//! End-to-end pipeline tests over the in-memory provider

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use symgen_core::config::{GenerationFlags, Transformation};
use symgen_core::{Generator, Severity};

use common::{configuration, enumeration, global, udt, MemoryProvider};

fn read_emitted(files: &[std::path::PathBuf], file_name: &str) -> String
{
    let path = files
        .iter()
        .find(|path| path.file_name().and_then(|name| name.to_str()) == Some(file_name))
        .unwrap_or_else(|| panic!("no emitted file named {file_name}: {files:?}"));
    fs::read_to_string(path).unwrap()
}

fn has_file(files: &[std::path::PathBuf], file_name: &str) -> bool
{
    files
        .iter()
        .any(|path| path.file_name().and_then(|name| name.to_str()) == Some(file_name))
}

#[test]
fn test_shared_struct_emits_once_in_common_namespace()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new()
        .with_module("m1", vec![udt("Foo", 4).with_field("x", "int", 0)])
        .with_module("m2", vec![udt("Foo", 4).with_field("x", "int", 0)]);
    let config = configuration(&[("m1", "M1"), ("m2", "M2")], "Shared", out.path());

    let generator = Generator::new(config, Arc::new(provider));
    let outcome = generator.generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Foo.cs"));
    assert!(!has_file(&outcome.emitted_files, "Foo_1.cs"));
    let source = read_emitted(&outcome.emitted_files, "Foo.cs");
    assert!(source.contains("namespace Shared"));
    assert!(source.contains("public partial class Foo : UserType"));
    assert!(source.contains("public int x => GetField<int>(\"x\", 0);"));
    assert!(source.contains("using ScriptRuntime;"));
}

#[test]
fn test_conflicting_struct_emits_per_module()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new()
        .with_module("m1", vec![udt("Foo", 4).with_field("x", "int", 0)])
        .with_module(
            "m2",
            vec![udt("Foo", 8).with_field("x", "int", 0).with_field("y", "int", 4)],
        );
    let config = configuration(&[("m1", "M1"), ("m2", "M2")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Foo.cs"));
    assert!(has_file(&outcome.emitted_files, "Foo_1.cs"));
    let first = read_emitted(&outcome.emitted_files, "Foo.cs");
    let second = read_emitted(&outcome.emitted_files, "Foo_1.cs");
    let both = format!("{first}{second}");
    assert!(both.contains("namespace M1"));
    assert!(both.contains("namespace M2"));
    assert!(!both.contains("namespace Shared"));
}

#[test]
fn test_forward_declaration_resolves_to_definition()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new()
        .with_module("m1", vec![udt("Bar", 0)])
        .with_module("m2", vec![udt("Bar", 16).with_field("value", "long long", 8)]);
    let config = configuration(&[("m1", "M1"), ("m2", "M2")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Bar.cs"));
    assert!(!has_file(&outcome.emitted_files, "Bar_1.cs"));
    let source = read_emitted(&outcome.emitted_files, "Bar.cs");
    assert!(source.contains("namespace Shared"));
    assert!(source.contains("public long long value => GetField<long long>(\"value\", 8);"));
}

#[test]
fn test_template_family_groups_specializations()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![
            udt("Vec<int>", 8).with_field("data", "int", 0),
            udt("Vec<float>", 8).with_field("data", "float", 0),
            udt("Vec<Vec<int>>", 8).with_field("data", "Vec<int>", 0),
        ],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Vec_1.cs"));
    let source = read_emitted(&outcome.emitted_files, "Vec_1.cs");
    assert!(source.contains("public partial class Vec_1<T1> : UserType"));
    assert_eq!(source.matches("[TemplateSpecialization(").count(), 3);
    assert!(source.contains("[TemplateSpecialization(\"Vec<int>\""));
    assert!(source.contains("[TemplateSpecialization(\"Vec<float>\""));
    assert!(source.contains("[TemplateSpecialization(\"Vec<Vec<int>>\""));
    // The primary body rebinds the modeled argument to its placeholder.
    assert!(source.contains("public T1 data => GetField<T1>(\"data\", 0);"));
}

#[test]
fn test_collect_filter_drops_compiler_noise()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![
            udt("$vbtable", 8),
            udt("Foo::`anonymous-namespace'::X", 4),
            udt("Foo<int&>", 4),
            udt("Bar<int>", 4).with_field("value", "int", 0),
        ],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Bar_1.cs"));
    for path in &outcome.emitted_files {
        let source = fs::read_to_string(path).unwrap();
        assert!(!source.contains("vbtable"));
        assert!(!source.contains("anonymous-namespace"));
        assert!(!source.contains("int&"));
    }
    let type_files: Vec<_> = outcome
        .emitted_files
        .iter()
        .filter(|path| !path.to_string_lossy().contains("ModuleGlobals"))
        .collect();
    assert_eq!(type_files.len(), 1);
}

#[test]
fn test_alias_rebinds_field_to_placeholder()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new()
        .with_module("m1", vec![udt("Str<wchar_t>", 2).with_field("c", "unsigned short", 0)]);
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Str_1.cs");
    assert!(source.contains("public T1 c => GetField<T1>(\"c\", 0);"));
    assert!(!source.contains("unsigned short c"));
}

#[test]
fn test_template_arity_mismatch_is_reported_and_skipped()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![
            udt("Pair<int,float>", 8).with_field("first", "int", 0),
            udt("Pair<int>", 4).with_field("first", "int", 0),
        ],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Pair_2.cs");
    assert!(source.contains("public partial class Pair_2<T1, T2> : UserType"));
    assert_eq!(source.matches("[TemplateSpecialization(").count(), 1);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Warning && diagnostic.message.contains("arguments")));
}

#[test]
fn test_enum_values_preserved_verbatim()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![enumeration("Color", &[("Red", "0"), ("Green", "0x10"), ("Blue", "")])],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Color.cs");
    assert!(source.contains("public enum Color"));
    assert!(source.contains("Red = 0,"));
    assert!(source.contains("Green = 0x10,"));
    assert!(source.contains("Blue,"));
}

#[test]
fn test_module_globals_aggregate_global_scope()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module_globals(
        "m1",
        vec![udt("Foo", 4)],
        vec![global("counter", "int", 16), global("limit", "unsigned int", 24)],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "ModuleGlobals.cs");
    assert!(source.contains("namespace M1"));
    assert!(source.contains("public static class ModuleGlobals"));
    assert!(source.contains("public static int counter => GetGlobal<int>(\"counter\", 16);"));
    assert!(source.contains("public static unsigned int limit => GetGlobal<unsigned int>(\"limit\", 24);"));
}

#[test]
fn test_nested_class_emitted_inline()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![
            udt("Outer", 8).with_field("inner", "Outer::Inner", 0),
            udt("Outer::Inner", 4).with_field("x", "int", 0),
        ],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Outer.cs"));
    assert!(!has_file(&outcome.emitted_files, "Inner.cs"));
    let source = read_emitted(&outcome.emitted_files, "Outer.cs");
    assert!(source.contains("public partial class Outer : UserType"));
    assert!(source.contains("public partial class Inner : UserType"));
    // The field accessor resolves to the generated nested type.
    assert!(source.contains("public Shared.Outer.Inner inner => GetBaseClass") || source.contains("GetField<Shared.Outer.Inner>"));
}

#[test]
fn test_base_classes_emit_in_declaration_order()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![
            udt("Base", 4).with_field("b", "int", 0),
            udt("Other", 4).with_field("o", "int", 0),
            udt("Derived", 12).with_base("Base", 0).with_base("Other", 4).with_field("d", "int", 8),
        ],
    );
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Derived.cs");
    let first = source.find("GetBaseClass<Shared.Base>(0)").unwrap();
    let second = source.find("GetBaseClass<Shared.Other>(1)").unwrap();
    assert!(first < second);
}

#[test]
fn test_transformations_rewrite_unresolved_types()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new()
        .with_module("m1", vec![udt("Foo", 4).with_field("flags", "unsigned int", 0)]);
    let mut config = configuration(&[("m1", "M1")], "Shared", out.path());
    config.transformations = vec![Transformation {
        pattern: "unsigned int".to_string(),
        replacement: "uint".to_string(),
    }];

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Foo.cs");
    assert!(source.contains("public uint flags => GetField<uint>(\"flags\", 0);"));
}

#[test]
fn test_single_file_export_concatenates()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module(
        "m1",
        vec![udt("Foo", 4).with_field("x", "int", 0), enumeration("Color", &[("Red", "0")])],
    );
    let mut config = configuration(&[("m1", "M1")], "Shared", out.path());
    config.generation_flags = config.generation_flags.with(GenerationFlags::SINGLE_FILE_EXPORT);

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert_eq!(outcome.emitted_files.len(), 1);
    let source = fs::read_to_string(&outcome.emitted_files[0]).unwrap();
    assert!(source.contains("namespace Shared"));
    assert!(source.contains("public partial class Foo : UserType"));
    assert!(source.contains("public enum Color"));
    assert!(source.contains("using ScriptRuntime;"));
}

#[test]
fn test_unmatched_wildcard_is_nonfatal()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module("m1", vec![udt("Foo", 4)]);
    let mut config = configuration(&[("m1", "M1")], "Shared", out.path());
    config.types = vec!["Nothing::*".to_string()];

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    assert!(has_file(&outcome.emitted_files, "Foo.cs"));
    assert!(outcome
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Warning && diagnostic.message.contains("Nothing::*")));
    assert!(!outcome.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error));
}

#[test]
fn test_missing_module_aborts()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module("m1", vec![udt("Foo", 4)]);
    let config = configuration(&[("m1", "M1"), ("missing", "M2")], "Shared", out.path());

    let result = Generator::new(config, Arc::new(provider)).generate();

    assert!(matches!(result, Err(symgen_core::GenError::ModuleLoad { .. })));
}

#[test]
fn test_namespaced_type_gets_namespace_containers()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module("m1", vec![udt("Engine::Audio::Mixer", 4).with_field("gain", "float", 0)]);
    let config = configuration(&[("m1", "M1")], "Shared", out.path());

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let source = read_emitted(&outcome.emitted_files, "Mixer.cs");
    assert!(source.contains("namespace Shared.Engine.Audio"));
    assert!(source.contains("public partial class Mixer : UserType"));
}

#[test]
fn test_props_manifest_lists_emitted_files()
{
    let out = tempfile::tempdir().unwrap();
    let provider = MemoryProvider::new().with_module("m1", vec![udt("Foo", 4)]);
    let mut config = configuration(&[("m1", "M1")], "Shared", out.path());
    config.generated_props_file_name = "generated.props".to_string();

    let outcome = Generator::new(config, Arc::new(provider)).generate().unwrap();

    let manifest = fs::read_to_string(out.path().join("generated.props")).unwrap();
    for file in &outcome.emitted_files {
        assert!(manifest.contains(&file.display().to_string()));
    }
    assert!(!outcome.emitted_files.iter().any(|path| path.ends_with(Path::new("generated.props"))));
}
