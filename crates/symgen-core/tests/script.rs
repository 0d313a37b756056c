//! Tests for the script precompiler

use std::fs;
use std::path::Path;

use symgen_core::script::{ScriptPrecompiler, SCRIPT_CLASS, SCRIPT_ENTRY_POINT, SCRIPT_NAMESPACE};
use symgen_core::GenError;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf
{
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_wrapper_synthesis()
{
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "main.csx", "using B.Ns;\nConsole.WriteLine(\"hi\");\n");

    let precompiled = ScriptPrecompiler::new(Vec::new()).precompile(&script).unwrap();

    assert_eq!(precompiled.usings, vec!["B.Ns".to_string()]);
    assert!(precompiled.source.contains("using B.Ns;"));
    assert!(precompiled.source.contains(&format!("namespace {SCRIPT_NAMESPACE}")));
    assert!(precompiled.source.contains(&format!("public class {SCRIPT_CLASS}")));
    assert!(precompiled.source.contains(&format!("public void {SCRIPT_ENTRY_POINT}()")));
    assert!(precompiled.source.contains("Console.WriteLine(\"hi\");"));
    // The hoisted declaration is blanked out of the body.
    let body_start = precompiled.source.find(SCRIPT_ENTRY_POINT).unwrap();
    assert!(!precompiled.source[body_start..].contains("using B.Ns;"));
}

#[test]
fn test_import_expansion_flattens_code()
{
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib.csx", "using A.Ns;\nvoid Helper() { }\n");
    let script = write(dir.path(), "main.csx", "import \"lib.csx\";\nHelper();\n");

    let precompiled = ScriptPrecompiler::new(Vec::new()).precompile(&script).unwrap();

    assert_eq!(precompiled.usings, vec!["A.Ns".to_string()]);
    assert_eq!(precompiled.imported_files.len(), 1);
    assert!(precompiled.source.contains("void Helper() { }"));
    assert!(!precompiled.source.contains("import"));
    // Line directives map both chunks back to their files.
    assert!(precompiled.source.contains(&format!("#line 1 \"{}\"", precompiled.imported_files[0].display())));
    assert_eq!(precompiled.source.matches("#line default").count(), 2);
}

#[test]
fn test_imports_deduplicated_by_canonical_path()
{
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shared.csx", "void Shared() { }\n");
    write(dir.path(), "a.csx", "import \"shared.csx\";\nvoid A() { }\n");
    write(dir.path(), "b.csx", "import \"shared.csx\";\nvoid B() { }\n");
    let script = write(dir.path(), "main.csx", "import \"a.csx\";\nimport \"b.csx\";\n");

    let precompiled = ScriptPrecompiler::new(Vec::new()).precompile(&script).unwrap();

    assert_eq!(precompiled.source.matches("void Shared() { }").count(), 1);
    assert_eq!(precompiled.imported_files.len(), 3);
}

#[test]
fn test_usings_deduplicated_and_sorted()
{
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib.csx", "using Z.Last;\nusing A.First;\n");
    let script = write(dir.path(), "main.csx", "using M.Middle;\nusing A.First;\nimport \"lib.csx\";\n");

    let precompiled = ScriptPrecompiler::new(Vec::new()).precompile(&script).unwrap();

    assert_eq!(
        precompiled.usings,
        vec!["A.First".to_string(), "M.Middle".to_string(), "Z.Last".to_string()]
    );
}

#[test]
fn test_masked_regions_do_not_import()
{
    let dir = tempfile::tempdir().unwrap();
    let script = write(
        dir.path(),
        "main.csx",
        "// import \"gone.csx\";\n/* using Gone; */\nvar s = \"import \\\"gone.csx\\\";\";\n",
    );

    let precompiled = ScriptPrecompiler::new(Vec::new()).precompile(&script).unwrap();

    assert!(precompiled.usings.is_empty());
    assert!(precompiled.imported_files.is_empty());
    // The string literal survives in the body; the comments do not.
    assert!(precompiled.source.contains("var s = \"import \\\"gone.csx\\\";\";"));
    assert!(!precompiled.source.contains("// import"));
    assert!(!precompiled.source.contains("using Gone"));
}

#[test]
fn test_search_folders_resolve_imports()
{
    let dir = tempfile::tempdir().unwrap();
    let libs = dir.path().join("libs");
    fs::create_dir_all(&libs).unwrap();
    write(&libs, "util.csx", "void Util() { }\n");
    let script = write(dir.path(), "main.csx", "import \"util.csx\";\n");

    let precompiled = ScriptPrecompiler::new(vec![libs]).precompile(&script).unwrap();

    assert!(precompiled.source.contains("void Util() { }"));
}

#[test]
fn test_missing_import_is_an_error()
{
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "main.csx", "import \"nope.csx\";\n");

    let result = ScriptPrecompiler::new(Vec::new()).precompile(&script);

    assert!(matches!(result, Err(GenError::Configuration(_))));
}
