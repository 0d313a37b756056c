//! # Script Precompiler
//!
//! Small utility used by the surrounding script-execution host: expands
//! `import "path";` statements recursively, hoists `using name;` declarations
//! to the top, strips comments, and wraps the result in a single class with
//! one entry-point method holding the original script body. `#line`
//! directives map emitted lines back to their source files.
//!
//! Strings and comments are masked before `import` / `using` extraction so a
//! directive spelled inside either is left alone.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GenError, GenResult};

/// Fixed namespace the synthesized wrapper lives in.
pub const SCRIPT_NAMESPACE: &str = "ScriptHost";
/// Synthesized wrapper class name.
pub const SCRIPT_CLASS: &str = "Script";
/// Entry-point method holding the original script body.
pub const SCRIPT_ENTRY_POINT: &str = "Execute";

static MASKABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)@"(?:[^"]|"")*"|"(?:[^"\\\n]|\\.)*"|/\*.*?\*/|//[^\n]*"#).expect("maskable regex is valid")
});
static IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"import\s+([^;]+);").expect("import regex is valid"));
static USING: Lazy<Regex> = Lazy::new(|| Regex::new(r"using\s+([^;]+);").expect("using regex is valid"));

/// Result of precompiling one script.
#[derive(Debug)]
pub struct PrecompiledScript
{
    /// The synthesized wrapper source.
    pub source: String,
    /// Hoisted `using` declarations, deduplicated and sorted.
    pub usings: Vec<String>,
    /// Every file pulled in through `import`, in flattening order.
    pub imported_files: Vec<PathBuf>,
}

/// Expands imports and synthesizes the wrapper class.
pub struct ScriptPrecompiler
{
    search_folders: Vec<PathBuf>,
}

struct Flattened
{
    usings: HashSet<String>,
    chunks: Vec<(PathBuf, String)>,
    visited: HashSet<PathBuf>,
}

impl ScriptPrecompiler
{
    #[must_use]
    pub fn new(search_folders: Vec<PathBuf>) -> Self
    {
        Self { search_folders }
    }

    /// Precompile the script at `start`.
    ///
    /// ## Errors
    ///
    /// Returns `GenError::Io` when a file cannot be read and
    /// `GenError::Configuration` when an imported path resolves nowhere.
    pub fn precompile(&self, start: &Path) -> GenResult<PrecompiledScript>
    {
        let mut state = Flattened {
            usings: HashSet::new(),
            chunks: Vec::new(),
            visited: HashSet::new(),
        };
        let canonical = start.canonicalize()?;
        state.visited.insert(canonical.clone());
        let body = self.process_file(&canonical, &mut state)?;

        let mut usings: Vec<String> = state.usings.into_iter().collect();
        usings.sort();

        let mut source = String::new();
        for using in &usings {
            source.push_str(&format!("using {using};\n"));
        }
        source.push('\n');
        source.push_str(&format!("namespace {SCRIPT_NAMESPACE}\n{{\n"));
        source.push_str(&format!("    public class {SCRIPT_CLASS}\n    {{\n"));
        for (path, chunk) in &state.chunks {
            source.push_str(&format!("#line 1 \"{}\"\n", path.display()));
            source.push_str(chunk);
            if !chunk.ends_with('\n') {
                source.push('\n');
            }
            source.push_str("#line default\n");
        }
        source.push_str(&format!("        public void {SCRIPT_ENTRY_POINT}()\n        {{\n"));
        source.push_str(&format!("#line 1 \"{}\"\n", canonical.display()));
        source.push_str(&body);
        if !body.ends_with('\n') {
            source.push('\n');
        }
        source.push_str("#line default\n");
        source.push_str("        }\n    }\n}\n");

        Ok(PrecompiledScript {
            source,
            usings,
            imported_files: state.chunks.iter().map(|(path, _)| path.clone()).collect(),
        })
    }

    /// Read one file, strip comments, extract directives, recurse into
    /// imports. Returns the cleaned body with directives blanked out.
    fn process_file(&self, path: &Path, state: &mut Flattened) -> GenResult<String>
    {
        let source = fs::read_to_string(path)?;
        let (masked, stripped) = mask_source(&source);
        let mut output = stripped.into_bytes();

        for capture in USING.captures_iter(&masked) {
            let whole = capture.get(0).expect("regex match");
            state.usings.insert(capture[1].trim().to_string());
            blank_span(&mut output, whole.start(), whole.end());
        }

        let mut imports = Vec::new();
        for capture in IMPORT.captures_iter(&masked) {
            let whole = capture.get(0).expect("regex match");
            // The path itself was masked with the other string literals, so
            // read it back from the original text.
            let raw = source[capture.get(1).expect("regex capture").range()].trim();
            imports.push(raw.trim_matches('"').to_string());
            blank_span(&mut output, whole.start(), whole.end());
        }
        let output = String::from_utf8(output).expect("blanking whole spans preserves UTF-8");

        for import in imports {
            let resolved = self.resolve_import(path, &import)?;
            if !state.visited.insert(resolved.clone()) {
                continue;
            }
            let chunk = self.process_file(&resolved, state)?;
            state.chunks.push((resolved, chunk));
        }

        Ok(output)
    }

    fn resolve_import(&self, importing_file: &Path, import: &str) -> GenResult<PathBuf>
    {
        let request = Path::new(import);
        if request.is_absolute() {
            if request.exists() {
                return Ok(request.canonicalize()?);
            }
            return Err(GenError::Configuration(format!("imported file {import} does not exist")));
        }

        let parent = importing_file.parent().map(Path::to_path_buf).unwrap_or_default();
        for folder in std::iter::once(&parent).chain(self.search_folders.iter()) {
            let candidate = folder.join(request);
            if candidate.exists() {
                return Ok(candidate.canonicalize()?);
            }
        }
        Err(GenError::Configuration(format!(
            "imported file {import} not found in any search folder"
        )))
    }
}

/// Produce two copies of the source: one with strings *and* comments blanked
/// (for directive extraction) and one with only comments blanked (the output
/// body). Newlines survive blanking so line numbers stay stable.
fn mask_source(source: &str) -> (String, String)
{
    let mut masked = source.as_bytes().to_vec();
    let mut stripped = source.as_bytes().to_vec();
    for found in MASKABLE.find_iter(source) {
        let text = found.as_str();
        let is_comment = text.starts_with("/*") || text.starts_with("//");
        for index in found.range() {
            if masked[index] != b'\n' {
                masked[index] = b' ';
                if is_comment {
                    stripped[index] = b' ';
                }
            }
        }
    }
    (
        String::from_utf8(masked).expect("blanking preserves UTF-8"),
        String::from_utf8(stripped).expect("blanking preserves UTF-8"),
    )
}

/// Blank one whole match span. Regex match boundaries sit on character
/// boundaries, so replacing every non-newline byte inside the span keeps the
/// buffer valid UTF-8.
fn blank_span(bytes: &mut [u8], start: usize, end: usize)
{
    for byte in &mut bytes[start..end] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
}
