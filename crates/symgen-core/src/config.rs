//! # Configuration
//!
//! The plain configuration record driving a generation run.
//!
//! The record is deserialized from JSON by the CLI; everything the pipeline
//! needs is carried here so the core never touches configuration files
//! itself. Validation happens once, up front, and fails fast with
//! [`GenError::Configuration`](crate::error::GenError).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GenError, GenResult};

/// Describes one native module whose symbols feed the run.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig
{
    /// Path to the module's symbol store (e.g. a PDB file).
    pub path: PathBuf,
    /// Short module name, used in diagnostics and as the globals-type prefix.
    pub name: String,
    /// Namespace generated types fall back to when the deduplicated name is
    /// ambiguous across modules.
    pub namespace: String,
}

/// One ordered textual type-name rewrite.
///
/// Transformations run first-match-wins at emit time; `pattern` is matched
/// against the full textual type name.
#[derive(Debug, Clone, Deserialize)]
pub struct Transformation
{
    pub pattern: String,
    pub replacement: String,
}

/// Bitset of generation behaviors.
///
/// Unknown bits are preserved verbatim so configurations written by newer
/// tools round-trip through older ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GenerationFlags(pub u32);

impl GenerationFlags
{
    /// Concatenate all generated types into a single output file.
    pub const SINGLE_FILE_EXPORT: GenerationFlags = GenerationFlags(1);
    /// Strip blank separator lines from generated output.
    pub const COMPRESSED_OUTPUT: GenerationFlags = GenerationFlags(1 << 1);

    #[must_use]
    pub fn contains(self, flag: GenerationFlags) -> bool
    {
        self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub fn with(self, flag: GenerationFlags) -> Self
    {
        GenerationFlags(self.0 | flag.0)
    }
}

/// The full configuration record driving one generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration
{
    /// Modules whose symbols are loaded, in order. Order matters: it fixes
    /// the deduplication tie-break.
    pub modules: Vec<ModuleConfig>,
    /// Wildcard type patterns to include, e.g. `MyLib::*`.
    pub types: Vec<String>,
    /// Ordered type-name rewrites applied at emit time.
    pub transformations: Vec<Transformation>,
    /// Namespace unambiguous deduplicated types are generated into.
    pub common_types_namespace: String,
    /// Generation behavior bitset.
    pub generation_flags: GenerationFlags,
    /// Output artifact name handed to the downstream compiler; empty skips
    /// the compile step entirely.
    pub generated_assembly_name: String,
    /// Extra user source files co-compiled with the generated ones.
    pub included_files: Vec<PathBuf>,
    /// Extra references handed to the downstream compiler.
    pub referenced_assemblies: Vec<String>,
    /// Optional manifest listing every emitted file, written after emission.
    pub generated_props_file_name: String,
    /// Suppress debug info when invoking the downstream compiler.
    pub disable_pdb_generation: bool,
    /// Directory generated files are written into (per-file mode) or the
    /// single output file's directory.
    pub output_directory: PathBuf,
}

impl Default for Configuration
{
    fn default() -> Self
    {
        Self {
            modules: Vec::new(),
            types: Vec::new(),
            transformations: Vec::new(),
            common_types_namespace: "CommonTypes".to_string(),
            generation_flags: GenerationFlags::default(),
            generated_assembly_name: String::new(),
            included_files: Vec::new(),
            referenced_assemblies: Vec::new(),
            generated_props_file_name: String::new(),
            disable_pdb_generation: false,
            output_directory: PathBuf::from("output"),
        }
    }
}

impl Configuration
{
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> GenResult<Self>
    {
        let configuration: Configuration =
            serde_json::from_str(text).map_err(|err| GenError::Configuration(err.to_string()))?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// Check the record for conditions that must fail fast.
    ///
    /// ## Errors
    ///
    /// Returns `GenError::Configuration` when:
    /// - no module is configured
    /// - a module has an empty name or namespace
    /// - an included file does not exist on disk
    /// - a transformation has an empty pattern
    pub fn validate(&self) -> GenResult<()>
    {
        if self.modules.is_empty() {
            return Err(GenError::Configuration("no modules configured".to_string()));
        }
        for module in &self.modules {
            if module.name.is_empty() {
                return Err(GenError::Configuration(format!(
                    "module {} has an empty name",
                    module.path.display()
                )));
            }
            if module.namespace.is_empty() {
                return Err(GenError::Configuration(format!("module {} has an empty namespace", module.name)));
            }
        }
        for file in &self.included_files {
            if !Path::new(file).exists() {
                return Err(GenError::Configuration(format!(
                    "included file {} does not exist",
                    file.display()
                )));
            }
        }
        for transformation in &self.transformations {
            if transformation.pattern.is_empty() {
                return Err(GenError::Configuration("transformation with empty pattern".to_string()));
            }
        }
        Ok(())
    }

    /// Whether generated types are concatenated into one file.
    #[must_use]
    pub fn single_file_export(&self) -> bool
    {
        self.generation_flags.contains(GenerationFlags::SINGLE_FILE_EXPORT)
    }
}
