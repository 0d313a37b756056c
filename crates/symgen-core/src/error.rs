//! # Error Types
//!
//! General error handling for the generator.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

/// Main error type for generator operations
///
/// This enum represents all the ways a generation run can fail. Each variant
/// corresponds to a specific error condition that can occur while turning
/// module debug symbols into wrapper source.
///
/// ## Error Categories
///
/// 1. **Configuration errors**: Configuration (invalid option, missing included file)
/// 2. **Provider errors**: ModuleLoad (the symbol provider cannot open a module)
/// 3. **Lookup errors**: SymbolNotFound (a wildcard pattern matched nothing)
/// 4. **Parsing errors**: NameSyntax (a type name does not scan)
/// 5. **Link errors**: TemplateLink (a specialization argument cannot be resolved)
/// 6. **Output errors**: Emit (writer failure), Compile (downstream compiler diagnostics)
/// 7. **I/O errors**: Io (for file operations, etc.)
///
/// Only `Configuration`, `ModuleLoad`, `Emit` and `Io` are fatal to a pipeline
/// run; the remaining kinds are routed to the diagnostics channel and the
/// offending symbol is skipped or emitted with a raw type name.
#[derive(Error, Debug)]
pub enum GenError
{
    /// The configuration record is invalid
    ///
    /// This happens when:
    /// - The module list is empty
    /// - An `included_files` entry points at a file that does not exist
    /// - A transformation pattern is empty
    ///
    /// Configuration errors fail fast, before any module is opened.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The symbol provider failed to open a module
    ///
    /// This is fatal: a missing module means the deduplication pass would run
    /// against a partial symbol universe and silently assign wrong namespaces.
    #[error("Failed to load module {module}: {details}")]
    ModuleLoad
    {
        /// Module name from the configuration
        module: String,
        /// Provider-supplied failure details
        details: String,
    },

    /// A configured wildcard type pattern matched zero symbols
    ///
    /// Non-fatal. The pattern is reported on the diagnostics channel and the
    /// run continues with whatever the other patterns matched.
    #[error("No symbol matches pattern {pattern} in module {module}")]
    SymbolNotFound
    {
        /// The wildcard pattern as configured
        pattern: String,
        /// Module the pattern was evaluated against
        module: String,
    },

    /// A type name failed to parse
    ///
    /// Raised for mismatched `<` / `>` brackets or an empty scope name.
    /// Non-fatal: the symbol carrying the name is skipped.
    #[error("Cannot parse type name `{name}`: {details}")]
    NameSyntax
    {
        /// The offending name
        name: String,
        /// What the scanner rejected
        details: String,
    },

    /// A template specialization argument could not be resolved
    ///
    /// Non-fatal: the specialization is still emitted with the raw type name
    /// in place of the unresolved argument.
    #[error("Cannot resolve argument `{argument}` of template {template}")]
    TemplateLink
    {
        /// Full name of the template being linked
        template: String,
        /// The argument type name that failed to resolve
        argument: String,
    },

    /// The output writer failed
    ///
    /// I/O failures while writing generated source propagate and abort the
    /// emission phase. Already-written files are left in place.
    #[error("Failed to write generated output: {0}")]
    Emit(String),

    /// The downstream compiler reported errors
    ///
    /// Raised after emission when a target assembly name is configured and
    /// the external compiler rejects the generated sources. The message holds
    /// up to 1000 lines of diagnostic detail.
    #[error("Generated source failed to compile:\n{0}")]
    Compile(String),

    /// I/O error (for file operations, etc.)
    ///
    /// Used for errors when reading configuration inputs or writing output
    /// files. This is a standard Rust `std::io::Error` converted to our
    /// error type.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, GenError>`
///
/// ```rust
/// use symgen_core::error::GenResult;
/// fn foo() -> GenResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type GenResult<T> = std::result::Result<T, GenError>;
