//! # symgen-core
//!
//! Symbol-to-type-graph pipeline for Symgen.
//!
//! This crate turns debug symbols (PDB-style type information) for a set of
//! native modules into strongly-typed wrapper source code, one generated type
//! per native UDT, enum, or global scope:
//!
//! - Modules load and enumerate in parallel
//! - Type identities deduplicate across modules with size-based tie-breaking
//! - Template specializations group under a common family
//! - Inter-type references (bases, fields, template arguments) link against
//!   the global cache
//! - Each user type writes its own wrapper text, per-file or single-file
//!
//! The PDB reader itself stays outside this crate: the pipeline consumes it
//! through the [`symbols::SymbolProvider`] trait, so any symbol source with
//! names, sizes, tags, fields and base classes can drive generation.

pub mod compile;
pub mod config;
pub mod diag;
pub mod emit;
pub mod error;
pub mod factory;
pub mod names;
pub mod pipeline;
pub mod prelude;
pub mod script;
pub mod symbols;
pub mod usertypes;

// Re-export commonly used types
pub use config::Configuration;
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{GenError, GenResult};
pub use pipeline::{GenerationOutcome, Generator};
