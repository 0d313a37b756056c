//! Common module for library exports

pub use crate::config::{Configuration, GenerationFlags, ModuleConfig, Transformation};
pub use crate::diag::{Diagnostic, Diagnostics, Phase, Severity};
pub use crate::error::{GenError, GenResult};
pub use crate::pipeline::{GenerationOutcome, Generator};
pub use crate::symbols::{Module, ModuleId, ProviderModule, Symbol, SymbolProvider, SymbolRef, SymbolTag};
