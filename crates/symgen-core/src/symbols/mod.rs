//! # Symbols
//!
//! In-memory view over provider-supplied debug symbols.
//!
//! ## Module Structure
//!
//! - **`provider`**: the `SymbolProvider` contract the external PDB reader implements
//! - **`module`**: per-module façade, opened exactly once and alive for the run
//! - **`symbol`**: shared immutable symbol values with lazy field/base-class access
//! - **`cache`**: process-wide deduplicated name → symbols lookup
//! - **`dedup`**: cross-module identity reconciliation with size-based tie-breaking
//!
//! Symbols are created during the load/enumerate phases and are immutable
//! afterwards; every later stage holds them through `Arc` handles.

pub mod cache;
pub mod dedup;
pub mod module;
pub mod provider;
pub mod symbol;

pub use cache::GlobalCache;
pub use dedup::{DedupOutput, Deduplicator, SymbolGroup};
pub use module::{Module, ModuleId};
pub use provider::{ProviderModule, RawBaseClass, RawEnumValue, RawField, RawSymbol, RawSymbolId, SymbolProvider, SymbolTag};
pub use symbol::{Symbol, SymbolKey, SymbolRef};
