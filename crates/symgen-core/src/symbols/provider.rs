//! The symbol provider contract.
//!
//! The actual PDB reader lives outside this crate; the pipeline consumes it
//! through these traits. Field and base-class type references are plain
//! strings here and stay unresolved until the link phase.

use std::sync::Arc;

use crate::config::ModuleConfig;
use crate::error::GenResult;

/// Provider-side identity of a symbol within its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSymbolId(pub u64);

/// Classification tag reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag
{
    /// User-defined type: struct, class or union.
    Udt,
    Enum,
    /// Built-in scalar type.
    BaseType,
    Pointer,
    Array,
    Function,
    Data,
    /// The per-module global scope pseudo-symbol.
    GlobalScope,
}

/// Eager per-symbol record supplied by the provider.
#[derive(Debug, Clone)]
pub struct RawSymbol
{
    pub id: RawSymbolId,
    pub name: String,
    pub size: u64,
    pub tag: SymbolTag,
}

/// One data member of a UDT. `type_name` is textual until link.
#[derive(Debug, Clone)]
pub struct RawField
{
    pub name: String,
    pub type_name: String,
    pub offset: u64,
}

/// One base class of a UDT, in declaration order.
#[derive(Debug, Clone)]
pub struct RawBaseClass
{
    pub type_name: String,
    pub offset: u64,
}

/// One enumerator. The value is preserved verbatim as the provider spelled it.
#[derive(Debug, Clone)]
pub struct RawEnumValue
{
    pub name: String,
    pub value: String,
}

/// An opened module as the provider sees it.
///
/// `fields`, `base_classes` and `enum_values` are pull-based so the façade
/// layer can defer them until a symbol actually survives deduplication and
/// filtering.
pub trait ProviderModule: Send + Sync
{
    /// Symbols matching a wildcard type pattern (e.g. `MyLib::*`).
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol>;

    /// Every type symbol the module knows about.
    fn all_types(&self) -> Vec<RawSymbol>;

    /// The module's global scope pseudo-symbol.
    fn global_scope(&self) -> RawSymbol;

    fn fields(&self, id: RawSymbolId) -> Vec<RawField>;

    fn base_classes(&self, id: RawSymbolId) -> Vec<RawBaseClass>;

    fn enum_values(&self, id: RawSymbolId) -> Vec<RawEnumValue>;
}

/// Entry point the external reader implements.
pub trait SymbolProvider: Send + Sync
{
    /// Open one module's symbol store.
    ///
    /// ## Errors
    ///
    /// Any failure here is fatal to the pipeline; the caller wraps it in
    /// `GenError::ModuleLoad`.
    fn open_module(&self, config: &ModuleConfig) -> GenResult<Arc<dyn ProviderModule>>;
}
