//! Shared immutable symbol values.
//!
//! A `Symbol` is a thin view over one provider record plus a back-reference
//! to its module. `name`, `size` and `tag` are eager; `fields`,
//! `base_classes`, `enum_values` and the parsed-name derivatives are computed
//! on first access and cached. Most symbols never survive deduplication and
//! filtering, so deferring the member queries keeps the enumerate phase
//! cheap.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::names::ParsedName;

use super::module::{Module, ModuleId};
use super::provider::{RawBaseClass, RawEnumValue, RawField, RawSymbol, RawSymbolId, SymbolTag};

/// Shared handle to a symbol. Symbols outlive every structure built on them.
pub type SymbolRef = Arc<Symbol>;

/// Process-wide identity of a symbol: module plus provider id.
///
/// Two symbols with the same *name* are candidates for deduplication; the key
/// keeps them distinguishable while namespace assignment is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolKey
{
    pub module: ModuleId,
    pub symbol: RawSymbolId,
}

pub struct Symbol
{
    raw: RawSymbol,
    module: Arc<Module>,
    parsed: OnceCell<Option<ParsedName>>,
    namespaces: OnceCell<Vec<String>>,
    fields: OnceCell<Vec<RawField>>,
    base_classes: OnceCell<Vec<RawBaseClass>>,
    enum_values: OnceCell<Vec<RawEnumValue>>,
}

impl Symbol
{
    pub(crate) fn new(raw: RawSymbol, module: Arc<Module>) -> SymbolRef
    {
        Arc::new(Self {
            raw,
            module,
            parsed: OnceCell::new(),
            namespaces: OnceCell::new(),
            fields: OnceCell::new(),
            base_classes: OnceCell::new(),
            enum_values: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.raw.name
    }

    #[must_use]
    pub fn size(&self) -> u64
    {
        self.raw.size
    }

    #[must_use]
    pub fn tag(&self) -> SymbolTag
    {
        self.raw.tag
    }

    #[must_use]
    pub fn module(&self) -> &Arc<Module>
    {
        &self.module
    }

    #[must_use]
    pub fn key(&self) -> SymbolKey
    {
        SymbolKey {
            module: self.module.id(),
            symbol: self.raw.id,
        }
    }

    /// The parsed qualified name, or `None` when the name does not scan.
    ///
    /// Symbols with unscannable names are dropped by the collect filter, so
    /// downstream code may rely on `Some` after that point.
    pub fn parsed_name(&self) -> Option<&ParsedName>
    {
        self.parsed.get_or_init(|| ParsedName::parse(&self.raw.name).ok()).as_ref()
    }

    /// Enclosing scopes of the symbol name, derived once from `name`.
    pub fn namespaces(&self) -> &[String]
    {
        self.namespaces
            .get_or_init(|| self.parsed_name().map(ParsedName::namespaces).unwrap_or_default())
    }

    /// Data members, fetched from the provider on first access.
    pub fn fields(&self) -> &[RawField]
    {
        self.fields.get_or_init(|| self.module.backend().fields(self.raw.id))
    }

    /// Base classes in declaration order, fetched on first access.
    pub fn base_classes(&self) -> &[RawBaseClass]
    {
        self.base_classes
            .get_or_init(|| self.module.backend().base_classes(self.raw.id))
    }

    /// Enumerators, fetched on first access.
    pub fn enum_values(&self) -> &[RawEnumValue]
    {
        self.enum_values
            .get_or_init(|| self.module.backend().enum_values(self.raw.id))
    }
}

impl std::fmt::Debug for Symbol
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Symbol")
            .field("name", &self.raw.name)
            .field("size", &self.raw.size)
            .field("tag", &self.raw.tag)
            .field("module", &self.module.name())
            .finish()
    }
}
