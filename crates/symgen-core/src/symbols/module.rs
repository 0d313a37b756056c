//! Per-module façade over an opened provider module.

use std::sync::Arc;

use crate::config::ModuleConfig;
use crate::error::{GenError, GenResult};

use super::provider::{ProviderModule, SymbolProvider};
use super::symbol::{Symbol, SymbolRef};

/// Index of a module within the configured module list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// A loaded module. Opened exactly once; lives for the whole run.
///
/// The façade wraps every provider symbol into a shared [`Symbol`] carrying a
/// back-reference to its module, so later phases can recover the module
/// namespace without threading extra state around.
pub struct Module
{
    id: ModuleId,
    name: String,
    namespace: String,
    backend: Arc<dyn ProviderModule>,
}

impl Module
{
    /// Open a module through the provider.
    ///
    /// ## Errors
    ///
    /// Returns `GenError::ModuleLoad` when the provider cannot open the
    /// module's symbol store. This aborts the pipeline.
    pub fn open(provider: &dyn SymbolProvider, config: &ModuleConfig, id: ModuleId) -> GenResult<Arc<Self>>
    {
        let backend = provider.open_module(config).map_err(|err| GenError::ModuleLoad {
            module: config.name.clone(),
            details: err.to_string(),
        })?;
        Ok(Arc::new(Self {
            id,
            name: config.name.clone(),
            namespace: config.namespace.clone(),
            backend,
        }))
    }

    #[must_use]
    pub fn id(&self) -> ModuleId
    {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Namespace generated types fall back to when their deduplicated name is
    /// ambiguous across modules.
    #[must_use]
    pub fn namespace(&self) -> &str
    {
        &self.namespace
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ProviderModule>
    {
        &self.backend
    }

    /// Symbols matching a configured wildcard pattern.
    pub fn find_global_type_wildcard(self: &Arc<Self>, pattern: &str) -> Vec<SymbolRef>
    {
        self.backend
            .find_global_type_wildcard(pattern)
            .into_iter()
            .map(|raw| Symbol::new(raw, self.clone()))
            .collect()
    }

    /// Every type symbol the module exposes.
    pub fn all_types(self: &Arc<Self>) -> Vec<SymbolRef>
    {
        self.backend
            .all_types()
            .into_iter()
            .map(|raw| Symbol::new(raw, self.clone()))
            .collect()
    }

    /// The module's global scope pseudo-symbol.
    pub fn global_scope(self: &Arc<Self>) -> SymbolRef
    {
        Symbol::new(self.backend.global_scope(), self.clone())
    }
}

impl std::fmt::Debug for Module
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
