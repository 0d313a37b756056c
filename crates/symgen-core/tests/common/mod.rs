//! In-memory symbol provider used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use symgen_core::config::{Configuration, ModuleConfig};
use symgen_core::error::{GenError, GenResult};
use symgen_core::symbols::{
    ProviderModule, RawBaseClass, RawEnumValue, RawField, RawSymbol, RawSymbolId, SymbolProvider, SymbolTag,
};

/// One scripted symbol with its members.
#[derive(Debug, Clone)]
pub struct TestSymbol
{
    pub name: String,
    pub size: u64,
    pub tag: SymbolTag,
    pub fields: Vec<RawField>,
    pub base_classes: Vec<RawBaseClass>,
    pub enum_values: Vec<RawEnumValue>,
}

pub fn udt(name: &str, size: u64) -> TestSymbol
{
    TestSymbol {
        name: name.to_string(),
        size,
        tag: SymbolTag::Udt,
        fields: Vec::new(),
        base_classes: Vec::new(),
        enum_values: Vec::new(),
    }
}

pub fn enumeration(name: &str, values: &[(&str, &str)]) -> TestSymbol
{
    TestSymbol {
        name: name.to_string(),
        size: 4,
        tag: SymbolTag::Enum,
        fields: Vec::new(),
        base_classes: Vec::new(),
        enum_values: values
            .iter()
            .map(|(name, value)| RawEnumValue {
                name: (*name).to_string(),
                value: (*value).to_string(),
            })
            .collect(),
    }
}

impl TestSymbol
{
    pub fn with_field(mut self, name: &str, type_name: &str, offset: u64) -> Self
    {
        self.fields.push(RawField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            offset,
        });
        self
    }

    pub fn with_base(mut self, type_name: &str, offset: u64) -> Self
    {
        self.base_classes.push(RawBaseClass {
            type_name: type_name.to_string(),
            offset,
        });
        self
    }
}

struct MemoryModule
{
    symbols: Vec<TestSymbol>,
    globals: Vec<RawField>,
}

const GLOBAL_SCOPE_ID: RawSymbolId = RawSymbolId(u64::MAX);

impl MemoryModule
{
    fn raw(&self, index: usize) -> RawSymbol
    {
        let symbol = &self.symbols[index];
        RawSymbol {
            id: RawSymbolId(index as u64),
            name: symbol.name.clone(),
            size: symbol.size,
            tag: symbol.tag,
        }
    }
}

impl ProviderModule for MemoryModule
{
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol>
    {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        (0..self.symbols.len())
            .filter(|index| {
                let name = &self.symbols[*index].name;
                if pattern.ends_with('*') {
                    name.starts_with(prefix)
                } else {
                    name == pattern
                }
            })
            .map(|index| self.raw(index))
            .collect()
    }

    fn all_types(&self) -> Vec<RawSymbol>
    {
        (0..self.symbols.len()).map(|index| self.raw(index)).collect()
    }

    fn global_scope(&self) -> RawSymbol
    {
        RawSymbol {
            id: GLOBAL_SCOPE_ID,
            name: String::new(),
            size: 0,
            tag: SymbolTag::GlobalScope,
        }
    }

    fn fields(&self, id: RawSymbolId) -> Vec<RawField>
    {
        if id == GLOBAL_SCOPE_ID {
            return self.globals.clone();
        }
        self.symbols[id.0 as usize].fields.clone()
    }

    fn base_classes(&self, id: RawSymbolId) -> Vec<RawBaseClass>
    {
        if id == GLOBAL_SCOPE_ID {
            return Vec::new();
        }
        self.symbols[id.0 as usize].base_classes.clone()
    }

    fn enum_values(&self, id: RawSymbolId) -> Vec<RawEnumValue>
    {
        self.symbols[id.0 as usize].enum_values.clone()
    }
}

/// Provider double: module name → scripted symbols.
#[derive(Default)]
pub struct MemoryProvider
{
    modules: HashMap<String, (Vec<TestSymbol>, Vec<RawField>)>,
}

impl MemoryProvider
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with_module(mut self, name: &str, symbols: Vec<TestSymbol>) -> Self
    {
        self.modules.insert(name.to_string(), (symbols, Vec::new()));
        self
    }

    pub fn with_module_globals(mut self, name: &str, symbols: Vec<TestSymbol>, globals: Vec<RawField>) -> Self
    {
        self.modules.insert(name.to_string(), (symbols, globals));
        self
    }
}

impl SymbolProvider for MemoryProvider
{
    fn open_module(&self, config: &ModuleConfig) -> GenResult<Arc<dyn ProviderModule>>
    {
        let (symbols, globals) = self
            .modules
            .get(&config.name)
            .ok_or_else(|| GenError::Configuration(format!("no scripted module named {}", config.name)))?;
        Ok(Arc::new(MemoryModule {
            symbols: symbols.clone(),
            globals: globals.clone(),
        }))
    }
}

/// A configuration over the named modules with a shared common namespace.
pub fn configuration(modules: &[(&str, &str)], common_namespace: &str, output_directory: &std::path::Path)
    -> Configuration
{
    let mut config = Configuration::default();
    config.modules = modules
        .iter()
        .map(|(name, namespace)| ModuleConfig {
            path: format!("{name}.pdb").into(),
            name: (*name).to_string(),
            namespace: (*namespace).to_string(),
        })
        .collect();
    config.common_types_namespace = common_namespace.to_string();
    config.output_directory = output_directory.to_path_buf();
    config
}

pub fn global(name: &str, type_name: &str, offset: u64) -> RawField
{
    RawField {
        name: name.to_string(),
        type_name: type_name.to_string(),
        offset,
    }
}
