//! JSON-backed symbol provider.
//!
//! Stands in for a real PDB reader: each configured module path points at a
//! JSON dump of its type symbols and globals. Useful for driving the
//! generator from exported symbol data and for exercising it end to end.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use serde::Deserialize;

use symgen_core::config::ModuleConfig;
use symgen_core::error::{GenError, GenResult};
use symgen_core::symbols::{
    ProviderModule, RawBaseClass, RawEnumValue, RawField, RawSymbol, RawSymbolId, SymbolProvider, SymbolTag,
};

#[derive(Debug, Deserialize)]
struct SymbolRecord
{
    name: String,
    #[serde(default)]
    size: u64,
    tag: String,
    #[serde(default)]
    fields: Vec<FieldRecord>,
    #[serde(default)]
    base_classes: Vec<BaseRecord>,
    #[serde(default)]
    enum_values: Vec<EnumValueRecord>,
}

#[derive(Debug, Deserialize)]
struct FieldRecord
{
    name: String,
    type_name: String,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
struct BaseRecord
{
    type_name: String,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
struct EnumValueRecord
{
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ModuleDump
{
    #[serde(default)]
    symbols: Vec<SymbolRecord>,
    #[serde(default)]
    globals: Vec<FieldRecord>,
}

fn parse_tag(tag: &str) -> GenResult<SymbolTag>
{
    match tag {
        "udt" | "struct" | "class" | "union" => Ok(SymbolTag::Udt),
        "enum" => Ok(SymbolTag::Enum),
        "base" | "base_type" => Ok(SymbolTag::BaseType),
        "pointer" => Ok(SymbolTag::Pointer),
        "array" => Ok(SymbolTag::Array),
        "function" => Ok(SymbolTag::Function),
        "data" => Ok(SymbolTag::Data),
        other => Err(GenError::Configuration(format!("unknown symbol tag `{other}`"))),
    }
}

/// `*`-wildcard match, case-sensitive.
fn wildcard_match(pattern: &str, name: &str) -> bool
{
    match pattern.split_once('*') {
        None => pattern == name,
        Some((prefix, rest)) => {
            let Some(stripped) = name.strip_prefix(prefix) else {
                return false;
            };
            if rest.is_empty() {
                return true;
            }
            (0..=stripped.len())
                .filter(|index| stripped.is_char_boundary(*index))
                .any(|index| wildcard_match(rest, &stripped[index..]))
        }
    }
}

struct JsonModule
{
    symbols: Vec<RawSymbol>,
    details: HashMap<RawSymbolId, SymbolRecord>,
    globals: Vec<RawField>,
}

const GLOBAL_SCOPE_ID: RawSymbolId = RawSymbolId(u64::MAX);

impl ProviderModule for JsonModule
{
    fn find_global_type_wildcard(&self, pattern: &str) -> Vec<RawSymbol>
    {
        self.symbols
            .iter()
            .filter(|symbol| wildcard_match(pattern, &symbol.name))
            .cloned()
            .collect()
    }

    fn all_types(&self) -> Vec<RawSymbol>
    {
        self.symbols.clone()
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
        self.details
            .get(&id)
            .map(|record| {
                record
                    .fields
                    .iter()
                    .map(|field| RawField {
                        name: field.name.clone(),
                        type_name: field.type_name.clone(),
                        offset: field.offset,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn base_classes(&self, id: RawSymbolId) -> Vec<RawBaseClass>
    {
        self.details
            .get(&id)
            .map(|record| {
                record
                    .base_classes
                    .iter()
                    .map(|base| RawBaseClass {
                        type_name: base.type_name.clone(),
                        offset: base.offset,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn enum_values(&self, id: RawSymbolId) -> Vec<RawEnumValue>
    {
        self.details
            .get(&id)
            .map(|record| {
                record
                    .enum_values
                    .iter()
                    .map(|value| RawEnumValue {
                        name: value.name.clone(),
                        value: value.value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Opens module symbol stores stored as JSON dumps.
#[derive(Debug, Default)]
pub struct JsonSymbolProvider;

impl JsonSymbolProvider
{
    #[must_use]
    pub fn new() -> Self
    {
        Self
    }
}

impl SymbolProvider for JsonSymbolProvider
{
    fn open_module(&self, config: &ModuleConfig) -> GenResult<Arc<dyn ProviderModule>>
    {
        let text = fs::read_to_string(&config.path)?;
        let dump: ModuleDump =
            serde_json::from_str(&text).map_err(|err| GenError::Configuration(format!("{}: {err}", config.path.display())))?;

        let mut symbols = Vec::with_capacity(dump.symbols.len());
        let mut details = HashMap::with_capacity(dump.symbols.len());
        for (index, record) in dump.symbols.into_iter().enumerate() {
            let id = RawSymbolId(index as u64);
            symbols.push(RawSymbol {
                id,
                name: record.name.clone(),
                size: record.size,
                tag: parse_tag(&record.tag)?,
            });
            details.insert(id, record);
        }
        let globals = dump
            .globals
            .into_iter()
            .map(|field| RawField {
                name: field.name,
                type_name: field.type_name,
                offset: field.offset,
            })
            .collect();

        Ok(Arc::new(JsonModule {
            symbols,
            details,
            globals,
        }))
    }
}
