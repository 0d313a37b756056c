//! # User Type Factory
//!
//! Constructs user types from symbols, applies configured type-name
//! transformations, and resolves textual type references against the global
//! cache during linking and emission.
//!
//! The factory is the only component that allocates into the type arena; the
//! pipeline driver owns the factory and hands out shared references during
//! the parallel emission phase. `TemplateUserTypeFactory` decorates the base
//! factory while a template body is being written, rebinding type names to
//! the body's argument placeholders.

pub mod template;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Transformation;
use crate::diag::{Diagnostic, Diagnostics, Phase, Severity};
use crate::error::GenResult;
use crate::names::ParsedName;
use crate::symbols::{GlobalCache, SymbolKey, SymbolRef, SymbolTag};
use crate::usertypes::{
    sanitize_identifier, template_constructor_name, ResolvedType, TemplateArgument, TemplateData, TypeArena, UserType,
    UserTypeId, UserTypeKind, DEFAULT_USING,
};

pub use template::TemplateUserTypeFactory;

/// Resolves textual type names while generated source is being written.
///
/// The base factory resolves through the global cache; the template decorator
/// intercepts names that match an argument of the template body currently
/// being emitted.
pub trait TypeResolver
{
    fn try_resolve(&self, type_name: &str) -> ResolvedType;

    /// Apply the configured textual rewrites; first match wins.
    fn transform(&self, type_name: &str) -> String;
}

pub struct UserTypeFactory
{
    arena: TypeArena,
    by_symbol: HashMap<SymbolKey, UserTypeId>,
    transformations: Vec<Transformation>,
    cache: Arc<GlobalCache>,
}

impl UserTypeFactory
{
    #[must_use]
    pub fn new(transformations: Vec<Transformation>, cache: Arc<GlobalCache>) -> Self
    {
        Self {
            arena: TypeArena::new(),
            by_symbol: HashMap::new(),
            transformations,
            cache,
        }
    }

    #[must_use]
    pub fn arena(&self) -> &TypeArena
    {
        &self.arena
    }

    /// The user type created for a symbol, if any.
    #[must_use]
    pub fn get_user_type(&self, symbol: &SymbolRef) -> Option<UserTypeId>
    {
        self.by_symbol.get(&symbol.key()).copied()
    }

    /// The representative symbol recorded for a name, materialized or not.
    ///
    /// Emission uses this to reach symbols the collect filter dropped, e.g.
    /// anonymous nested UDTs whose fields are inlined into their parent.
    #[must_use]
    pub fn find_symbol(&self, type_name: &str) -> Option<SymbolRef>
    {
        self.cache.get_symbol(type_name)
    }

    /// Look a type up by textual name through the global cache.
    ///
    /// The cache lists equivalent symbols representative-first; the first one
    /// that was actually materialized wins.
    #[must_use]
    pub fn try_get_user_type(&self, type_name: &str) -> Option<UserTypeId>
    {
        let symbols = self.cache.get_symbols(type_name)?;
        symbols.iter().find_map(|symbol| self.by_symbol.get(&symbol.key()).copied())
    }

    /// Create one user type for a simple (non-family) symbol.
    ///
    /// The variant follows the symbol tag: enums become enum wrappers, UDTs
    /// become physical or template wrappers depending on the name, and the
    /// global-scope pseudo-symbol becomes the per-module globals aggregate.
    pub fn add_symbol(&mut self, symbol: &SymbolRef, namespace: &str) -> GenResult<UserTypeId>
    {
        let id = match symbol.tag() {
            SymbolTag::Enum => self.add_with_kind(symbol, namespace, UserTypeKind::Enum),
            SymbolTag::GlobalScope => {
                let user_type = UserType {
                    symbol: Some(symbol.clone()),
                    namespace: namespace.to_string(),
                    constructor_name: "ModuleGlobals".to_string(),
                    declared_in: None,
                    nested: Vec::new(),
                    usings: self.seed_usings(symbol),
                    kind: UserTypeKind::Globals,
                };
                self.insert(symbol, user_type)
            }
            _ => {
                let parsed = ParsedName::parse(symbol.name())?;
                if parsed.is_template() {
                    let ids = self.add_family(std::slice::from_ref(symbol), namespace)?;
                    ids[0]
                } else {
                    self.add_with_kind(symbol, namespace, UserTypeKind::Physical)
                }
            }
        };
        Ok(id)
    }

    /// Create a template family: one primary plus one specialization per
    /// member, every specialization sharing the primary.
    ///
    /// Members whose argument count differs from the primary's are reported
    /// and skipped; the family invariant is that every specialization has the
    /// primary's arity.
    pub fn add_symbols(
        &mut self,
        symbols: &[SymbolRef],
        namespace: &str,
        diagnostics: &Diagnostics,
    ) -> GenResult<Vec<UserTypeId>>
    {
        debug_assert!(!symbols.is_empty());
        let primary_arity = ParsedName::parse(symbols[0].name())?.template_arguments().len();

        let mut family = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let arity = ParsedName::parse(symbol.name())?.template_arguments().len();
            if arity == primary_arity {
                family.push(symbol.clone());
            } else {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    phase: Phase::Collect,
                    module: Some(symbol.module().name().to_string()),
                    symbol: Some(symbol.name().to_string()),
                    message: format!("specialization has {arity} arguments, family primary has {primary_arity}"),
                });
            }
        }

        self.add_family(&family, namespace)
    }

    fn add_family(&mut self, symbols: &[SymbolRef], namespace: &str) -> GenResult<Vec<UserTypeId>>
    {
        let model = &symbols[0];
        let parsed = ParsedName::parse(model.name())?;
        let arity = parsed.template_arguments().len();
        let bare_name = &parsed.last_scope().bare_name;

        let primary_arguments = Self::bind_arguments(&parsed);
        let primary = UserType {
            symbol: Some(model.clone()),
            namespace: namespace.to_string(),
            constructor_name: template_constructor_name(bare_name, arity),
            declared_in: None,
            nested: Vec::new(),
            usings: self.seed_usings(model),
            kind: UserTypeKind::Template(TemplateData {
                specializations: Vec::new(),
                arguments: primary_arguments,
                primary: None,
            }),
        };
        let primary_id = self.insert(model, primary);

        let mut ids = vec![primary_id];
        let mut specialization_ids = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let specialized = ParsedName::parse(symbol.name())?;
            let specialization = UserType {
                symbol: Some(symbol.clone()),
                namespace: namespace.to_string(),
                constructor_name: template_constructor_name(&specialized.last_scope().bare_name, arity),
                declared_in: Some(primary_id),
                nested: Vec::new(),
                usings: self.seed_usings(symbol),
                kind: UserTypeKind::Template(TemplateData {
                    specializations: Vec::new(),
                    arguments: Self::bind_arguments(&specialized),
                    primary: Some(primary_id),
                }),
            };
            let specialization_id = self.arena.alloc(specialization);
            specialization_ids.push(specialization_id);
            ids.push(specialization_id);
        }
        self.arena
            .get_mut(primary_id)
            .template_data_mut()
            .expect("primary is a template")
            .specializations = specialization_ids;

        Ok(ids)
    }

    fn bind_arguments(parsed: &ParsedName) -> Vec<TemplateArgument>
    {
        parsed
            .template_arguments()
            .iter()
            .enumerate()
            .map(|(index, argument)| TemplateArgument {
                type_name: argument.render(),
                placeholder: format!("T{}", index + 1),
                resolved: ResolvedType::Unresolved(argument.render()),
            })
            .collect()
    }

    fn add_with_kind(&mut self, symbol: &SymbolRef, namespace: &str, kind: UserTypeKind) -> UserTypeId
    {
        let constructor_name = match symbol.parsed_name() {
            Some(parsed) => sanitize_identifier(&parsed.last_scope().bare_name),
            None => sanitize_identifier(symbol.name()),
        };
        let user_type = UserType {
            symbol: Some(symbol.clone()),
            namespace: namespace.to_string(),
            constructor_name,
            declared_in: None,
            nested: Vec::new(),
            usings: self.seed_usings(symbol),
            kind,
        };
        self.insert(symbol, user_type)
    }

    fn insert(&mut self, symbol: &SymbolRef, user_type: UserType) -> UserTypeId
    {
        let id = self.arena.alloc(user_type);
        self.by_symbol.insert(symbol.key(), id);
        id
    }

    /// The usings set: the project-wide default plus every namespace that
    /// appears in a field or base-class type name.
    fn seed_usings(&self, symbol: &SymbolRef) -> std::collections::BTreeSet<String>
    {
        let mut usings = std::collections::BTreeSet::new();
        usings.insert(DEFAULT_USING.to_string());
        if !matches!(symbol.tag(), SymbolTag::Udt | SymbolTag::GlobalScope) {
            return usings;
        }
        for type_name in symbol
            .fields()
            .iter()
            .map(|field| field.type_name.as_str())
            .chain(symbol.base_classes().iter().map(|base| base.type_name.as_str()))
        {
            if let Ok(parsed) = ParsedName::parse(type_name) {
                let namespaces = parsed.namespaces();
                if !namespaces.is_empty() {
                    usings.insert(namespaces.join("."));
                }
            }
        }
        usings
    }

    /// Link phase: resolve every specialization argument to a user type where
    /// one exists, leaving the rest untyped with a note on the channel.
    pub fn update_template_arguments(&mut self, diagnostics: &Diagnostics)
    {
        let ids: Vec<UserTypeId> = self.arena.ids().collect();
        for id in ids {
            let Some(data) = self.arena.get(id).template_data() else {
                continue;
            };
            let resolutions: Vec<ResolvedType> = data
                .arguments
                .iter()
                .map(|argument| match self.try_get_user_type(&argument.type_name) {
                    Some(target) => ResolvedType::User(target),
                    None => ResolvedType::Unresolved(self.transform(&argument.type_name)),
                })
                .collect();

            let symbol_name = self
                .arena
                .get(id)
                .symbol
                .as_ref()
                .map(|symbol| symbol.name().to_string())
                .unwrap_or_default();
            let module_name = self
                .arena
                .get(id)
                .symbol
                .as_ref()
                .map(|symbol| symbol.module().name().to_string());

            let data = self.arena.get_mut(id).template_data_mut().expect("checked above");
            for (argument, resolved) in data.arguments.iter_mut().zip(resolutions) {
                if matches!(resolved, ResolvedType::Unresolved(_)) {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Note,
                        phase: Phase::Link,
                        module: module_name.clone(),
                        symbol: Some(symbol_name.clone()),
                        message: format!("template argument `{}` has no generated type", argument.type_name),
                    });
                }
                argument.resolved = resolved;
            }
        }
    }

    /// Post-processing: compute `declared_in` for every user type by walking
    /// its qualified name, synthesizing namespace containers for namespace
    /// segments and for enclosing class names that have no generated type.
    ///
    /// Returns the namespace roots, in first-synthesis order.
    pub fn process_types(&mut self) -> Vec<UserTypeId>
    {
        let mut containers: HashMap<(Option<UserTypeId>, String), UserTypeId> = HashMap::new();
        let mut roots: Vec<UserTypeId> = Vec::new();

        let ids: Vec<UserTypeId> = self.arena.ids().collect();
        for id in ids {
            let user_type = self.arena.get(id);
            if user_type.kind.is_namespace() || user_type.declared_in.is_some() {
                continue;
            }
            let Some(symbol) = user_type.symbol.clone() else {
                continue;
            };

            let mut parent: Option<UserTypeId> = None;
            for segment in user_type.namespace.split('.').map(str::to_string).collect::<Vec<_>>() {
                parent = Some(self.container(&mut containers, &mut roots, parent, &segment));
            }

            // Enclosing scopes of the symbol name: an existing generated type
            // means class nesting; anything else gets a synthesized container.
            let scopes: Vec<String> = symbol.namespaces().to_vec();
            let mut prefix = String::new();
            for scope in scopes {
                if !prefix.is_empty() {
                    prefix.push_str("::");
                }
                prefix.push_str(&scope);
                if let Some(existing) = self.try_get_user_type(&prefix) {
                    if existing != id {
                        parent = Some(existing);
                        continue;
                    }
                }
                let segment = sanitize_identifier(&scope);
                parent = Some(self.container(&mut containers, &mut roots, parent, &segment));
            }

            if let Some(parent_id) = parent {
                self.arena.get_mut(id).declared_in = Some(parent_id);
                self.arena.get_mut(parent_id).nested.push(id);
            }
        }

        roots
    }

    fn container(
        &mut self,
        containers: &mut HashMap<(Option<UserTypeId>, String), UserTypeId>,
        roots: &mut Vec<UserTypeId>,
        parent: Option<UserTypeId>,
        segment: &str,
    ) -> UserTypeId
    {
        if let Some(existing) = containers.get(&(parent, segment.to_string())) {
            return *existing;
        }
        let node = UserType {
            symbol: None,
            namespace: String::new(),
            constructor_name: segment.to_string(),
            declared_in: parent,
            nested: Vec::new(),
            usings: std::collections::BTreeSet::new(),
            kind: UserTypeKind::Namespace {
                name: segment.to_string(),
            },
        };
        let id = self.arena.alloc(node);
        containers.insert((parent, segment.to_string()), id);
        match parent {
            Some(parent_id) => self.arena.get_mut(parent_id).nested.push(id),
            None => roots.push(id),
        }
        id
    }
}

impl TypeResolver for UserTypeFactory
{
    fn try_resolve(&self, type_name: &str) -> ResolvedType
    {
        match self.try_get_user_type(type_name) {
            Some(id) => ResolvedType::User(id),
            None => ResolvedType::Unresolved(self.transform(type_name)),
        }
    }

    fn transform(&self, type_name: &str) -> String
    {
        for transformation in &self.transformations {
            if let Some(prefix) = transformation.pattern.strip_suffix('*') {
                if let Some(tail) = type_name.strip_prefix(prefix) {
                    return format!("{}{}", transformation.replacement, tail);
                }
            } else if type_name == transformation.pattern {
                return transformation.replacement.clone();
            }
        }
        type_name.to_string()
    }
}
