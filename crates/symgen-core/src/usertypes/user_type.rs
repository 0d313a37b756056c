//! The user type variants and their shared data.

use std::collections::BTreeSet;

use crate::symbols::SymbolRef;

use super::arena::{TypeArena, UserTypeId};

/// Project-wide namespace every generated wrapper imports.
pub const DEFAULT_USING: &str = "ScriptRuntime";

/// What a resolved field or argument type turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType
{
    /// A generated user type.
    User(UserTypeId),
    /// A template argument placeholder (`T1`, `T2`, ...) of the enclosing
    /// template body.
    Placeholder(String),
    /// Nothing matched; the raw (transformed) name is used as-is.
    Unresolved(String),
}

/// One bound template argument of a specialization.
#[derive(Debug, Clone)]
pub struct TemplateArgument
{
    /// Textual argument as it appears in the symbol name, e.g. `Vec<int>`.
    pub type_name: String,
    /// Placeholder the argument binds to, e.g. `T1`.
    pub placeholder: String,
    /// Link result, filled in during the link phase.
    pub resolved: ResolvedType,
}

/// Template-specific data carried by both the family primary and each
/// observed specialization.
#[derive(Debug, Clone, Default)]
pub struct TemplateData
{
    /// Specializations of this family; populated only on the primary.
    pub specializations: Vec<UserTypeId>,
    /// Bound arguments. On the primary these are the unbound placeholders
    /// themselves; on a specialization, one entry per concrete argument.
    pub arguments: Vec<TemplateArgument>,
    /// Back-reference from a specialization to its family primary.
    pub primary: Option<UserTypeId>,
}

impl TemplateData
{
    /// Number of type parameters.
    #[must_use]
    pub fn arity(&self) -> usize
    {
        self.arguments.len()
    }
}

/// Discriminates the user type variants.
#[derive(Debug, Clone)]
pub enum UserTypeKind
{
    /// Struct/class wrapper with typed field accessors.
    Physical,
    /// Enumerated type; values preserved verbatim.
    Enum,
    /// Template family primary or one of its specializations.
    Template(TemplateData),
    /// Synthetic container for nested types; has no symbol.
    Namespace
    {
        name: String,
    },
    /// Per-module aggregation of the global scope.
    Globals,
}

impl UserTypeKind
{
    #[must_use]
    pub fn is_namespace(&self) -> bool
    {
        matches!(self, UserTypeKind::Namespace { .. })
    }

    #[must_use]
    pub fn is_template(&self) -> bool
    {
        matches!(self, UserTypeKind::Template(_))
    }
}

/// One generated type.
///
/// `declared_in` forms a tree over the arena; namespace ancestors contribute
/// to the full class name, class ancestors additionally suppress standalone
/// emission (the parent inlines the child).
#[derive(Debug, Clone)]
pub struct UserType
{
    /// Declaring symbol. `None` for synthesized namespace nodes.
    pub symbol: Option<SymbolRef>,
    /// Target namespace assigned by deduplication.
    pub namespace: String,
    /// Emitted class identifier.
    pub constructor_name: String,
    /// Enclosing user type, if any.
    pub declared_in: Option<UserTypeId>,
    /// Types declared inside this one.
    pub nested: Vec<UserTypeId>,
    /// Namespaces the generated source imports.
    pub usings: BTreeSet<String>,
    pub kind: UserTypeKind,
}

impl UserType
{
    /// Fully qualified generated name: namespace, then every ancestor's
    /// constructor name down to this type.
    #[must_use]
    pub fn full_class_name(&self, arena: &TypeArena) -> String
    {
        let mut segments = vec![self.constructor_name.clone()];
        let mut cursor = self.declared_in;
        let mut root_namespace = self.namespace.clone();
        while let Some(parent_id) = cursor {
            let parent = arena.get(parent_id);
            segments.push(parent.constructor_name.clone());
            root_namespace = parent.namespace.clone();
            cursor = parent.declared_in;
        }
        if !root_namespace.is_empty() {
            segments.push(root_namespace);
        }
        segments.reverse();
        segments.join(".")
    }

    /// Template data when this is a template primary or specialization.
    #[must_use]
    pub fn template_data(&self) -> Option<&TemplateData>
    {
        match &self.kind {
            UserTypeKind::Template(data) => Some(data),
            _ => None,
        }
    }

    pub fn template_data_mut(&mut self) -> Option<&mut TemplateData>
    {
        match &mut self.kind {
            UserTypeKind::Template(data) => Some(data),
            _ => None,
        }
    }
}

/// Turn an arbitrary scope name into a valid emitted identifier.
///
/// Template arity tags use `_`: the family `Vec<>` with one parameter becomes
/// `Vec_1`, mirroring how reflection spells generic arity.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String
{
    let mut sanitized = String::with_capacity(name.len());
    for (index, character) in name.chars().enumerate() {
        let valid = character == '_' || character.is_ascii_alphabetic() || (index > 0 && character.is_ascii_digit());
        sanitized.push(if valid { character } else { '_' });
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }
    sanitized
}

/// Emitted class identifier for a template family member.
#[must_use]
pub fn template_constructor_name(bare_name: &str, arity: usize) -> String
{
    format!("{}_{arity}", sanitize_identifier(bare_name))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_sanitize_identifier()
    {
        assert_eq!(sanitize_identifier("Foo"), "Foo");
        assert_eq!(sanitize_identifier("Foo Bar"), "Foo_Bar");
        assert_eq!(sanitize_identifier("1st"), "_st");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_template_constructor_name()
    {
        assert_eq!(template_constructor_name("Vec", 1), "Vec_1");
        assert_eq!(template_constructor_name("Map", 2), "Map_2");
    }
}
