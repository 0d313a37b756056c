//! Template-argument rebinding decorator.

use std::collections::HashMap;

use crate::usertypes::{ResolvedType, TemplateData};

use super::{TypeResolver, UserTypeFactory};

/// C++ spellings that may substitute for each other when matching a type name
/// against a template argument. Matching is symmetric and tried only when the
/// literal name misses.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("wchar_t", "unsigned short"),
    ("long long", "__int64"),
    ("unsigned long long", "unsigned __int64"),
];

/// Decorates a [`UserTypeFactory`] while one template body is being written.
///
/// Every frame maps a concrete argument spelling to the placeholder it binds
/// to in the enclosing body. Frames stack when template bodies nest; lookups
/// walk from the innermost frame outwards.
pub struct TemplateUserTypeFactory<'a>
{
    base: &'a UserTypeFactory,
    frames: Vec<HashMap<String, String>>,
}

impl<'a> TemplateUserTypeFactory<'a>
{
    #[must_use]
    pub fn new(base: &'a UserTypeFactory) -> Self
    {
        Self {
            base,
            frames: Vec::new(),
        }
    }

    /// Enter a template body: bind its argument spellings to placeholders.
    pub fn push_frame(&mut self, data: &TemplateData)
    {
        let frame = data
            .arguments
            .iter()
            .map(|argument| (argument.type_name.clone(), argument.placeholder.clone()))
            .collect();
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self)
    {
        self.frames.pop();
    }

    /// The placeholder a type name binds to, if any.
    ///
    /// Tries the literal spelling first; on a miss, retries through the alias
    /// table in both directions.
    #[must_use]
    pub fn try_get_argument(&self, type_name: &str) -> Option<String>
    {
        if let Some(placeholder) = self.lookup(type_name) {
            return Some(placeholder);
        }
        for (left, right) in TYPE_ALIASES {
            if type_name == *left {
                if let Some(placeholder) = self.lookup(right) {
                    return Some(placeholder);
                }
            }
            if type_name == *right {
                if let Some(placeholder) = self.lookup(left) {
                    return Some(placeholder);
                }
            }
        }
        None
    }

    fn lookup(&self, type_name: &str) -> Option<String>
    {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(type_name).cloned())
    }
}

impl TypeResolver for TemplateUserTypeFactory<'_>
{
    fn try_resolve(&self, type_name: &str) -> ResolvedType
    {
        if let Some(placeholder) = self.try_get_argument(type_name) {
            return ResolvedType::Placeholder(placeholder);
        }
        self.base.try_resolve(type_name)
    }

    fn transform(&self, type_name: &str) -> String
    {
        self.base.transform(type_name)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::usertypes::{ResolvedType, TemplateArgument, TemplateData};

    fn data(bindings: &[(&str, &str)]) -> TemplateData
    {
        TemplateData {
            specializations: Vec::new(),
            arguments: bindings
                .iter()
                .map(|(name, placeholder)| TemplateArgument {
                    type_name: (*name).to_string(),
                    placeholder: (*placeholder).to_string(),
                    resolved: ResolvedType::Unresolved((*name).to_string()),
                })
                .collect(),
            primary: None,
        }
    }

    #[test]
    fn test_literal_match()
    {
        let factory = UserTypeFactory::new(Vec::new(), std::sync::Arc::new(crate::symbols::GlobalCache::new()));
        let mut decorated = TemplateUserTypeFactory::new(&factory);
        decorated.push_frame(&data(&[("int", "T1")]));
        assert_eq!(decorated.try_get_argument("int").as_deref(), Some("T1"));
        assert_eq!(decorated.try_get_argument("float"), None);
    }

    #[test]
    fn test_alias_match_is_symmetric()
    {
        let factory = UserTypeFactory::new(Vec::new(), std::sync::Arc::new(crate::symbols::GlobalCache::new()));
        let mut decorated = TemplateUserTypeFactory::new(&factory);
        decorated.push_frame(&data(&[("wchar_t", "T1"), ("unsigned __int64", "T2")]));

        assert_eq!(decorated.try_get_argument("unsigned short").as_deref(), Some("T1"));
        assert_eq!(decorated.try_get_argument("wchar_t").as_deref(), Some("T1"));
        assert_eq!(decorated.try_get_argument("unsigned long long").as_deref(), Some("T2"));
    }

    #[test]
    fn test_literal_wins_over_alias()
    {
        let factory = UserTypeFactory::new(Vec::new(), std::sync::Arc::new(crate::symbols::GlobalCache::new()));
        let mut decorated = TemplateUserTypeFactory::new(&factory);
        decorated.push_frame(&data(&[("unsigned short", "T1"), ("wchar_t", "T2")]));
        assert_eq!(decorated.try_get_argument("unsigned short").as_deref(), Some("T1"));
    }

    #[test]
    fn test_inner_frame_shadows_outer()
    {
        let factory = UserTypeFactory::new(Vec::new(), std::sync::Arc::new(crate::symbols::GlobalCache::new()));
        let mut decorated = TemplateUserTypeFactory::new(&factory);
        decorated.push_frame(&data(&[("int", "T1")]));
        decorated.push_frame(&data(&[("int", "T9")]));
        assert_eq!(decorated.try_get_argument("int").as_deref(), Some("T9"));
        decorated.pop_frame();
        assert_eq!(decorated.try_get_argument("int").as_deref(), Some("T1"));
    }
}
