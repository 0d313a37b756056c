//! Per-variant source emission.
//!
//! Every user type knows how to write its own wrapper text given the factory
//! (for type-name resolution) and an [`IndentedWriter`] sink. Template bodies
//! are written through a [`TemplateUserTypeFactory`] frame so concrete
//! argument spellings come out as their placeholders.

use crate::config::GenerationFlags;
use crate::emit::writer::IndentedWriter;
use crate::error::GenResult;
use crate::factory::{TemplateUserTypeFactory, TypeResolver, UserTypeFactory};
use crate::names::last_scope_text;
use crate::symbols::{RawField, SymbolRef};

use super::arena::{TypeArena, UserTypeId};
use super::user_type::{sanitize_identifier, ResolvedType, UserType, UserTypeKind};

/// Emission options derived from the configured generation flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions
{
    /// Strip blank separator lines between members.
    pub compressed: bool,
}

impl WriteOptions
{
    #[must_use]
    pub fn from_flags(flags: GenerationFlags) -> Self
    {
        Self {
            compressed: flags.contains(GenerationFlags::COMPRESSED_OUTPUT),
        }
    }
}

impl UserType
{
    /// Write this type's wrapper source.
    pub fn write_code(
        &self,
        arena: &TypeArena,
        factory: &UserTypeFactory,
        writer: &mut dyn IndentedWriter,
        options: WriteOptions,
    ) -> GenResult<()>
    {
        let mut resolver = TemplateUserTypeFactory::new(factory);
        write_type(self, arena, factory, &mut resolver, writer, options)
    }
}

fn write_type(
    user_type: &UserType,
    arena: &TypeArena,
    factory: &UserTypeFactory,
    resolver: &mut TemplateUserTypeFactory<'_>,
    writer: &mut dyn IndentedWriter,
    options: WriteOptions,
) -> GenResult<()>
{
    match &user_type.kind {
        UserTypeKind::Namespace { name } => {
            if user_type.nested.is_empty() {
                return Ok(());
            }
            writer.write_line(&format!("namespace {name}"))?;
            writer.write_line("{")?;
            writer.indent();
            write_nested(&user_type.nested, arena, factory, resolver, writer, options, false)?;
            writer.dedent();
            writer.write_line("}")?;
        }
        UserTypeKind::Enum => write_enum(user_type, writer)?,
        UserTypeKind::Physical => {
            writer.write_line(&format!("public partial class {} : UserType", user_type.constructor_name))?;
            writer.write_line("{")?;
            writer.indent();
            write_body(user_type, arena, factory, resolver, writer, options)?;
            writer.dedent();
            writer.write_line("}")?;
        }
        UserTypeKind::Template(data) => {
            // Specializations are descriptors on the primary; they never
            // write standalone code.
            if data.primary.is_some() {
                return Ok(());
            }
            for specialization_id in &data.specializations {
                let specialization = arena.get(*specialization_id);
                writer.write_line(&specialization_attribute(specialization, arena))?;
            }
            let parameters: Vec<&str> = data
                .arguments
                .iter()
                .map(|argument| argument.placeholder.as_str())
                .collect();
            writer.write_line(&format!(
                "public partial class {}<{}> : UserType",
                user_type.constructor_name,
                parameters.join(", ")
            ))?;
            writer.write_line("{")?;
            writer.indent();
            resolver.push_frame(data);
            let result = write_body(user_type, arena, factory, resolver, writer, options);
            resolver.pop_frame();
            result?;
            writer.dedent();
            writer.write_line("}")?;
        }
        UserTypeKind::Globals => {
            writer.write_line(&format!("public static class {}", user_type.constructor_name))?;
            writer.write_line("{")?;
            writer.indent();
            if let Some(symbol) = &user_type.symbol {
                for field in symbol.fields() {
                    let type_name = resolved_name(resolver, arena, &field.type_name);
                    writer.write_line(&format!(
                        "public static {type_name} {} => GetGlobal<{type_name}>(\"{}\", {});",
                        sanitize_identifier(&field.name),
                        field.name,
                        field.offset
                    ))?;
                }
            }
            writer.dedent();
            writer.write_line("}")?;
        }
    }
    Ok(())
}

fn write_enum(user_type: &UserType, writer: &mut dyn IndentedWriter) -> GenResult<()>
{
    writer.write_line(&format!("public enum {}", user_type.constructor_name))?;
    writer.write_line("{")?;
    writer.indent();
    if let Some(symbol) = &user_type.symbol {
        for value in symbol.enum_values() {
            if value.value.is_empty() {
                writer.write_line(&format!("{},", sanitize_identifier(&value.name)))?;
            } else {
                writer.write_line(&format!("{} = {},", sanitize_identifier(&value.name), value.value))?;
            }
        }
    }
    writer.dedent();
    writer.write_line("}")?;
    Ok(())
}

/// Class body shared by physical and template wrappers: base-class accessors
/// in declaration order, then field accessors, then nested types.
fn write_body(
    user_type: &UserType,
    arena: &TypeArena,
    factory: &UserTypeFactory,
    resolver: &mut TemplateUserTypeFactory<'_>,
    writer: &mut dyn IndentedWriter,
    options: WriteOptions,
) -> GenResult<()>
{
    let Some(symbol) = &user_type.symbol else {
        return Ok(());
    };

    let mut wrote_any = false;
    for (index, base) in symbol.base_classes().iter().enumerate() {
        let type_name = resolved_name(resolver, arena, &base.type_name);
        let accessor = sanitize_identifier(last_scope_text(&base.type_name));
        writer.write_line(&format!(
            "public {type_name} Base_{accessor} => GetBaseClass<{type_name}>({index});"
        ))?;
        wrote_any = true;
    }
    if wrote_any && !options.compressed {
        writer.write_line("")?;
    }

    write_fields(symbol, 0, arena, factory, resolver, writer)?;

    let nested: Vec<UserTypeId> = user_type.nested.clone();
    if !nested.is_empty() {
        if !options.compressed {
            writer.write_line("")?;
        }
        write_nested(&nested, arena, factory, resolver, writer, options, true)?;
    }
    Ok(())
}

/// Field accessors. Anonymous nested UDT fields are flattened into the
/// parent: their members emit here with the outer offset folded in.
fn write_fields(
    symbol: &SymbolRef,
    base_offset: u64,
    arena: &TypeArena,
    factory: &UserTypeFactory,
    resolver: &mut TemplateUserTypeFactory<'_>,
    writer: &mut dyn IndentedWriter,
) -> GenResult<()>
{
    for field in symbol.fields() {
        if last_scope_text(&field.type_name).starts_with('<') {
            if let Some(anonymous) = factory.find_symbol(&field.type_name) {
                write_fields(&anonymous, base_offset + field.offset, arena, factory, resolver, writer)?;
                continue;
            }
        }
        write_field_accessor(field, base_offset, arena, resolver, writer)?;
    }
    Ok(())
}

fn write_field_accessor(
    field: &RawField,
    base_offset: u64,
    arena: &TypeArena,
    resolver: &TemplateUserTypeFactory<'_>,
    writer: &mut dyn IndentedWriter,
) -> GenResult<()>
{
    let type_name = resolved_name(resolver, arena, &field.type_name);
    writer.write_line(&format!(
        "public {type_name} {} => GetField<{type_name}>(\"{}\", {});",
        sanitize_identifier(&field.name),
        field.name,
        base_offset + field.offset
    ))?;
    Ok(())
}

fn write_nested(
    nested: &[UserTypeId],
    arena: &TypeArena,
    factory: &UserTypeFactory,
    resolver: &mut TemplateUserTypeFactory<'_>,
    writer: &mut dyn IndentedWriter,
    options: WriteOptions,
    inline: bool,
) -> GenResult<()>
{
    let mut first = true;
    for id in nested {
        let child = arena.get(*id);
        // Inside a class body only real nested types appear; at namespace
        // level specializations and empty containers are skipped too.
        if !inline {
            if let Some(data) = child.template_data() {
                if data.primary.is_some() {
                    continue;
                }
            }
        }
        if !first && !options.compressed {
            writer.write_line("")?;
        }
        first = false;
        write_type(child, arena, factory, resolver, writer, options)?;
    }
    Ok(())
}

fn specialization_attribute(specialization: &UserType, arena: &TypeArena) -> String
{
    let symbol_name = specialization
        .symbol
        .as_ref()
        .map(|symbol| symbol.name().to_string())
        .unwrap_or_default();
    let arguments: Vec<String> = specialization
        .template_data()
        .map(|data| {
            data.arguments
                .iter()
                .map(|argument| match &argument.resolved {
                    ResolvedType::User(id) => arena.get(*id).full_class_name(arena),
                    ResolvedType::Placeholder(placeholder) => placeholder.clone(),
                    ResolvedType::Unresolved(name) => name.clone(),
                })
                .collect()
        })
        .unwrap_or_default();
    let mut attribute = format!("[TemplateSpecialization(\"{symbol_name}\"");
    for argument in arguments {
        attribute.push_str(&format!(", \"{argument}\""));
    }
    attribute.push_str(")]");
    attribute
}

fn resolved_name(resolver: &TemplateUserTypeFactory<'_>, arena: &TypeArena, type_name: &str) -> String
{
    match resolver.try_resolve(type_name) {
        ResolvedType::User(id) => arena.get(id).full_class_name(arena),
        ResolvedType::Placeholder(placeholder) => placeholder,
        ResolvedType::Unresolved(name) => name,
    }
}
