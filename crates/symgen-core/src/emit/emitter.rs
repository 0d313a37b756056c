//! Drives user types through their `write_code` into output files.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use rayon::prelude::*;

use crate::config::Configuration;
use crate::error::{GenError, GenResult};
use crate::factory::UserTypeFactory;
use crate::symbols::SymbolTag;
use crate::usertypes::{TypeArena, UserType, UserTypeId, UserTypeKind, WriteOptions};

use super::writer::{BufferPool, IndentedWriter, TextWriter};

/// What a run emitted.
#[derive(Debug, Default)]
pub struct EmitOutput
{
    /// Every file written, sorted for reporting and the props manifest.
    pub files: Vec<PathBuf>,
}

/// Emits generated source, one file per type or concatenated.
pub struct CodeEmitter<'a>
{
    factory: &'a UserTypeFactory,
    configuration: &'a Configuration,
    pool: BufferPool,
}

impl<'a> CodeEmitter<'a>
{
    #[must_use]
    pub fn new(factory: &'a UserTypeFactory, configuration: &'a Configuration) -> Self
    {
        Self {
            factory,
            configuration,
            pool: BufferPool::new(),
        }
    }

    /// Run emission. `roots` are the namespace roots from post-processing,
    /// used by single-file mode to write the graph top-down.
    pub fn emit(&self, roots: &[UserTypeId]) -> GenResult<EmitOutput>
    {
        fs::create_dir_all(&self.configuration.output_directory)?;
        if self.configuration.single_file_export() {
            self.emit_single_file(roots)
        } else {
            self.emit_per_file()
        }
    }

    /// One file per emit-unit type, in parallel. Filename collisions are
    /// resolved by reserving the lowercased path in a shared map and retrying
    /// with `_1`, `_2`, ... suffixes.
    fn emit_per_file(&self) -> GenResult<EmitOutput>
    {
        let arena = self.factory.arena();
        let units: Vec<UserTypeId> = arena.ids().filter(|id| is_emit_unit(arena, *id)).collect();
        let options = WriteOptions::from_flags(self.configuration.generation_flags);

        let reserved: Mutex<HashMap<String, PathBuf>> = Mutex::new(HashMap::new());
        let files: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

        units.par_iter().try_for_each(|id| -> GenResult<()> {
            let user_type = arena.get(*id);
            let buffer = self.pool.take();
            let mut writer = TextWriter::with_buffer(buffer);
            self.write_unit(user_type, &mut writer, options)?;

            let path = self.reserve_path(&reserved, &user_type.constructor_name);
            let buffer = writer.into_buffer();
            fs::write(&path, &buffer).map_err(|err| GenError::Emit(format!("{}: {err}", path.display())))?;
            self.pool.give(buffer);
            files.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(path);
            Ok(())
        })?;

        let mut files = files.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        files.sort();
        Ok(EmitOutput { files })
    }

    /// Everything concatenated into one file. Root buffers are produced in
    /// parallel and concatenated in sorted-name order, so the output is fully
    /// deterministic.
    fn emit_single_file(&self, roots: &[UserTypeId]) -> GenResult<EmitOutput>
    {
        let arena = self.factory.arena();
        let options = WriteOptions::from_flags(self.configuration.generation_flags);

        let mut ordered: Vec<UserTypeId> = roots.to_vec();
        ordered.sort_by(|left, right| {
            arena
                .get(*left)
                .constructor_name
                .cmp(&arena.get(*right).constructor_name)
        });

        let buffers: Vec<String> = ordered
            .par_iter()
            .map(|id| -> GenResult<String> {
                let mut writer = TextWriter::with_buffer(self.pool.take());
                arena.get(*id).write_code(arena, self.factory, &mut writer, options)?;
                Ok(writer.into_buffer())
            })
            .collect::<GenResult<Vec<String>>>()?;

        let mut output = String::new();
        for using in self.collect_usings(&ordered) {
            output.push_str(&format!("using {using};\n"));
        }
        output.push('\n');
        for buffer in buffers {
            if !buffer.is_empty() {
                output.push_str(&buffer);
                if !options.compressed {
                    output.push('\n');
                }
            }
            self.pool.give(buffer);
        }

        let name = if self.configuration.generated_assembly_name.is_empty() {
            "generated".to_string()
        } else {
            self.configuration.generated_assembly_name.clone()
        };
        let path = self.configuration.output_directory.join(format!("{name}.cs"));
        fs::write(&path, output).map_err(|err| GenError::Emit(format!("{}: {err}", path.display())))?;
        Ok(EmitOutput { files: vec![path] })
    }

    fn write_unit(&self, user_type: &UserType, writer: &mut TextWriter, options: WriteOptions) -> GenResult<()>
    {
        let arena = self.factory.arena();
        for using in &user_type.usings {
            writer.write_line(&format!("using {using};"))?;
        }
        if !user_type.usings.is_empty() {
            writer.write_line("")?;
        }

        let full = user_type.full_class_name(arena);
        let namespace_path = match full.rfind('.') {
            Some(split) => &full[..split],
            None => "",
        };
        if namespace_path.is_empty() {
            user_type.write_code(arena, self.factory, writer, options)?;
        } else {
            writer.write_line(&format!("namespace {namespace_path}"))?;
            writer.write_line("{")?;
            writer.indent();
            user_type.write_code(arena, self.factory, writer, options)?;
            writer.dedent();
            writer.write_line("}")?;
        }
        Ok(())
    }

    fn reserve_path(&self, reserved: &Mutex<HashMap<String, PathBuf>>, base_name: &str) -> PathBuf
    {
        let mut guard = reserved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut suffix = 0usize;
        loop {
            let candidate = if suffix == 0 {
                format!("{base_name}.cs")
            } else {
                format!("{base_name}_{suffix}.cs")
            };
            let key = candidate.to_lowercase();
            if !guard.contains_key(&key) {
                let path = self.configuration.output_directory.join(candidate);
                guard.insert(key, path.clone());
                return path;
            }
            suffix += 1;
        }
    }

    fn collect_usings(&self, roots: &[UserTypeId]) -> Vec<String>
    {
        let arena = self.factory.arena();
        let mut usings = std::collections::BTreeSet::new();
        let mut stack: Vec<UserTypeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            let user_type = arena.get(id);
            usings.extend(user_type.usings.iter().cloned());
            stack.extend(user_type.nested.iter().copied());
        }
        usings.into_iter().collect()
    }
}

/// Whether a type gets its own file in per-file mode.
///
/// Namespace containers and template specializations are written by their
/// owners; `BaseType`-tagged symbols never emit; a type declared inside a
/// non-namespace ancestor is inlined by that ancestor.
fn is_emit_unit(arena: &TypeArena, id: UserTypeId) -> bool
{
    let user_type = arena.get(id);
    if user_type.kind.is_namespace() {
        return false;
    }
    if let Some(data) = user_type.template_data() {
        if data.primary.is_some() {
            return false;
        }
    }
    if let Some(symbol) = &user_type.symbol {
        if symbol.tag() == SymbolTag::BaseType {
            return false;
        }
    }
    let mut cursor = user_type.declared_in;
    while let Some(parent_id) = cursor {
        let parent = arena.get(parent_id);
        if !matches!(parent.kind, UserTypeKind::Namespace { .. }) {
            return false;
        }
        cursor = parent.declared_in;
    }
    true
}
