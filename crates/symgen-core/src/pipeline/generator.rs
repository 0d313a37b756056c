//! The generation driver.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::compile::{format_diagnostics, Compiler};
use crate::config::Configuration;
use crate::diag::{Diagnostic, Diagnostics, Phase, Severity};
use crate::emit::CodeEmitter;
use crate::error::{GenError, GenResult};
use crate::factory::UserTypeFactory;
use crate::names::{last_scope_text, ParsedName};
use crate::symbols::{Deduplicator, GlobalCache, Module, ModuleId, RawSymbolId, SymbolProvider, SymbolRef, SymbolTag};

/// Summary of a finished run.
#[derive(Debug)]
pub struct GenerationOutcome
{
    /// Files written by the emit phase, sorted.
    pub emitted_files: Vec<PathBuf>,
    /// Number of user types in the final graph, namespace containers included.
    pub user_type_count: usize,
    /// Everything reported on the diagnostics channel.
    pub diagnostics: Vec<Diagnostic>,
}

/// Owns a generation run end to end.
pub struct Generator
{
    configuration: Configuration,
    provider: Arc<dyn SymbolProvider>,
    compiler: Option<Box<dyn Compiler>>,
    diagnostics: Arc<Diagnostics>,
}

/// P5 classification of one deduplication winner.
enum Collected
{
    Template
    {
        namespace: String,
        family: String,
        symbol: SymbolRef,
    },
    Simple
    {
        namespace: String,
        symbol: SymbolRef,
    },
}

impl Generator
{
    #[must_use]
    pub fn new(configuration: Configuration, provider: Arc<dyn SymbolProvider>) -> Self
    {
        Self {
            configuration,
            provider,
            compiler: None,
            diagnostics: Arc::new(Diagnostics::new()),
        }
    }

    /// Attach the downstream compiler invoked when an assembly name is
    /// configured.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Box<dyn Compiler>) -> Self
    {
        self.compiler = Some(compiler);
        self
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics
    {
        &self.diagnostics
    }

    /// Run the whole pipeline.
    ///
    /// ## Errors
    ///
    /// Fatal conditions (configuration, module load, emit I/O, compile
    /// failure) unwind here; everything else lands on the diagnostics channel
    /// and the run continues. Partial artifacts from an aborted run are left
    /// in place.
    pub fn generate(&self) -> GenResult<GenerationOutcome>
    {
        self.configuration.validate()?;

        // P1: load modules.
        let modules: Vec<Arc<Module>> = self
            .configuration
            .modules
            .par_iter()
            .enumerate()
            .map(|(index, config)| Module::open(self.provider.as_ref(), config, ModuleId(index as u32)))
            .collect::<GenResult<Vec<_>>>()?;
        tracing::info!(modules = modules.len(), "modules loaded");

        // P2: enumerate, then interleave round-robin across modules. The
        // interleaved order fixes every deduplication tie-break downstream.
        let per_module: Vec<Vec<SymbolRef>> = modules.par_iter().map(|module| self.enumerate_module(module)).collect();
        let symbols = interleave(per_module);
        tracing::info!(symbols = symbols.len(), "symbols enumerated");

        // P3 + P4: deduplicate and publish the global cache.
        let dedup = Deduplicator::run(&symbols, &self.configuration);
        let cache = Arc::new(GlobalCache::new());
        cache.update(dedup.cache_map());

        // P5: filter and classify winners in parallel.
        let winners: Vec<SymbolRef> = dedup.representatives().cloned().collect();
        let collected: Vec<Option<Collected>> = winners
            .par_iter()
            .map(|symbol| self.classify(symbol, &dedup.namespace_assignment))
            .collect();

        // P6: materialize in deterministic winner order.
        let mut factory = UserTypeFactory::new(self.configuration.transformations.clone(), cache);
        let mut family_index: HashMap<(String, String), usize> = HashMap::new();
        let mut families: Vec<((String, String), Vec<SymbolRef>)> = Vec::new();
        let mut simple: Vec<(String, SymbolRef)> = Vec::new();
        for entry in collected.into_iter().flatten() {
            match entry {
                Collected::Template {
                    namespace,
                    family,
                    symbol,
                } => {
                    let key = (namespace, family);
                    match family_index.get(&key) {
                        Some(index) => families[*index].1.push(symbol),
                        None => {
                            family_index.insert(key.clone(), families.len());
                            families.push((key, vec![symbol]));
                        }
                    }
                }
                Collected::Simple { namespace, symbol } => simple.push((namespace, symbol)),
            }
        }
        for ((namespace, _family), members) in &families {
            factory.add_symbols(members, namespace, &self.diagnostics)?;
        }
        for (namespace, symbol) in &simple {
            factory.add_symbol(symbol, namespace)?;
        }
        for module in &modules {
            factory.add_symbol(&module.global_scope(), module.namespace())?;
        }
        tracing::info!(
            families = families.len(),
            simple = simple.len(),
            "user types materialized"
        );

        // P7: link template arguments; unresolved ones stay textual.
        factory.update_template_arguments(&self.diagnostics);

        // P8: synthesize namespace containers and nest everything.
        let roots = factory.process_types();

        // P9: emit.
        let emitter = CodeEmitter::new(&factory, &self.configuration);
        let output = emitter.emit(&roots)?;
        tracing::info!(files = output.files.len(), "emission finished");

        if !self.configuration.generated_props_file_name.is_empty() {
            self.write_props_file(&output.files)?;
        }
        self.compile_generated(&output.files)?;

        Ok(GenerationOutcome {
            emitted_files: output.files,
            user_type_count: factory.arena().len(),
            diagnostics: self.diagnostics.entries(),
        })
    }

    /// Wildcard matches unioned with the module's full type list, deduplicated
    /// by provider id with first occurrence winning.
    fn enumerate_module(&self, module: &Arc<Module>) -> Vec<SymbolRef>
    {
        let mut seen: HashSet<RawSymbolId> = HashSet::new();
        let mut symbols = Vec::new();
        for pattern in &self.configuration.types {
            let matched = module.find_global_type_wildcard(pattern);
            if matched.is_empty() {
                self.diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    phase: Phase::Enumerate,
                    module: Some(module.name().to_string()),
                    symbol: None,
                    message: format!("pattern {pattern} matched no symbols"),
                });
            }
            for symbol in matched {
                if seen.insert(symbol.key().symbol) {
                    symbols.push(symbol);
                }
            }
        }
        for symbol in module.all_types() {
            if seen.insert(symbol.key().symbol) {
                symbols.push(symbol);
            }
        }
        symbols
    }

    /// The collect filter plus template-family classification.
    fn classify(&self, symbol: &SymbolRef, assignment: &HashMap<crate::symbols::SymbolKey, String>) -> Option<Collected>
    {
        let name = symbol.name();
        if name.starts_with('$') || name.starts_with("__vc_attributes") {
            return None;
        }
        if name.contains('`') || name.contains('&') {
            return None;
        }
        if last_scope_text(name).starts_with('<') {
            return None;
        }
        if !matches!(symbol.tag(), SymbolTag::Udt | SymbolTag::Enum) {
            return None;
        }

        let parsed = match ParsedName::parse(name) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    phase: Phase::Collect,
                    module: Some(symbol.module().name().to_string()),
                    symbol: Some(name.to_string()),
                    message: err.to_string(),
                });
                return None;
            }
        };

        let namespace = assignment
            .get(&symbol.key())
            .cloned()
            .unwrap_or_else(|| symbol.module().namespace().to_string());

        if symbol.tag() == SymbolTag::Udt && parsed.is_template() {
            Some(Collected::Template {
                namespace,
                family: parsed.family_name(),
                symbol: symbol.clone(),
            })
        } else {
            Some(Collected::Simple {
                namespace,
                symbol: symbol.clone(),
            })
        }
    }

    fn write_props_file(&self, files: &[PathBuf]) -> GenResult<()>
    {
        let path = self
            .configuration
            .output_directory
            .join(&self.configuration.generated_props_file_name);
        let mut manifest = String::new();
        for file in files {
            manifest.push_str(&format!("{}\n", file.display()));
        }
        fs::write(&path, manifest).map_err(|err| GenError::Emit(format!("{}: {err}", path.display())))?;
        Ok(())
    }

    /// Hand emitted and included sources to the downstream compiler, once,
    /// when an assembly name is configured.
    fn compile_generated(&self, files: &[PathBuf]) -> GenResult<()>
    {
        if self.configuration.generated_assembly_name.is_empty() {
            return Ok(());
        }
        let Some(compiler) = &self.compiler else {
            self.diagnostics.warn(
                Phase::Compile,
                "assembly name configured but no compiler attached; skipping compile step",
            );
            return Ok(());
        };

        let mut sources: Vec<PathBuf> = files.to_vec();
        sources.extend(self.configuration.included_files.iter().cloned());
        let out_path = self
            .configuration
            .output_directory
            .join(&self.configuration.generated_assembly_name);
        let outcome = compiler.compile(
            &sources,
            &self.configuration.referenced_assemblies,
            &out_path,
            !self.configuration.disable_pdb_generation,
        );
        if !outcome.ok {
            return Err(GenError::Compile(format_diagnostics(&outcome.diagnostics)));
        }
        for line in outcome.diagnostics {
            self.diagnostics.push(Diagnostic {
                severity: Severity::Note,
                phase: Phase::Compile,
                module: None,
                symbol: None,
                message: line,
            });
        }
        Ok(())
    }
}

/// Round-robin interleave: symbol `j` of module `i` precedes symbol `j + 1`
/// of module `0`. Deterministic given module order and each module's
/// enumeration order.
fn interleave(per_module: Vec<Vec<SymbolRef>>) -> Vec<SymbolRef>
{
    let total = per_module.iter().map(Vec::len).sum();
    let longest = per_module.iter().map(Vec::len).max().unwrap_or(0);
    let mut interleaved = Vec::with_capacity(total);
    for position in 0..longest {
        for module_symbols in &per_module {
            if let Some(symbol) = module_symbols.get(position) {
                interleaved.push(symbol.clone());
            }
        }
    }
    interleaved
}
