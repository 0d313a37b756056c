//! # Deduplicator
//!
//! Cross-module symbol identity reconciliation.
//!
//! Modules routinely carry the same type: forward declarations (size 0),
//! identical definitions, or genuinely different types that happen to share a
//! name. The deduplicator groups symbols by name, collapses forward
//! declarations into their sized definitions, splits groups whose members
//! disagree on size, and assigns every symbol the namespace its generated
//! wrapper will live in.
//!
//! Ordering is load-bearing: symbols are processed in the interleaved order
//! the enumerate phase produced, and every tie-break follows first-insertion
//! order, which makes the whole pass a pure function of its input sequence.

use std::collections::HashMap;

use crate::config::Configuration;

use super::symbol::{SymbolKey, SymbolRef};

/// One bucket entry: a representative plus the symbols folded into it.
///
/// Either every member shares the representative's size, or the duplicates
/// are all zero-sized forward declarations of the sized representative.
#[derive(Debug, Clone)]
pub struct SymbolGroup
{
    pub representative: SymbolRef,
    pub duplicates: Vec<SymbolRef>,
}

impl SymbolGroup
{
    fn standalone(symbol: SymbolRef) -> Self
    {
        Self {
            representative: symbol,
            duplicates: Vec::new(),
        }
    }
}

/// Result of the deduplication pass.
pub struct DedupOutput
{
    /// Name → entries. A single entry means the name is unambiguous.
    pub groups_by_name: HashMap<String, Vec<SymbolGroup>>,
    /// First-seen order of names; fixes the materialization order downstream.
    pub order: Vec<String>,
    /// Target namespace per symbol (representatives and duplicates alike).
    pub namespace_assignment: HashMap<SymbolKey, String>,
}

impl DedupOutput
{
    /// Representatives of every entry, in deterministic first-seen order.
    pub fn representatives(&self) -> impl Iterator<Item = &SymbolRef>
    {
        self.order
            .iter()
            .flat_map(|name| self.groups_by_name[name].iter().map(|group| &group.representative))
    }

    /// The cache payload: name → all equivalent symbols, representative first.
    #[must_use]
    pub fn cache_map(&self) -> HashMap<String, Vec<SymbolRef>>
    {
        self.groups_by_name
            .iter()
            .map(|(name, groups)| {
                let mut symbols = Vec::new();
                for group in groups {
                    symbols.push(group.representative.clone());
                    symbols.extend(group.duplicates.iter().cloned());
                }
                (name.clone(), symbols)
            })
            .collect()
    }
}

/// Groups symbols by name with size-based tie-breaking.
pub struct Deduplicator;

impl Deduplicator
{
    /// Run the pass over the interleaved symbol list.
    ///
    /// Per symbol, bucket entries are compared in insertion order:
    /// - both sizes nonzero and unequal: incompatible, try the next entry
    ///   (a *split* happens when no entry is compatible)
    /// - entry representative is zero-sized and the symbol is not: *promote*,
    ///   the symbol takes over as representative and inherits the displaced
    ///   one (and its previously collected duplicates)
    /// - otherwise the symbol folds in as a duplicate
    ///
    /// Names that still hold more than one entry afterwards are *unlinked*:
    /// every folded duplicate is flattened back into the list as its own
    /// entry, so no downstream stage picks a single winner for a name that is
    /// genuinely ambiguous across modules.
    #[must_use]
    pub fn run(symbols: &[SymbolRef], configuration: &Configuration) -> DedupOutput
    {
        let mut groups_by_name: HashMap<String, Vec<SymbolGroup>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for symbol in symbols {
            if !groups_by_name.contains_key(symbol.name()) {
                order.push(symbol.name().to_string());
            }
            let bucket = groups_by_name.entry(symbol.name().to_string()).or_default();

            let mut placed = false;
            for group in bucket.iter_mut() {
                let existing = group.representative.size();
                let incoming = symbol.size();
                if existing != 0 && incoming != 0 && existing != incoming {
                    continue;
                }
                if existing == 0 && incoming != 0 {
                    // Promote in place; the displaced forward declaration and
                    // everything already folded into it stay attached.
                    let displaced = std::mem::replace(&mut group.representative, symbol.clone());
                    group.duplicates.push(displaced);
                } else {
                    group.duplicates.push(symbol.clone());
                }
                placed = true;
                break;
            }
            if !placed {
                bucket.push(SymbolGroup::standalone(symbol.clone()));
            }
        }

        // Unlink ambiguous names: each member stands alone.
        for bucket in groups_by_name.values_mut() {
            if bucket.len() <= 1 {
                continue;
            }
            let mut flattened = Vec::with_capacity(bucket.len());
            for group in bucket.drain(..) {
                let SymbolGroup {
                    representative,
                    duplicates,
                } = group;
                flattened.push(SymbolGroup::standalone(representative));
                flattened.extend(duplicates.into_iter().map(SymbolGroup::standalone));
            }
            *bucket = flattened;
        }

        let mut namespace_assignment: HashMap<SymbolKey, String> = HashMap::new();
        for bucket in groups_by_name.values() {
            if bucket.len() == 1 {
                let group = &bucket[0];
                namespace_assignment.insert(group.representative.key(), configuration.common_types_namespace.clone());
                for duplicate in &group.duplicates {
                    namespace_assignment.insert(duplicate.key(), configuration.common_types_namespace.clone());
                }
            } else {
                for group in bucket {
                    namespace_assignment
                        .insert(group.representative.key(), group.representative.module().namespace().to_string());
                    for duplicate in &group.duplicates {
                        namespace_assignment.insert(duplicate.key(), duplicate.module().namespace().to_string());
                    }
                }
            }
        }

        DedupOutput {
            groups_by_name,
            order,
            namespace_assignment,
        }
    }
}
