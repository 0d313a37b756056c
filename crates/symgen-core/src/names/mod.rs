//! # Qualified Name Parsing
//!
//! Parses mangled-style qualified C++ type names such as `A::B<X,Y<Z>>::C`
//! into a tree of nested scopes and template argument lists.
//!
//! The parser is the identity anchor for the whole pipeline: template
//! families are keyed on [`ParsedName::family_name`], namespace assignment
//! reads [`ParsedName::namespaces`], and the factory decides Physical vs
//! Template by [`ParsedName::is_template`].
//!
//! Operator names, function pointers, anonymous-namespace markers and
//! compiler-synthesized symbols (`$...`) are filtered out by the pipeline
//! before names reach this module; over that filtered alphabet the parser is
//! total.

pub mod parser;

pub use parser::{last_scope_text, ParsedName, Scope};
