//! # Pipeline
//!
//! The phased driver: Load → Enumerate → Deduplicate → Collect → Materialize
//! → Link → Post-process → Emit (→ Compile).
//!
//! Load, enumerate, collect and emit are data-parallel over disjoint inputs;
//! everything in between runs on the coordinating thread over the accumulated
//! state. The driver owns every collection; worker threads only ever hold
//! shared references and `Arc` handles.

pub mod generator;

pub use generator::{GenerationOutcome, Generator};
