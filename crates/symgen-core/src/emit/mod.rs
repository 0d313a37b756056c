//! # Emission
//!
//! Turns the linked user-type graph into generated source text.
//!
//! ## Module Structure
//!
//! - **`writer`**: the `IndentedWriter` sink contract, an in-memory
//!   implementation, and the per-worker scratch buffer pool
//! - **`emitter`**: per-file and single-file emission over the arena

pub mod emitter;
pub mod writer;

pub use emitter::{CodeEmitter, EmitOutput};
pub use writer::{BufferPool, IndentedWriter, TextWriter};
