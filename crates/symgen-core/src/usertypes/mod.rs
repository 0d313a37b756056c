//! # User Types
//!
//! The generated-type graph: one `UserType` per native UDT, enum, template
//! family member, module global scope, or synthesized namespace container.
//!
//! ## Module Structure
//!
//! - **`arena`**: arena storage with integer handles and parent indices
//! - **`user_type`**: the variants and their shared data
//! - **`write`**: per-variant source emission against an `IndentedWriter`
//!
//! User types are created during the collect/materialize phases, mutated only
//! by template-argument linking and post-processing, and are read-only during
//! emission.

pub mod arena;
pub mod user_type;
pub mod write;

pub use arena::{TypeArena, UserTypeId};
pub use user_type::{
    sanitize_identifier, template_constructor_name, ResolvedType, TemplateArgument, TemplateData, UserType, UserTypeKind,
    DEFAULT_USING,
};
pub use write::WriteOptions;
