//! lexenv_core: Shared vocabulary for the lexical environment.
//!
//! Provides interned names, semantic type handles, the host type-mapping
//! seam and binding modifier flags used by every scope crate.

pub mod intern;
pub mod modifiers;
pub mod types;

// Re-export commonly used types
pub use intern::{Interner, Name};
pub use modifiers::Modifiers;
pub use types::{BuiltinTypeMapper, TypeId, TypeMapper};
