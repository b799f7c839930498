//! lexenv_scope: Compile-time lexical environments.
//!
//! Resolves variable names to storage slots across nested block, function
//! and class scopes. Each scope owns a [`SlotTable`]; scopes link to their
//! parent by index inside a [`ScopeArena`], and the [`TERMINAL`] scope ends
//! every chain. [`ScopeStack`] is the driver the compiler talks to.

mod arena;
mod error;
mod resolution;
mod scope;
mod slot_table;
mod stack;
mod terminal;

pub use arena::ScopeArena;
pub use error::{ScopeError, ScopeResult};
pub use resolution::{AccessKind, Address, Resolution};
pub use scope::{Scope, ScopeId, ScopePolicy, ScopeRef};
pub use slot_table::{Slot, SlotTable, MAX_SLOTS};
pub use stack::{ScopeKind, ScopeStack};
pub use terminal::{TerminalScope, TERMINAL};
