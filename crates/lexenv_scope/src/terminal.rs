//! The terminal scope that ends every chain.

use crate::error::{ScopeError, ScopeResult};
use crate::resolution::{Address, Resolution};
use lexenv_core::{Modifiers, Name, TypeId};

/// Stateless base case of the resolution recursion.
///
/// Nothing is ever bound here: lookups report "not found", sizes and levels
/// are zero, and mutations are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalScope;

/// The shared terminal scope.
pub const TERMINAL: TerminalScope = TerminalScope;

impl TerminalScope {
    #[inline]
    pub fn resolve(&self, _name: Name) -> Option<Resolution> {
        None
    }

    #[inline]
    pub fn address_of(&self, _name: Name) -> Option<Address> {
        None
    }

    pub fn allocate(&self, _name: Name, _ty: TypeId, _modifiers: Modifiers) -> ScopeResult<Address> {
        Err(ScopeError::Unsupported { operation: "allocate" })
    }

    pub fn remove(&self, _name: Name) -> ScopeResult<()> {
        Err(ScopeError::invalid_state("the terminal scope binds no names"))
    }

    pub fn clear(&self) -> ScopeResult<()> {
        Err(ScopeError::Unsupported { operation: "clear" })
    }

    /// No binding here, so there is no final binding to violate.
    #[inline]
    pub fn mark_assigned(&self, _name: Name) -> bool {
        true
    }

    #[inline]
    pub fn is_assigned(&self, _name: Name) -> bool {
        false
    }

    #[inline]
    pub fn size(&self) -> usize {
        0
    }

    #[inline]
    pub fn level(&self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexenv_core::Interner;

    #[test]
    fn test_terminal_answers() {
        let interner = Interner::new();
        let name = interner.intern("anything");

        assert_eq!(TERMINAL.resolve(name), None);
        assert_eq!(TERMINAL.address_of(name), None);
        assert_eq!(TERMINAL.size(), 0);
        assert_eq!(TERMINAL.level(), 0);
        assert!(!TERMINAL.is_assigned(name));
    }

    #[test]
    fn test_terminal_refuses_mutation() {
        let interner = Interner::new();
        let name = interner.intern("x");

        assert_eq!(
            TERMINAL.allocate(name, TypeId::INT, Modifiers::NONE),
            Err(ScopeError::Unsupported { operation: "allocate" })
        );
        assert!(matches!(TERMINAL.remove(name), Err(ScopeError::InvalidState { .. })));
        assert!(matches!(TERMINAL.clear(), Err(ScopeError::Unsupported { .. })));
    }
}
