//! What a successful lookup hands to the emitter.

use lexenv_core::{Modifiers, TypeId};
use std::fmt;

/// Address of a slot as issued to the emitter. Scope-local slots are `u16`;
/// offsets applied by flattened addressing can exceed that range.
pub type Address = u32;

/// A resolved binding.
///
/// `address` and `level` describe the scope that actually holds the binding.
/// `depth` counts the scope boundaries crossed from the scope the lookup
/// started in, and `site_level` is that starting scope's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub address: Address,
    pub depth: u32,
    pub level: u32,
    pub site_level: u32,
    pub modifiers: Modifiers,
    pub ty: TypeId,
    /// Found through a flattened (program/global) scope, so `address` is an
    /// index into the merged frame.
    pub flat: bool,
}

/// Instruction form the emitter should use for a resolved binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Slot in the current frame.
    Local { slot: Address },
    /// Slot in a frame `depth` scopes out.
    Enclosing { depth: u32, slot: Address },
    /// Flat index into the merged program/global frame.
    Global { slot: Address },
}

impl Resolution {
    #[inline]
    pub fn is_final(&self) -> bool {
        self.modifiers.is_final()
    }

    /// Whether reaching the binding crosses a function or class boundary,
    /// i.e. needs a closure/frame indirection rather than a block hop.
    #[inline]
    pub fn crosses_boundary(&self) -> bool {
        self.site_level != self.level
    }

    pub fn access(&self) -> AccessKind {
        if self.flat {
            AccessKind::Global { slot: self.address }
        } else if self.depth == 0 {
            AccessKind::Local { slot: self.address }
        } else {
            AccessKind::Enclosing {
                depth: self.depth,
                slot: self.address,
            }
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Local { slot } => write!(f, "local {}", slot),
            AccessKind::Enclosing { depth, slot } => write!(f, "enclosing {}@{}", slot, depth),
            AccessKind::Global { slot } => write!(f, "global {}", slot),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address={} depth={} level={} type={} modifiers={} ({})",
            self.address,
            self.depth,
            self.level,
            self.ty,
            self.modifiers,
            self.access()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(depth: u32, level: u32, site_level: u32, flat: bool) -> Resolution {
        Resolution {
            address: 2,
            depth,
            level,
            site_level,
            modifiers: Modifiers::NONE,
            ty: TypeId::INT,
            flat,
        }
    }

    #[test]
    fn test_access_kind() {
        assert_eq!(resolution(0, 1, 1, false).access(), AccessKind::Local { slot: 2 });
        assert_eq!(
            resolution(3, 0, 1, false).access(),
            AccessKind::Enclosing { depth: 3, slot: 2 }
        );
        assert_eq!(resolution(2, 0, 1, true).access(), AccessKind::Global { slot: 2 });
    }

    #[test]
    fn test_crosses_boundary() {
        assert!(!resolution(2, 1, 1, false).crosses_boundary());
        assert!(resolution(1, 0, 1, false).crosses_boundary());
    }

    #[test]
    fn test_display() {
        let text = resolution(1, 0, 1, false).to_string();
        assert_eq!(text, "address=2 depth=1 level=0 type=Int modifiers=- (enclosing 2@1)");
    }
}
