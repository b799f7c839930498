//! Name interning for the scope chain.
//!
//! Every identifier that reaches a scope is interned once, so slot tables
//! key on a `u32` handle and name comparison is an integer comparison.

use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// An interned identifier. Lightweight `Copy` handle into an [`Interner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(Spur);

impl Name {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

/// Shared identifier interner.
///
/// Cloning is cheap: clones share the same table, which lets the driver and
/// its diagnostics render names handed out by either side.
#[derive(Clone)]
pub struct Interner {
    rodeo: Arc<ThreadedRodeo>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `s`, returning the existing handle if it was seen before.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        Name::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Look up a name without interning it. A name that was never interned
    /// cannot be bound in any scope.
    #[inline]
    pub fn get(&self, s: &str) -> Option<Name> {
        self.rodeo.get(s).map(Name::from_spur)
    }

    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        self.rodeo.resolve(&name.as_spur())
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let interner = Interner::new();
        let a = interner.intern("counter");
        let b = interner.intern("counter");
        let c = interner.intern("total");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(c), "total");
    }

    #[test]
    fn test_get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("x").is_none());
        assert!(interner.is_empty());
        let x = interner.intern("x");
        assert_eq!(interner.get("x"), Some(x));
    }

    #[test]
    fn test_clones_share_table() {
        let interner = Interner::new();
        let shared = interner.clone();
        let name = shared.intern("print");
        assert_eq!(interner.get("print"), Some(name));
        assert_eq!(interner.resolve(name), "print");
        assert_eq!(interner.len(), 1);
    }
}
