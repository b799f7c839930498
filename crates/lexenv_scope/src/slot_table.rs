//! Per-scope slot table.

use crate::error::{ScopeError, ScopeResult};
use lexenv_core::{Modifiers, Name, TypeId};
use rustc_hash::FxHashMap;

/// Index of a slot within one scope.
pub type Slot = u16;

/// Upper bound on the number of slots a single scope may hold.
pub const MAX_SLOTS: usize = u16::MAX as usize;

const INITIAL_CAPACITY: usize = 4;

/// Maps names to slot indices for a single scope, with parallel type and
/// modifier columns indexed by slot.
///
/// Slots are handed out densely from 0. Only the most recent slot may be
/// taken back.
#[derive(Debug, Clone)]
pub struct SlotTable {
    index: FxHashMap<Name, Slot>,
    /// Name bound to each slot, in allocation order.
    names: Vec<Name>,
    types: Vec<TypeId>,
    modifiers: Vec<Modifiers>,
    limit: usize,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::with_limit(MAX_SLOTS)
    }

    /// Create a table that refuses to grow past `limit` slots. The limit is
    /// clamped to [`MAX_SLOTS`].
    pub fn with_limit(limit: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            names: Vec::new(),
            types: Vec::new(),
            modifiers: Vec::new(),
            limit: limit.min(MAX_SLOTS),
        }
    }

    /// Bind `name` to a new slot, or return its existing slot untouched.
    pub fn allocate(&mut self, name: Name, ty: TypeId, modifiers: Modifiers) -> ScopeResult<Slot> {
        if let Some(slot) = self.lookup(name) {
            return Ok(slot);
        }
        let next = self.names.len();
        if next >= self.limit {
            return Err(ScopeError::SlotOverflow { limit: self.limit });
        }
        if next == self.names.capacity() {
            self.grow();
        }
        let slot = next as Slot;
        self.index.insert(name, slot);
        self.names.push(name);
        self.types.push(ty);
        self.modifiers.push(modifiers);
        Ok(slot)
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Slot> {
        self.index.get(&name).copied()
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    #[inline]
    pub fn type_of(&self, slot: Slot) -> TypeId {
        debug_assert!((slot as usize) < self.len(), "slot {} out of range", slot);
        self.types[slot as usize]
    }

    #[inline]
    pub fn modifiers_of(&self, slot: Slot) -> Modifiers {
        debug_assert!((slot as usize) < self.len(), "slot {} out of range", slot);
        self.modifiers[slot as usize]
    }

    /// Take back the most recently allocated slot, which must be bound to
    /// `name`. Any other request fails and leaves the table as it was.
    pub fn remove(&mut self, name: Name) -> ScopeResult<Slot> {
        let slot = self
            .lookup(name)
            .ok_or_else(|| ScopeError::invalid_state("name is not bound in this scope"))?;
        let top = self.names.len() - 1;
        if slot as usize != top {
            return Err(ScopeError::invalid_state(format!(
                "slot {} is not the most recently allocated slot ({})",
                slot, top
            )));
        }
        self.names.pop();
        self.types.pop();
        self.modifiers.pop();
        self.index.remove(&name);
        Ok(slot)
    }

    /// Drop every binding but keep the backing storage for reuse.
    pub fn clear(&mut self) {
        self.index.clear();
        self.names.clear();
        self.types.clear();
        self.modifiers.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.names.capacity()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bindings in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Name)> + '_ {
        self.names.iter().enumerate().map(|(slot, &name)| (slot as Slot, name))
    }

    fn grow(&mut self) {
        let additional = self.names.capacity().max(INITIAL_CAPACITY);
        self.names.reserve_exact(additional);
        self.types.reserve_exact(additional);
        self.modifiers.reserve_exact(additional);
        self.index.reserve(additional);
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}
