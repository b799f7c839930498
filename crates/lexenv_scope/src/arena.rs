//! Scope storage and the chain resolution algorithm.
//!
//! Scopes live in a driver-owned arena and name their parent by index, so a
//! chain is a singly linked list with no ownership between links. Parents are
//! always pushed before their children and scopes are released in LIFO order,
//! which keeps every parent index below its child's and the chain acyclic.

use crate::error::{ScopeError, ScopeResult};
use crate::resolution::{Address, Resolution};
use crate::scope::{Scope, ScopeId, ScopePolicy, ScopeRef};
use crate::slot_table::MAX_SLOTS;
use crate::terminal::TERMINAL;
use lexenv_core::{Modifiers, Name, TypeId, TypeMapper};
use log::{debug, trace};

/// Owns every live scope of one compilation, plus a pool of cleared scopes
/// kept for reuse.
///
/// Mutating operations check that a [`ScopeId`] is live and fail with
/// [`ScopeError::InvalidState`] otherwise. The queries (`level`, `size`,
/// `own_size`, `ancestor_at`, `resolve`, `address_of`, `mark_assigned` and
/// `is_assigned`) expect ids handed out by this arena and still live; a stale
/// or foreign id panics.
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    spare: Vec<Scope>,
    slot_limit: usize,
    reuse: bool,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::with_slot_limit(MAX_SLOTS)
    }

    /// Create an arena whose scopes hold at most `limit` slots each.
    pub fn with_slot_limit(limit: usize) -> Self {
        Self {
            scopes: Vec::new(),
            spare: Vec::new(),
            slot_limit: limit.min(MAX_SLOTS),
            reuse: true,
        }
    }

    /// Enable or disable pooling of released scopes.
    pub fn set_reuse(&mut self, reuse: bool) {
        self.reuse = reuse;
        if !reuse {
            self.spare.clear();
        }
    }

    pub fn slot_limit(&self) -> usize {
        self.slot_limit
    }

    /// Number of live scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of released scopes waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.spare.len()
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// Panics if `id` is not live.
    #[inline]
    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn check_live(&self, at: ScopeRef) -> ScopeResult<()> {
        match at {
            ScopeRef::Scope(id) if id.index() >= self.scopes.len() => {
                Err(ScopeError::invalid_state(format!("{} is not a live scope", id)))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Scope lifecycle
    // ========================================================================

    pub fn push_root(&mut self, boundary: bool) -> ScopeId {
        self.push(ScopePolicy::Root { boundary }, None)
    }

    pub fn push_nested(&mut self, parent: ScopeRef, boundary: bool) -> ScopeResult<ScopeId> {
        self.check_live(parent)?;
        Ok(self.push(ScopePolicy::Nested { boundary }, Some(parent)))
    }

    /// Push a program scope merged with `parent` into one flat frame.
    pub fn push_flattened(&mut self, parent: ScopeRef) -> ScopeResult<ScopeId> {
        self.check_live(parent)?;
        Ok(self.push(ScopePolicy::Flattened, Some(parent)))
    }

    fn push(&mut self, policy: ScopePolicy, parent: Option<ScopeRef>) -> ScopeId {
        let parent_level = parent.map_or(0, |p| self.level(p));
        let level = policy.level_under(parent_level);
        let scope = match self.spare.pop() {
            Some(mut pooled) => {
                pooled.reinit(policy, parent, level);
                pooled
            }
            None => Scope::new(policy, parent, level, self.slot_limit),
        };
        let id = ScopeId(self.scopes.len() as u32);
        debug_assert!(parent.and_then(ScopeRef::id).map_or(true, |p| p < id));
        self.scopes.push(scope);
        debug!("push {} {:?} level={} parent={:?}", id, policy, level, parent);
        id
    }

    /// Release the innermost scope. Releasing any other scope would strand
    /// its children, so it fails and nothing changes.
    pub fn release(&mut self, id: ScopeId) -> ScopeResult<()> {
        if id.index() + 1 != self.scopes.len() {
            return Err(ScopeError::invalid_state(format!(
                "{} is not the innermost live scope",
                id
            )));
        }
        if let Some(mut scope) = self.scopes.pop() {
            debug!("release {} ({} slots)", id, scope.own_size());
            if self.reuse {
                scope.clear();
                self.spare.push(scope);
            }
        }
        Ok(())
    }

    /// Move the bindings of the innermost scope, which must be flattened,
    /// into its parent and leave it empty. Bindings are appended in slot
    /// order, so each keeps the flat address it had while merged, along with
    /// its assignment state. Returns the number of bindings moved.
    ///
    /// Fails without changing anything if the parent lacks room for them.
    pub fn commit(&mut self, id: ScopeId) -> ScopeResult<usize> {
        if id.index() + 1 != self.scopes.len() {
            return Err(ScopeError::invalid_state(format!(
                "{} is not the innermost live scope",
                id
            )));
        }
        let scope = self.scope(id);
        if !scope.policy().is_flattened() {
            return Err(ScopeError::invalid_state(format!("{} is not a flattened scope", id)));
        }
        let parent = match scope.parent() {
            Some(ScopeRef::Scope(parent)) => parent,
            _ => return Err(ScopeError::Unsupported { operation: "commit" }),
        };

        let moved: Vec<_> = scope
            .table
            .iter()
            .map(|(slot, name)| {
                (
                    name,
                    scope.table.type_of(slot),
                    scope.table.modifiers_of(slot),
                    scope.is_assigned_locally(name),
                )
            })
            .collect();
        let target = &self.scopes[parent.index()];
        if target.own_size() + moved.len() > target.table.limit() {
            return Err(ScopeError::SlotOverflow { limit: target.table.limit() });
        }

        let base = target.own_size();
        let target = &mut self.scopes[parent.index()];
        for (offset, &(name, ty, modifiers, assigned)) in moved.iter().enumerate() {
            let slot = target.table.allocate(name, ty, modifiers)?;
            debug_assert_eq!(slot as usize, base + offset);
            if assigned {
                target.assigned.insert(name);
            }
        }
        self.scopes[id.index()].clear();
        debug!("commit {} into {} ({} bindings)", id, parent, moved.len());
        Ok(moved.len())
    }

    /// Reset a scope's bindings for reuse without releasing it.
    pub fn clear(&mut self, at: ScopeRef) -> ScopeResult<()> {
        match at {
            ScopeRef::Terminal => TERMINAL.clear(),
            ScopeRef::Scope(id) => {
                self.check_live(at)?;
                self.scopes[id.index()].clear();
                debug!("clear {}", id);
                Ok(())
            }
        }
    }

    /// Populate a scope with host-provided bindings. Each binding's type comes
    /// from `mapper` and carries [`Modifiers::HOST`]. Returns the number of
    /// new slots.
    pub fn seed<'a, I, M>(&mut self, at: ScopeId, bindings: I, mapper: &M) -> ScopeResult<usize>
    where
        I: IntoIterator<Item = (Name, &'a str)>,
        M: TypeMapper + ?Sized,
    {
        self.check_live(ScopeRef::Scope(at))?;
        let before = self.own_size(ScopeRef::Scope(at));
        for (name, native_class) in bindings {
            let ty = mapper.type_of(native_class);
            self.allocate(ScopeRef::Scope(at), name, ty, Modifiers::HOST)?;
        }
        Ok(self.own_size(ScopeRef::Scope(at)) - before)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn level(&self, at: ScopeRef) -> u32 {
        match at {
            ScopeRef::Terminal => TERMINAL.level(),
            ScopeRef::Scope(id) => self.scope(id).level(),
        }
    }

    /// Size as seen by addressing: a flattened scope includes its parent's
    /// size, every other scope reports only its own slots.
    pub fn size(&self, at: ScopeRef) -> usize {
        match at {
            ScopeRef::Terminal => TERMINAL.size(),
            ScopeRef::Scope(id) => {
                let scope = self.scope(id);
                if scope.policy().is_flattened() {
                    self.parent_size(scope) as usize + scope.own_size()
                } else {
                    scope.own_size()
                }
            }
        }
    }

    pub fn own_size(&self, at: ScopeRef) -> usize {
        match at {
            ScopeRef::Terminal => 0,
            ScopeRef::Scope(id) => self.scope(id).own_size(),
        }
    }

    fn parent_size(&self, scope: &Scope) -> Address {
        scope.parent().map_or(0, |p| self.size(p) as Address)
    }

    /// Walk `distance` links up from `at`. Distance 0 is `at` itself.
    pub fn ancestor_at(&self, at: ScopeRef, distance: i32) -> Option<ScopeRef> {
        if distance < 0 {
            return None;
        }
        let mut current = at;
        for _ in 0..distance {
            current = match current {
                ScopeRef::Terminal => return None,
                ScopeRef::Scope(id) => self.scope(id).parent()?,
            };
        }
        Some(current)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve `name` starting at `at`.
    ///
    /// The address and level in the result belong to the scope holding the
    /// binding. Depth grows by one per link crossed, except across a
    /// flattened scope, whose merged parent is addressed as part of its own
    /// frame.
    pub fn resolve(&self, at: ScopeRef, name: Name) -> Option<Resolution> {
        let mut found = self.resolve_from(at, name)?;
        found.site_level = self.level(at);
        trace!("resolve {:?} from {:?}: {}", name, at, found);
        Some(found)
    }

    fn resolve_from(&self, at: ScopeRef, name: Name) -> Option<Resolution> {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.resolve(name),
            ScopeRef::Scope(id) => id,
        };
        let scope = self.scope(id);
        let flattened = scope.policy().is_flattened();

        if let Some(slot) = scope.table.lookup(name) {
            let offset = if flattened { self.parent_size(scope) } else { 0 };
            return Some(Resolution {
                address: slot as Address + offset,
                depth: 0,
                level: scope.level(),
                site_level: scope.level(),
                modifiers: scope.table.modifiers_of(slot),
                ty: scope.table.type_of(slot),
                flat: flattened,
            });
        }

        let parent = scope.parent()?;
        let mut found = self.resolve_from(parent, name)?;
        if flattened {
            found.address = self.address_of(parent, name)?;
            found.depth = 0;
            found.flat = true;
        } else {
            found.depth += 1;
        }
        Some(found)
    }

    /// Flat address of `name` as seen from `at`: an ancestor's slot is offset
    /// by the own sizes of every scope crossed on the way, starting with
    /// `at` itself.
    pub fn address_of(&self, at: ScopeRef, name: Name) -> Option<Address> {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.address_of(name),
            ScopeRef::Scope(id) => id,
        };
        let scope = self.scope(id);
        let flattened = scope.policy().is_flattened();

        if let Some(slot) = scope.table.lookup(name) {
            let offset = if flattened { self.parent_size(scope) } else { 0 };
            return Some(slot as Address + offset);
        }

        let inherited = self.address_of(scope.parent()?, name)?;
        if flattened {
            Some(inherited)
        } else {
            Some(inherited + scope.own_size() as Address)
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Declare `name` in `at` and return its address.
    ///
    /// Re-declaring a name already bound in `at` returns the existing
    /// address. A flattened scope also reuses a binding held by its merged
    /// parent; a type or modifier mismatch on that reuse is ignored.
    pub fn allocate(
        &mut self,
        at: ScopeRef,
        name: Name,
        ty: TypeId,
        modifiers: Modifiers,
    ) -> ScopeResult<Address> {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.allocate(name, ty, modifiers),
            ScopeRef::Scope(id) => id,
        };
        self.check_live(at)?;
        let scope = self.scope(id);

        if !scope.policy().is_flattened() {
            let slot = self.scopes[id.index()].table.allocate(name, ty, modifiers)?;
            trace!("allocate {:?} in {} -> slot {}", name, id, slot);
            return Ok(slot as Address);
        }

        let offset = self.parent_size(scope);
        if let Some(slot) = scope.table.lookup(name) {
            return Ok(slot as Address + offset);
        }
        if let Some(parent) = scope.parent() {
            if let Some(existing) = self.address_of(parent, name) {
                trace!("allocate {:?} in {} reuses merged address {}", name, id, existing);
                return Ok(existing);
            }
        }
        let slot = self.scopes[id.index()].table.allocate(name, ty, modifiers)?;
        trace!("allocate {:?} in {} -> slot {} (flat {})", name, id, slot, slot as Address + offset);
        Ok(slot as Address + offset)
    }

    /// Take back the most recent local declaration of `at`. Bindings held by
    /// ancestors cannot be removed through a descendant.
    pub fn remove(&mut self, at: ScopeRef, name: Name) -> ScopeResult<()> {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.remove(name),
            ScopeRef::Scope(id) => id,
        };
        self.check_live(at)?;
        let scope = &mut self.scopes[id.index()];
        let slot = scope.table.remove(name)?;
        scope.assigned.remove(&name);
        trace!("remove {:?} from {} (slot {})", name, id, slot);
        Ok(())
    }

    /// Record an assignment to `name` in the scope that defines it.
    ///
    /// Returns `false` only for a second assignment to a final binding.
    pub fn mark_assigned(&mut self, at: ScopeRef, name: Name) -> bool {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.mark_assigned(name),
            ScopeRef::Scope(id) => id,
        };
        let scope = &mut self.scopes[id.index()];
        if let Some(slot) = scope.table.lookup(name) {
            let first = scope.assigned.insert(name);
            return first || !scope.table.modifiers_of(slot).is_final();
        }
        match scope.parent() {
            Some(parent) => self.mark_assigned(parent, name),
            None => true,
        }
    }

    pub fn is_assigned(&self, at: ScopeRef, name: Name) -> bool {
        let id = match at {
            ScopeRef::Terminal => return TERMINAL.is_assigned(name),
            ScopeRef::Scope(id) => id,
        };
        let scope = self.scope(id);
        if scope.table.contains(name) {
            return scope.is_assigned_locally(name);
        }
        match scope.parent() {
            Some(parent) => self.is_assigned(parent, name),
            None => false,
        }
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
