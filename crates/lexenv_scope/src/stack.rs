//! The compiler-facing driver over a scope arena.
//!
//! Handles:
//! - Pushing and popping scopes as the compiler enters and leaves constructs
//! - A persistent global scope shared by successive program compilations
//! - Declarations, lookups, assignments and LIFO rollback by source name
//! - Turning final reassignment, unresolved names and slot limits into
//!   diagnostics

use crate::arena::ScopeArena;
use crate::error::{ScopeError, ScopeResult};
use crate::resolution::{Address, Resolution};
use crate::scope::{ScopeId, ScopeRef};
use lexenv_core::{Interner, Modifiers, TypeId, TypeMapper};
use lexenv_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use log::{debug, warn};

/// The lexical construct a scope is pushed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Block,
    Function,
    Class,
    /// Top-level compilation unit. Merged with the global scope when the
    /// stack has one.
    Program,
}

impl ScopeKind {
    /// Whether this construct enters a function/class boundary by default.
    pub fn default_boundary(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Class)
    }

    pub fn from_keyword(word: &str) -> Option<ScopeKind> {
        match word {
            "block" => Some(ScopeKind::Block),
            "function" => Some(ScopeKind::Function),
            "class" => Some(ScopeKind::Class),
            "program" => Some(ScopeKind::Program),
            _ => None,
        }
    }
}

/// Tracks the active chain of scopes for one compilation.
pub struct ScopeStack {
    arena: ScopeArena,
    /// Scopes pushed through `push_scope`, innermost last.
    active: Vec<ScopeId>,
    /// Survives across compilations; never popped.
    global: Option<ScopeId>,
    interner: Interner,
    diagnostics: DiagnosticCollection,
    strict_redeclaration: bool,
    root_is_boundary: bool,
    file: Option<String>,
    line: Option<u32>,
}

impl ScopeStack {
    pub fn new(interner: Interner) -> Self {
        Self::with_arena(interner, ScopeArena::new())
    }

    pub fn with_arena(interner: Interner, arena: ScopeArena) -> Self {
        Self {
            arena,
            active: Vec::new(),
            global: None,
            interner,
            diagnostics: DiagnosticCollection::new(),
            strict_redeclaration: false,
            root_is_boundary: false,
            file: None,
            line: None,
        }
    }

    /// Create the persistent global scope and seed it with host bindings.
    ///
    /// Fails if the stack already has a global scope or active scopes.
    pub fn install_global<'a, I, M>(&mut self, bindings: I, mapper: &M) -> ScopeResult<ScopeId>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
        M: TypeMapper + ?Sized,
    {
        if self.global.is_some() || !self.active.is_empty() {
            return Err(ScopeError::invalid_state(
                "the global scope must be installed before any other scope",
            ));
        }
        let global = self.arena.push_root(false);
        let interner = self.interner.clone();
        let seeded = self.arena.seed(
            global,
            bindings.into_iter().map(|(name, class)| (interner.intern(name), class)),
            mapper,
        )?;
        debug!("installed global {} with {} host bindings", global, seeded);
        self.global = Some(global);
        Ok(global)
    }

    pub fn set_strict_redeclaration(&mut self, strict: bool) {
        self.strict_redeclaration = strict;
    }

    /// Make a root scope pushed onto an empty stack a function boundary.
    pub fn set_root_is_boundary(&mut self, boundary: bool) {
        self.root_is_boundary = boundary;
    }

    /// Location attached to diagnostics reported from now on.
    pub fn set_location(&mut self, file: Option<String>, line: Option<u32>) {
        self.file = file;
        self.line = line;
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn arena(&self) -> &ScopeArena {
        &self.arena
    }

    pub fn global(&self) -> Option<ScopeId> {
        self.global
    }

    /// Number of scopes pushed through `push_scope` and not yet popped.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// The scope declarations and lookups currently go to.
    pub fn current(&self) -> ScopeRef {
        self.active
            .last()
            .or(self.global.as_ref())
            .map_or(ScopeRef::Terminal, |&id| ScopeRef::Scope(id))
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Report a diagnostic at the current location.
    pub fn report(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file.clone(),
            self.line,
            message,
            args,
        ));
    }

    // ========================================================================
    // Scope lifecycle
    // ========================================================================

    /// Enter a lexical construct.
    ///
    /// The first scope on an empty stack is a root, or a flattened program
    /// scope over the global scope when there is one. A program scope can
    /// only be outermost.
    pub fn push_scope(&mut self, kind: ScopeKind, enters_boundary: bool) -> ScopeResult<ScopeId> {
        let id = match (self.active.last().copied(), self.global) {
            (Some(_), _) if kind == ScopeKind::Program => {
                return Err(ScopeError::invalid_state(
                    "a program scope must be the outermost scope",
                ));
            }
            (Some(top), _) => self.arena.push_nested(ScopeRef::Scope(top), enters_boundary)?,
            (None, Some(global)) if kind == ScopeKind::Program => {
                self.arena.push_flattened(ScopeRef::Scope(global))?
            }
            (None, Some(global)) => self.arena.push_nested(ScopeRef::Scope(global), enters_boundary)?,
            (None, None) => self.arena.push_root(enters_boundary || self.root_is_boundary),
        };
        self.active.push(id);
        debug!("enter {:?} as {} (depth {})", kind, id, self.active.len());
        Ok(id)
    }

    /// Leave the innermost construct, releasing its scope.
    ///
    /// A program scope merged with the global scope first commits its
    /// top-level bindings to the global scope at their flat addresses, so
    /// later programs see them. If the global scope has no room left, the
    /// overflow is reported, the program scope is still released and its
    /// bindings are lost.
    pub fn pop_scope(&mut self) -> ScopeResult<()> {
        let id = *self
            .active
            .last()
            .ok_or_else(|| ScopeError::invalid_state("no active scope to pop"))?;
        let committed = if self.merges_into_global(ScopeRef::Scope(id)) {
            self.arena.commit(id).map(|moved| {
                debug!("{} top-level bindings kept in the global scope", moved);
            })
        } else {
            Ok(())
        };
        if let Err(ScopeError::SlotOverflow { limit }) = committed {
            let limit = limit.to_string();
            self.report(&messages::SCOPE_EXCEEDS_MAXIMUM_OF_0_SLOTS, &[&limit]);
        }
        self.arena.release(id)?;
        self.active.pop();
        committed
    }

    /// Pop every active scope, leaving only the global scope. Returns how
    /// many scopes were closed.
    pub fn unwind(&mut self) -> ScopeResult<usize> {
        let mut closed = 0;
        while !self.active.is_empty() {
            self.pop_scope()?;
            closed += 1;
        }
        Ok(closed)
    }

    /// Clear the current scope's bindings so it can be reused in place.
    pub fn reset_scope(&mut self) -> ScopeResult<()> {
        self.arena.clear(self.current())
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Declare `name` in the current scope and return its address.
    pub fn declare(&mut self, name: &str, ty: TypeId, modifiers: Modifiers) -> ScopeResult<Address> {
        let at = self.current();
        let key = self.interner.intern(name);

        if self.merges_into_global(at) {
            if let Some(existing) = self.arena.resolve(at, key) {
                if existing.ty != ty || existing.modifiers != modifiers {
                    warn!(
                        "redeclaration of '{}' as {} [{}] reuses binding {} [{}]",
                        name, ty, modifiers, existing.ty, existing.modifiers
                    );
                    if self.strict_redeclaration {
                        self.report(&messages::REDECLARATION_OF_0_REUSES_EXISTING_BINDING, &[name]);
                    }
                }
            }
        }

        let allocated = self.arena.allocate(at, key, ty, modifiers);
        if let Err(ScopeError::SlotOverflow { limit }) = allocated {
            let limit = limit.to_string();
            self.report(&messages::SCOPE_EXCEEDS_MAXIMUM_OF_0_SLOTS, &[&limit]);
        }
        allocated
    }

    fn merges_into_global(&self, at: ScopeRef) -> bool {
        at.id()
            .and_then(|id| self.arena.get(id))
            .map_or(false, |scope| scope.policy().is_flattened())
    }

    /// Resolve `name` from the current scope.
    pub fn lookup(&self, name: &str) -> Option<Resolution> {
        let key = self.interner.get(name)?;
        self.arena.resolve(self.current(), key)
    }

    /// Resolve `name`, reporting a diagnostic when it is unbound.
    pub fn lookup_or_report(&mut self, name: &str) -> Option<Resolution> {
        let found = self.lookup(name);
        if found.is_none() {
            self.report(&messages::CANNOT_FIND_NAME_0, &[name]);
        }
        found
    }

    pub fn address_of(&self, name: &str) -> Option<Address> {
        let key = self.interner.get(name)?;
        self.arena.address_of(self.current(), key)
    }

    /// Record an assignment to `name`. A second assignment to a final
    /// binding returns `false` and reports a diagnostic.
    pub fn assign(&mut self, name: &str) -> bool {
        let Some(key) = self.interner.get(name) else {
            return true;
        };
        let at = self.current();
        let allowed = self.arena.mark_assigned(at, key);
        if !allowed {
            self.report(&messages::CANNOT_REASSIGN_FINAL_BINDING_0, &[name]);
        }
        allowed
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.interner
            .get(name)
            .map_or(false, |key| self.arena.is_assigned(self.current(), key))
    }

    /// Roll back the most recent declaration in the current scope.
    pub fn remove_last(&mut self, name: &str) -> ScopeResult<()> {
        let key = self
            .interner
            .get(name)
            .ok_or_else(|| ScopeError::invalid_state(format!("'{}' was never declared", name)))?;
        let at = self.current();
        self.arena.remove(at, key)
    }

    pub fn level(&self) -> u32 {
        self.arena.level(self.current())
    }

    pub fn size(&self) -> usize {
        self.arena.size(self.current())
    }

    pub fn ancestor_at(&self, distance: i32) -> Option<ScopeRef> {
        self.arena.ancestor_at(self.current(), distance)
    }
}
