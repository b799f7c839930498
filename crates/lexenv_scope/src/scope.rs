//! A single lexical scope and the handles used to link scopes together.

use crate::slot_table::SlotTable;
use lexenv_core::Name;
use rustc_hash::FxHashSet;
use std::fmt;

/// Index of a scope inside its [`ScopeArena`](crate::ScopeArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// A link in a scope chain: either an arena scope or the terminal scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeRef {
    Scope(ScopeId),
    Terminal,
}

impl ScopeRef {
    pub fn id(self) -> Option<ScopeId> {
        match self {
            ScopeRef::Scope(id) => Some(id),
            ScopeRef::Terminal => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ScopeRef::Terminal)
    }
}

impl From<ScopeId> for ScopeRef {
    fn from(id: ScopeId) -> Self {
        ScopeRef::Scope(id)
    }
}

/// The policy decisions that distinguish scope variants: how the level is
/// derived and whether local addresses are offset into a merged frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePolicy {
    /// Chain root with no parent. `boundary` makes the root itself a
    /// function/class boundary (level 1 instead of 0).
    Root { boundary: bool },
    /// Block, function or class scope under a parent.
    Nested { boundary: bool },
    /// Program scope merged with its parent into one contiguous frame.
    Flattened,
}

impl ScopePolicy {
    #[inline]
    pub fn is_flattened(self) -> bool {
        matches!(self, ScopePolicy::Flattened)
    }

    /// Level of a scope with this policy given its parent's level.
    pub fn level_under(self, parent_level: u32) -> u32 {
        match self {
            ScopePolicy::Root { boundary } => boundary as u32,
            ScopePolicy::Nested { boundary } => parent_level + boundary as u32,
            ScopePolicy::Flattened => 0,
        }
    }
}

/// One lexical scope: its own slots, the names assigned so far, and a
/// non-owning link to its parent.
#[derive(Debug)]
pub struct Scope {
    policy: ScopePolicy,
    parent: Option<ScopeRef>,
    level: u32,
    pub(crate) table: SlotTable,
    pub(crate) assigned: FxHashSet<Name>,
}

impl Scope {
    pub(crate) fn new(policy: ScopePolicy, parent: Option<ScopeRef>, level: u32, slot_limit: usize) -> Self {
        Self {
            policy,
            parent,
            level,
            table: SlotTable::with_limit(slot_limit),
            assigned: FxHashSet::default(),
        }
    }

    /// Re-purpose a pooled scope. The table must already be clear.
    pub(crate) fn reinit(&mut self, policy: ScopePolicy, parent: Option<ScopeRef>, level: u32) {
        debug_assert!(self.table.is_empty() && self.assigned.is_empty());
        self.policy = policy;
        self.parent = parent;
        self.level = level;
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
        self.assigned.clear();
    }

    #[inline]
    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of slots allocated in this scope alone.
    #[inline]
    pub fn own_size(&self) -> usize {
        self.table.len()
    }

    pub fn table(&self) -> &SlotTable {
        &self.table
    }

    pub fn is_assigned_locally(&self, name: Name) -> bool {
        self.assigned.contains(&name)
    }
}
