//! Scope tree and local entry types.

use strum::Display;

use crate::metadata::{lowered::BlockId, range::OffsetRange};

/// Index of a [`Scope`] in its [`ScopeTree`]. The root scope is always `0`.
pub type ScopeId = usize;

/// Where a local lives at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LocalStorage {
    /// An ordinary slot of the step method's frame
    #[strum(to_string = "frame")]
    Frame,
    /// A field of the state-machine object that survives suspension
    #[strum(to_string = "hoisted")]
    Hoisted,
}

/// Whether the debugger shows a local to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LocalVisibility {
    /// Declared in source
    #[strum(to_string = "user")]
    UserVisible,
    /// Introduced by the compiler
    #[strum(to_string = "generated")]
    CompilerGenerated,
}

/// Declared role of a local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// Any local that is not a closure container
    Ordinary,
    /// The compiler-generated object holding variables captured by lambdas
    ClosureContainer,
}

/// A local as emitted into the debug record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Name shown by the debugger
    pub name: String,
    /// Dense slot id, unique within the method
    pub slot: u32,
    /// Code range in which the debugger shows the local
    pub live_range: OffsetRange,
    /// Frame slot or state-machine field
    pub storage: LocalStorage,
    /// User-visible or compiler-generated
    pub visibility: LocalVisibility,
    /// Flags of a dynamically typed local
    pub dynamic_flags: Option<Vec<bool>>,
}

impl LocalEntry {
    /// Returns `true` if the local was hoisted into a state-machine field.
    #[must_use]
    pub fn is_hoisted(&self) -> bool {
        self.storage == LocalStorage::Hoisted
    }
}

/// One lexical scope of the finished tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Code range covered by the scope after dead-code elimination
    pub range: OffsetRange,
    /// Enclosing scope, `None` for the root
    pub parent: Option<ScopeId>,
    /// Nested scopes ordered by start offset
    pub children: Vec<ScopeId>,
    /// Locals declared directly in this scope, in slot order
    pub locals: Vec<LocalEntry>,
    /// Originating lexical block, `None` for the root
    pub block: Option<BlockId>,
    /// For loop bodies: the hull of every reachable copy of the body
    pub loop_extent: Option<OffsetRange>,
}

impl Scope {
    /// Returns `true` if the scope is the body of a loop.
    #[must_use]
    pub fn is_loop_body(&self) -> bool {
        self.loop_extent.is_some()
    }
}

/// The scope tree of one method, stored as an arena.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub(crate) fn from_scopes(scopes: Vec<Scope>) -> Self {
        ScopeTree { scopes }
    }

    /// The root scope covering the method body.
    #[must_use]
    pub fn root(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    /// The scope with id `id`.
    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Number of scopes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if the tree holds no scope, which only a default-constructed tree does.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// All scopes with their ids, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate()
    }

    /// All emitted locals with their scope, ordered by slot.
    #[must_use]
    pub fn locals(&self) -> Vec<(ScopeId, &LocalEntry)> {
        let mut locals: Vec<(ScopeId, &LocalEntry)> = self
            .iter()
            .flat_map(|(id, scope)| scope.locals.iter().map(move |l| (id, l)))
            .collect();
        locals.sort_by_key(|(_, l)| l.slot);
        locals
    }

    /// Number of emitted locals.
    #[must_use]
    pub fn local_count(&self) -> usize {
        self.scopes.iter().map(|s| s.locals.len()).sum()
    }

    /// The innermost loop body enclosing `id`, including `id` itself.
    #[must_use]
    pub fn enclosing_loop(&self, id: ScopeId) -> Option<&Scope> {
        let mut current = self.scopes.get(id);
        while let Some(scope) = current {
            if scope.is_loop_body() {
                return Some(scope);
            }
            current = scope.parent.and_then(|p| self.scopes.get(p));
        }
        None
    }
}
