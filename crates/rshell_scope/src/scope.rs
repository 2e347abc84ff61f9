//! A single lexical scope.

use crate::drive::DriveInfo;
use crate::variable::Variable;
use rshell_core::CaseInsensitiveMap;
use std::fmt;

/// Index of a scope in its chain's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scope in the chain. Scopes form a tree from inner to outer.
#[derive(Debug)]
pub struct ScopeNode<V> {
    pub(crate) id: ScopeId,
    /// The parent scope (None for the global scope and for removed scopes).
    pub(crate) parent: Option<ScopeId>,
    /// The scope `$script:` resolves to from here.
    pub(crate) script_scope: ScopeId,
    /// Number of parent links between this scope and Global.
    pub(crate) depth: usize,
    pub(crate) variables: CaseInsensitiveMap<Variable<V>>,
    pub(crate) drives: CaseInsensitiveMap<DriveInfo>,
}

impl<V> ScopeNode<V> {
    pub(crate) fn global() -> Self {
        Self {
            id: ScopeId::GLOBAL,
            parent: None,
            script_scope: ScopeId::GLOBAL,
            depth: 0,
            variables: CaseInsensitiveMap::new(),
            drives: CaseInsensitiveMap::new(),
        }
    }

    pub(crate) fn child(id: ScopeId, parent: &ScopeNode<V>, is_script_scope: bool) -> Self {
        Self {
            id,
            parent: Some(parent.id),
            script_scope: if is_script_scope { id } else { parent.script_scope },
            depth: parent.depth + 1,
            variables: CaseInsensitiveMap::new(),
            drives: CaseInsensitiveMap::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn script_scope(&self) -> ScopeId {
        self.script_scope
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_global(&self) -> bool {
        self.id == ScopeId::GLOBAL
    }

    pub fn is_script_scope(&self) -> bool {
        self.script_scope == self.id
    }

    /// The variable defined directly in this scope, ignoring visibility.
    pub fn variable(&self, name: &str) -> Option<&Variable<V>> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable<V>> {
        self.variables.values()
    }

    pub fn drive(&self, name: &str) -> Option<&DriveInfo> {
        self.drives.get(name)
    }

    pub fn drives(&self) -> impl Iterator<Item = &DriveInfo> {
        self.drives.values()
    }
}
